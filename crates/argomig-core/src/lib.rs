//! # argomig-core — Foundational Types for argocd-migrator
//!
//! Defines the two record shapes that flow through the migration pipeline
//! and the error hierarchy every other crate in the workspace reports with.
//! Every other crate depends on `argomig-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Typed records, not open maps.** [`InputResource`] mirrors the
//!    subset of an ArgoCD `Application` the migrator reads, and
//!    [`GeneratorConfigRecord`] mirrors exactly what the ApplicationSet
//!    generator consumes. Fields outside the fixed rule set cannot be
//!    emitted because there is nowhere to put them.
//!
//! 2. **Omit, never null.** Optional output fields are `Option`s that are
//!    skipped on serialization. A renamed field that was absent on input is
//!    absent on output.
//!
//! 3. **One error per stage.** `ScanError`, `ParseError`, `TransformError`,
//!    `ValidationError` and `AggregationError` each describe one stage and
//!    all convert into [`MigratorError`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `argomig-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod record;
pub mod resource;

pub use error::{
    AggregationError, MigratorError, ParseError, ScanError, TransformError, ValidationError,
};
pub use record::{
    GeneratorAnnotations, GeneratorConfigRecord, GeneratorDestination, GeneratorMetadata,
    GeneratorSource, REQUIRED_RECORD_FIELDS,
};
pub use resource::{
    ApplicationDestination, ApplicationSource, ApplicationSpec, InputResource, ObjectMeta,
    API_GROUP_PREFIX, APPLICATION_KIND, ARGOCD_ANNOTATION_PREFIX, DEFAULT_API_VERSION,
    DEFAULT_PROJECT, IN_CLUSTER_NAME, IN_CLUSTER_SERVER, SYNC_WAVE_ANNOTATION,
};
