//! # argomig-pipeline — Application to Generator Config Migration
//!
//! Turns a directory of ArgoCD `Application` manifests into one
//! ApplicationSet generator `config.json`:
//!
//! - **Scan** (`scan.rs`): recursive, sorted discovery of `.yaml`/`.yml` files.
//! - **Load** (`loader.rs`): parse one document and check it is an
//!   `argoproj.io` Application with a name and a spec.
//! - **Transform** (`transform.rs`): the fixed field-mapping rules from an
//!   Application to a [`GeneratorConfigRecord`](argomig_core::GeneratorConfigRecord).
//! - **Aggregate** (`aggregate.rs`): cross-record structural checks and the
//!   atomic JSON array write.
//! - **Orchestrate** (`pipeline.rs`): run every document, collect outcomes,
//!   and write the artifact only when every document succeeded.
//!
//! ## Crate Policy
//!
//! - A failing document never stops the run; it only vetoes the write.
//! - No partially aggregated artifact is ever visible at the destination.
//! - Documents are processed in discovery order and reported in that order.

pub mod aggregate;
pub mod loader;
pub mod pipeline;
pub mod scan;
pub mod transform;

pub use aggregate::{aggregate, validate_records, validate_structure};
pub use loader::{load_document, LoadedDocument};
pub use pipeline::{run_pipeline, Outcome, OutcomeStatus, PipelineOptions, PipelineResult, RunStatus};
pub use scan::scan_directory;
pub use transform::{cluster_name, transform};
