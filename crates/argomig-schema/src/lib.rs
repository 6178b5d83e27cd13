//! # argomig-schema — Application Schema Validation
//!
//! Runtime JSON Schema validation of ArgoCD Application documents.
//!
//! ## Runtime Validation (`validate`)
//!
//! The [`validate`] module holds the versioned schema documents
//! (`schemas/application-<version>.json`, compiled into the binary) and
//! checks JSON values against them. Key entry points:
//!
//! - [`validate()`]: validate a value against an explicit schema or the
//!   bundled default for `v1alpha1`.
//! - [`SchemaValidator`]: a schema set (bundled or loaded from a
//!   directory) that compiles per-version [`ApplicationSchema`]s and
//!   validates files.
//!
//! ## Crate Policy
//!
//! - Depends only on `argomig-core` internally.
//! - Schema documents are data: they are loaded and interpreted, never
//!   rewritten.
//! - Only the first violation is reported, with a dot-joined breadcrumb
//!   (`spec.source.repoURL`) or `root`.

pub mod validate;

pub use validate::{
    load_schema, schema_file_name, validate, yaml_to_json_value, ApplicationSchema,
    SchemaValidator, BUNDLED_SCHEMA_DIR,
};
