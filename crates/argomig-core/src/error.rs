//! # Error Types: One Error Per Pipeline Stage
//!
//! Defines the error types used throughout argocd-migrator. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every message names the file, directory or record it is about.
//! - Per-document errors (`ParseError`, `TransformError`) are turned into
//!   failed outcomes by the orchestrator and never abort a run.
//! - Aggregate errors (`AggregationError`) veto the artifact write but are
//!   still reported through a normal pipeline result.
//! - Schema configuration problems (`ValidationError::SchemaNotFound`,
//!   `SchemaLoad`, `InvalidSchema`) are distinct from data violations.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for argocd-migrator.
#[derive(Error, Debug)]
pub enum MigratorError {
    /// Input directory discovery failed.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// A document is malformed or is not an ArgoCD Application.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An Application could not be mapped to a generator config record.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// Schema loading or schema validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The aggregated artifact failed its structural check or could not be written.
    #[error("aggregation error: {0}")]
    Aggregation(#[from] AggregationError),
}

/// Error while discovering input documents.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The input directory does not exist.
    #[error("Directory does not exist: {}", .path.display())]
    NotFound {
        /// Directory that was requested.
        path: PathBuf,
    },

    /// The input path exists but is not a directory.
    #[error("Path is not a directory: {}", .path.display())]
    NotADirectory {
        /// Path that was requested.
        path: PathBuf,
    },

    /// Part of the tree could not be read because of permissions.
    #[error("Permission denied accessing directory: {}", .path.display())]
    PermissionDenied {
        /// Directory or entry that was denied.
        path: PathBuf,
    },

    /// Any other failure while walking the tree.
    #[error("Error scanning directory {}: {reason}", .path.display())]
    Walk {
        /// Root directory of the scan.
        path: PathBuf,
        /// Underlying walk failure.
        reason: String,
    },
}

/// Error while loading one input document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File does not exist: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Path is not a file: {}", .path.display())]
    NotAFile { path: PathBuf },

    #[error("Error reading file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid YAML. `reason` carries the parser's location.
    #[error("YAML syntax error in {}: {reason}", .path.display())]
    Syntax { path: PathBuf, reason: String },

    #[error("YAML file {} does not contain a mapping", .path.display())]
    NotAMapping { path: PathBuf },

    /// `kind` is missing or is not `Application`.
    #[error("File {} is not an ArgoCD Application (kind: {kind})", .path.display())]
    NotAnApplication { path: PathBuf, kind: String },

    #[error("File {} has invalid apiVersion: {api_version}", .path.display())]
    InvalidApiVersion { path: PathBuf, api_version: String },

    #[error("File {} is missing required field: {field}", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("File {} has invalid metadata (not a mapping)", .path.display())]
    InvalidMetadata { path: PathBuf },

    #[error("File {} is missing metadata.name", .path.display())]
    MissingName { path: PathBuf },

    #[error("File {} has an empty or non-string metadata.name", .path.display())]
    InvalidName { path: PathBuf },

    #[error("File {} has invalid spec (not a mapping)", .path.display())]
    InvalidSpec { path: PathBuf },

    /// A known field holds a value of the wrong type.
    #[error("File {} is not a well-formed Application: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
}

/// Error while mapping an Application to a generator config record.
#[derive(Error, Debug)]
#[error("Error transforming application '{resource}' to generator config: {reason}")]
pub struct TransformError {
    /// `metadata.name` of the offending Application.
    pub resource: String,
    /// What could not be mapped.
    pub reason: String,
}

/// Error while loading a schema or validating a document against it.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// No schema document exists for the requested API version.
    #[error("Schema file not found: {location}")]
    SchemaNotFound {
        /// Logical location that was searched.
        location: String,
    },

    /// The schema document exists but is not readable JSON.
    #[error("Error loading schema {location}: {reason}")]
    SchemaLoad { location: String, reason: String },

    /// The schema document failed its own meta-validation.
    #[error("Invalid schema: {reason}")]
    InvalidSchema { reason: String },

    /// The document violates the schema. `path` is the dot-joined
    /// instance path, or `root` for a top-level violation.
    #[error("Validation error at {path}: {message}")]
    Violation { path: String, message: String },

    /// A document handed to file validation could not be read.
    #[error("File does not exist: {}", .path.display())]
    DocumentNotFound { path: PathBuf },

    /// A document handed to file validation could not be parsed.
    #[error("Invalid {format} in {}: {reason}", .path.display())]
    InvalidDocument {
        path: PathBuf,
        format: &'static str,
        reason: String,
    },

    #[error("Error validating {}: {source}", .path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ValidationError {
    /// Whether this error describes the schema itself rather than the data.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaNotFound { .. } | Self::SchemaLoad { .. } | Self::InvalidSchema { .. }
        )
    }
}

/// Error while checking or writing the aggregated artifact.
#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("Error creating output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing aggregated config to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error serializing aggregated config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Config at index {index} must be a mapping")]
    NotAMapping { index: usize },

    /// `name` is `metadata.name` when resolvable, otherwise `index N`.
    #[error("Config '{name}' missing required field: {field}")]
    MissingField { name: String, field: &'static str },

    #[error("Config at index {index} metadata missing required 'name' field")]
    MissingName { index: usize },
}
