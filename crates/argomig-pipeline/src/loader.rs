//! # Document Loader
//!
//! Reads one manifest and checks it is shaped like an ArgoCD Application
//! before any field is mapped. The checks run in a fixed order and the
//! first failure is returned as a single [`ParseError`] naming the file.

use std::path::{Path, PathBuf};

use argomig_core::{InputResource, ParseError, API_GROUP_PREFIX, APPLICATION_KIND};
use argomig_schema::yaml_to_json_value;
use serde_json::{Map, Value};

/// One successfully loaded manifest.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// File the manifest was read from.
    pub path: PathBuf,
    /// The manifest as parsed, before decoding. Used for schema checks.
    pub raw: Value,
    /// The decoded Application.
    pub resource: InputResource,
}

/// Load and shape-check the manifest at `path`.
///
/// # Errors
///
/// Returns the [`ParseError`] for the first violated rule: missing file,
/// YAML syntax, non-mapping document, wrong `kind`, bad `apiVersion`,
/// missing or malformed `metadata` / `metadata.name`, missing or
/// malformed `spec`, or a known field holding the wrong type.
pub fn load_document(path: &Path) -> Result<LoadedDocument, ParseError> {
    if !path.exists() {
        return Err(ParseError::NotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(ParseError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ParseError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let raw = parse_yaml(path, &content)?;
    let document = raw.as_object().ok_or_else(|| ParseError::NotAMapping {
        path: path.to_path_buf(),
    })?;
    check_application_shape(path, document)?;

    let resource: InputResource =
        serde_json::from_value(raw.clone()).map_err(|e| ParseError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    tracing::info!(path = %path.display(), name = resource.name(), "parsed application");
    Ok(LoadedDocument {
        path: path.to_path_buf(),
        raw,
        resource,
    })
}

fn parse_yaml(path: &Path, content: &str) -> Result<Value, ParseError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ParseError::Syntax {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    yaml_to_json_value(&yaml).map_err(|reason| ParseError::Syntax {
        path: path.to_path_buf(),
        reason,
    })
}

fn check_application_shape(path: &Path, document: &Map<String, Value>) -> Result<(), ParseError> {
    let path_buf = || path.to_path_buf();

    match document.get("kind") {
        Some(Value::String(kind)) if kind == APPLICATION_KIND => {}
        other => {
            return Err(ParseError::NotAnApplication {
                path: path_buf(),
                kind: describe(other),
            })
        }
    }

    match document.get("apiVersion") {
        Some(Value::String(api_version)) if api_version.starts_with(API_GROUP_PREFIX) => {}
        other => {
            return Err(ParseError::InvalidApiVersion {
                path: path_buf(),
                api_version: describe(other),
            })
        }
    }

    let metadata = match document.get("metadata") {
        None => {
            return Err(ParseError::MissingField {
                path: path_buf(),
                field: "metadata",
            })
        }
        Some(Value::Object(metadata)) => metadata,
        Some(_) => return Err(ParseError::InvalidMetadata { path: path_buf() }),
    };
    match metadata.get("name") {
        None => return Err(ParseError::MissingName { path: path_buf() }),
        Some(Value::String(name)) if !name.is_empty() => {}
        Some(_) => return Err(ParseError::InvalidName { path: path_buf() }),
    }

    match document.get("spec") {
        None => Err(ParseError::MissingField {
            path: path_buf(),
            field: "spec",
        }),
        Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(ParseError::InvalidSpec { path: path_buf() }),
    }
}

/// Render an offending field for an error message.
fn describe(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
