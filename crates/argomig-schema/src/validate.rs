//! # Schema Validation
//!
//! Runtime validation of Application documents against versioned JSON
//! Schema definitions.
//!
//! ## Schema Resolution
//!
//! Schemas are named `application-<version>.json`. The default set lives
//! in the repository's `schemas/` directory and is compiled into the
//! binary, so a release never depends on files next to the executable.
//! Operators may point [`SchemaValidator::from_dir`] at a directory with
//! the same naming convention instead.
//!
//! ## Error Classes
//!
//! Failure to find or parse a schema, and a schema that fails its own
//! meta-validation, are configuration errors and are reported with
//! distinct [`ValidationError`] variants. Only
//! [`ValidationError::Violation`] describes the data.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use argomig_core::{ValidationError, DEFAULT_API_VERSION};
use jsonschema::Validator;
use serde_json::Value;

/// Logical location of the bundled schema documents.
pub const BUNDLED_SCHEMA_DIR: &str = "schemas";

/// Schema documents compiled into the binary, keyed by API version.
const BUNDLED_SCHEMAS: &[(&str, &str)] = &[(
    "v1alpha1",
    include_str!("../../../schemas/application-v1alpha1.json"),
)];

/// File name of the schema for `version`.
pub fn schema_file_name(version: &str) -> String {
    format!("application-{version}.json")
}

/// Where a [`SchemaValidator`]'s documents came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SchemaOrigin {
    Bundled,
    Directory(PathBuf),
}

/// A set of versioned Application schemas.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    origin: SchemaOrigin,
    /// Map from API version (e.g. "v1alpha1") to parsed schema document.
    schemas: BTreeMap<String, Value>,
}

impl SchemaValidator {
    /// The schema set compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::SchemaLoad` if a bundled document is not
    /// valid JSON.
    pub fn bundled() -> Result<Self, ValidationError> {
        let mut schemas = BTreeMap::new();
        for (version, text) in BUNDLED_SCHEMAS {
            let value: Value =
                serde_json::from_str(text).map_err(|e| ValidationError::SchemaLoad {
                    location: bundled_location(version),
                    reason: format!("invalid JSON: {e}"),
                })?;
            schemas.insert((*version).to_string(), value);
        }
        Ok(Self {
            origin: SchemaOrigin::Bundled,
            schemas,
        })
    }

    /// Load every `application-<version>.json` in `schema_dir`.
    ///
    /// Other files are ignored. An empty directory yields an empty set;
    /// lookups against it fail with `SchemaNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::SchemaLoad` if the directory or any
    /// matching file cannot be read or parsed as JSON.
    pub fn from_dir(schema_dir: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let load_error = |reason: String| ValidationError::SchemaLoad {
            location: schema_dir.display().to_string(),
            reason,
        };

        let entries = std::fs::read_dir(&schema_dir)
            .map_err(|e| load_error(format!("cannot read schema directory: {e}")))?;

        let mut schemas = BTreeMap::new();
        for entry in entries {
            let path = entry
                .map_err(|e| load_error(format!("cannot read schema directory: {e}")))?
                .path();
            let Some(version) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix("application-"))
                .and_then(|n| n.strip_suffix(".json"))
            else {
                continue;
            };

            let content =
                std::fs::read_to_string(&path).map_err(|e| ValidationError::SchemaLoad {
                    location: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            let value: Value =
                serde_json::from_str(&content).map_err(|e| ValidationError::SchemaLoad {
                    location: path.display().to_string(),
                    reason: format!("invalid JSON: {e}"),
                })?;
            tracing::debug!(version, path = %path.display(), "loaded schema");
            schemas.insert(version.to_string(), value);
        }

        Ok(Self {
            origin: SchemaOrigin::Directory(schema_dir),
            schemas,
        })
    }

    /// API versions with a schema in this set, sorted.
    pub fn versions(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Location of the schema document for `version`, for error messages.
    pub fn location(&self, version: &str) -> String {
        match &self.origin {
            SchemaOrigin::Bundled => bundled_location(version),
            SchemaOrigin::Directory(dir) => {
                dir.join(schema_file_name(version)).display().to_string()
            }
        }
    }

    /// Look up the schema document for `version`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::SchemaNotFound` if no document exists.
    pub fn load_schema(&self, version: &str) -> Result<&Value, ValidationError> {
        self.schemas
            .get(version)
            .ok_or_else(|| ValidationError::SchemaNotFound {
                location: self.location(version),
            })
    }

    /// Compile the schema for `version` once for repeated validation.
    ///
    /// # Errors
    ///
    /// Returns `SchemaNotFound` for an unknown version and `InvalidSchema`
    /// if the document fails meta-validation.
    pub fn compile(&self, version: &str) -> Result<ApplicationSchema, ValidationError> {
        let schema = self.load_schema(version)?;
        let validator = compile_schema(schema)?;
        Ok(ApplicationSchema {
            version: version.to_string(),
            validator,
        })
    }

    /// Validate `instance` against the schema for `version`.
    pub fn validate_value(&self, instance: &Value, version: &str) -> Result<(), ValidationError> {
        self.compile(version)?.validate(instance)
    }

    /// Validate a YAML or JSON document on disk against the default version.
    ///
    /// The format is chosen from the extension (`.yaml`/`.yml` for YAML,
    /// anything else is read as JSON).
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound`, `DocumentRead` or `InvalidDocument` if
    /// the file cannot be loaded, otherwise the result of validation.
    pub fn validate_file(&self, document_path: &Path) -> Result<(), ValidationError> {
        if !document_path.exists() {
            return Err(ValidationError::DocumentNotFound {
                path: document_path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(document_path).map_err(|e| {
            ValidationError::DocumentRead {
                path: document_path.to_path_buf(),
                source: e,
            }
        })?;

        let ext = document_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        let invalid = |format: &'static str, reason: String| ValidationError::InvalidDocument {
            path: document_path.to_path_buf(),
            format,
            reason,
        };

        let instance = match ext {
            "yaml" | "yml" => {
                let yaml_value: serde_yaml::Value =
                    serde_yaml::from_str(&content).map_err(|e| invalid("YAML", e.to_string()))?;
                yaml_to_json_value(&yaml_value).map_err(|e| invalid("YAML", e))?
            }
            _ => serde_json::from_str(&content).map_err(|e| invalid("JSON", e.to_string()))?,
        };

        self.validate_value(&instance, DEFAULT_API_VERSION)?;
        tracing::info!(path = %document_path.display(), "validated document");
        Ok(())
    }
}

/// A compiled schema for one API version.
pub struct ApplicationSchema {
    version: String,
    validator: Validator,
}

impl ApplicationSchema {
    /// API version this schema describes.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Check `instance`, reporting only the first violation.
    pub fn validate(&self, instance: &Value) -> Result<(), ValidationError> {
        first_violation(&self.validator, instance)
    }
}

impl fmt::Debug for ApplicationSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationSchema")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Load the bundled schema document for `version`.
///
/// # Errors
///
/// Returns `SchemaNotFound` if no document is bundled for `version` and
/// `SchemaLoad` if the bundled text is not JSON.
pub fn load_schema(version: &str) -> Result<Value, ValidationError> {
    SchemaValidator::bundled()?.load_schema(version).cloned()
}

/// Validate `instance` against `schema`, or against the bundled
/// `v1alpha1` schema when `schema` is `None`.
pub fn validate(instance: &Value, schema: Option<&Value>) -> Result<(), ValidationError> {
    let validator = match schema {
        Some(schema) => compile_schema(schema)?,
        None => compile_schema(&load_schema(DEFAULT_API_VERSION)?)?,
    };
    first_violation(&validator, instance)?;
    tracing::debug!("validation passed");
    Ok(())
}

fn bundled_location(version: &str) -> String {
    format!("{BUNDLED_SCHEMA_DIR}/{}", schema_file_name(version))
}

fn compile_schema(schema: &Value) -> Result<Validator, ValidationError> {
    jsonschema::validator_for(schema).map_err(|e| ValidationError::InvalidSchema {
        reason: e.to_string(),
    })
}

fn first_violation(validator: &Validator, instance: &Value) -> Result<(), ValidationError> {
    match validator.iter_errors(instance).next() {
        None => Ok(()),
        Some(error) => Err(ValidationError::Violation {
            path: breadcrumb(&error.instance_path.to_string()),
            message: error.to_string(),
        }),
    }
}

/// Turn a JSON Pointer (`/spec/source`) into a dot-joined breadcrumb
/// (`spec.source`), or `root` for the empty pointer.
fn breadcrumb(pointer: &str) -> String {
    let trimmed = pointer.strip_prefix('/').unwrap_or(pointer);
    if trimmed.is_empty() {
        return "root".to_string();
    }
    trimmed
        .split('/')
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Application manifests use the JSON-compatible subset of YAML. Tags are
/// dropped, scalar map keys are stringified, and non-finite floats are
/// rejected.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
