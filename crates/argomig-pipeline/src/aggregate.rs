//! # Aggregator
//!
//! Checks the combined record set and writes it as one JSON array.
//!
//! ## Atomicity
//!
//! The array is written to a temporary file in the destination directory
//! and renamed over the destination. A crash or error mid-write leaves
//! either the previous file or no file at the destination, never a
//! truncated one.

use std::io::Write;
use std::path::Path;

use argomig_core::{AggregationError, GeneratorConfigRecord, REQUIRED_RECORD_FIELDS};
use serde_json::Value;
use tempfile::NamedTempFile;

/// Write `records` to `output_file` as a pretty-printed JSON array with a
/// trailing newline, creating missing parent directories.
///
/// # Errors
///
/// Returns `AggregationError::CreateDir` if the parent directory cannot be
/// created and `AggregationError::Write` if the file cannot be written or
/// moved into place.
pub fn aggregate(
    records: &[GeneratorConfigRecord],
    output_file: &Path,
) -> Result<(), AggregationError> {
    let mut bytes = serde_json::to_vec_pretty(records)?;
    bytes.push(b'\n');

    let parent = match output_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| AggregationError::CreateDir {
        path: parent.to_path_buf(),
        source: e,
    })?;

    let write_error = |source: std::io::Error| AggregationError::Write {
        path: output_file.to_path_buf(),
        source,
    };

    let mut staged = staging_file(parent).map_err(write_error)?;
    staged.write_all(&bytes).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    if let Ok(existing) = std::fs::metadata(output_file) {
        if existing.is_file() {
            staged
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(write_error)?;
        }
    }
    staged
        .persist(output_file)
        .map_err(|e| write_error(e.error))?;

    tracing::info!(
        count = records.len(),
        output = %output_file.display(),
        "aggregated applications"
    );
    Ok(())
}

/// Open the staging file in `dir`. On Unix it is created like a plain
/// `File::create`: mode `0666` filtered through the process umask.
#[cfg(unix)]
fn staging_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn staging_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

/// Check the cross-record invariants of an aggregate, in order, stopping
/// at the first violation.
///
/// Each element must be a mapping with `metadata`, `project`, `source` and
/// `destination`, and a non-empty string `metadata.name`.
pub fn validate_structure(configs: &[Value]) -> Result<(), AggregationError> {
    for (index, config) in configs.iter().enumerate() {
        let Some(config) = config.as_object() else {
            return Err(AggregationError::NotAMapping { index });
        };

        let name = config
            .get("metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty());

        for field in REQUIRED_RECORD_FIELDS {
            if !config.contains_key(field) {
                return Err(AggregationError::MissingField {
                    name: name
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("index {index}")),
                    field,
                });
            }
        }

        if name.is_none() {
            return Err(AggregationError::MissingName { index });
        }
    }

    tracing::debug!(count = configs.len(), "validated aggregated structure");
    Ok(())
}

/// Encode typed records and run [`validate_structure`] over them.
pub fn validate_records(records: &[GeneratorConfigRecord]) -> Result<(), AggregationError> {
    let values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    validate_structure(&values)
}
