//! # Document Discovery
//!
//! Recursive discovery of Application manifests under an input directory.
//! Results are sorted by path so runs are deterministic regardless of the
//! order the filesystem returns entries in.

use std::path::{Path, PathBuf};

use argomig_core::ScanError;
use walkdir::WalkDir;

/// File extensions treated as manifests.
const MANIFEST_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Find every `.yaml` / `.yml` file under `directory`, sorted by path.
///
/// # Errors
///
/// Returns `ScanError::NotFound` / `NotADirectory` for a bad root, and
/// `PermissionDenied` / `Walk` if part of the tree cannot be read.
pub fn scan_directory(directory: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !directory.exists() {
        return Err(ScanError::NotFound {
            path: directory.to_path_buf(),
        });
    }
    if !directory.is_dir() {
        return Err(ScanError::NotADirectory {
            path: directory.to_path_buf(),
        });
    }

    let mut manifests = Vec::new();
    for entry in WalkDir::new(directory).follow_links(false) {
        let entry = entry.map_err(|e| walk_error(directory, e))?;
        let path = entry.path();
        if path.is_file() && is_manifest(path) {
            manifests.push(entry.into_path());
        }
    }
    manifests.sort();

    tracing::info!(
        directory = %directory.display(),
        found = manifests.len(),
        "scanned for YAML files"
    );
    Ok(manifests)
}

fn is_manifest(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext))
}

fn walk_error(root: &Path, err: walkdir::Error) -> ScanError {
    let denied = err
        .io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::PermissionDenied);
    if denied {
        ScanError::PermissionDenied {
            path: err.path().unwrap_or(root).to_path_buf(),
        }
    } else {
        ScanError::Walk {
            path: root.to_path_buf(),
            reason: err.to_string(),
        }
    }
}
