//! # Validate Subcommand
//!
//! Schema-validates a single Application document (YAML or JSON) without
//! transforming it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use argomig_core::MigratorError;
use argomig_schema::SchemaValidator;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document to validate (`.yaml`/`.yml` are read as YAML, anything else as JSON).
    pub file: PathBuf,

    /// Load Application schemas from this directory instead of the bundled set.
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,
}

/// Execute the validate subcommand.
///
/// A document that fails validation exits with 1. A missing or malformed
/// schema is returned as `Err`.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let validator = match &args.schema_dir {
        Some(dir) => SchemaValidator::from_dir(dir),
        None => SchemaValidator::bundled(),
    }
    .map_err(MigratorError::from)?;

    match validator.validate_file(&args.file) {
        Ok(()) => {
            println!("✓ {} is valid", args.file.display());
            Ok(0)
        }
        Err(e) if e.is_schema_error() => Err(MigratorError::from(e).into()),
        Err(e) => {
            println!("✗ {}: {e}", args.file.display());
            Ok(1)
        }
    }
}
