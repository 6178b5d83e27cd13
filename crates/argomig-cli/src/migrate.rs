//! # Migrate Subcommand
//!
//! Runs the migration pipeline over an input directory and prints a
//! summary of the run.
//!
//! ## Usage
//!
//! ```bash
//! argocd-migrator migrate -i apps/ -o generators/config.json
//! argocd-migrator migrate -i apps/ --no-validate
//! argocd-migrator migrate -i apps/ --schema-dir schemas/
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use argomig_pipeline::{run_pipeline, PipelineOptions, PipelineResult};

/// Arguments for the migrate subcommand.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Input directory containing ArgoCD Application YAML files.
    #[arg(short = 'i', long, value_parser = existing_dir)]
    pub input_path: PathBuf,

    /// Output file path for the aggregated config.json.
    #[arg(short = 'o', long, default_value = "config.json")]
    pub output_file: PathBuf,

    /// Skip schema and aggregated config validation.
    #[arg(long)]
    pub no_validate: bool,

    /// Load Application schemas from this directory instead of the bundled set.
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,
}

impl MigrateArgs {
    pub fn to_options(&self) -> PipelineOptions {
        let options = PipelineOptions::new(&self.input_path, &self.output_file)
            .with_validation(!self.no_validate);
        match &self.schema_dir {
            Some(dir) => options.with_schema_dir(dir),
            None => options,
        }
    }
}

fn existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.exists() {
        return Err(format!("directory '{value}' does not exist"));
    }
    if !path.is_dir() {
        return Err(format!("'{value}' is not a directory"));
    }
    Ok(path)
}

/// Execute the migrate subcommand.
///
/// Returns exit code 0 when the artifact was written and nothing failed,
/// 1 otherwise. Scan and schema configuration errors are returned as
/// `Err` wrapping the `MigratorError`.
pub fn run_migrate(args: &MigrateArgs, quiet: bool) -> Result<u8> {
    println!(
        "Migrating ArgoCD Applications from {} to {}",
        args.input_path.display(),
        args.output_file.display()
    );

    let result = run_pipeline(&args.to_options())?;

    if !quiet {
        print!("{}", render_report(&result));
    }
    if let Some(error) = &result.error {
        eprintln!("Error: {error}");
    }

    if result.is_success() {
        println!("\n✓ Successfully generated {}", args.output_file.display());
        Ok(0)
    } else {
        Ok(1)
    }
}

/// Render the run summary and, if any, the failed documents.
pub fn render_report(result: &PipelineResult) -> String {
    let mut out = String::from("\nMigration Summary:\n");
    out.push_str(&format!("  Total applications: {}\n", result.total));
    out.push_str(&format!("  Successfully transformed: {}\n", result.succeeded));
    out.push_str(&format!("  Failed: {}\n", result.failed));
    if result.total > 0 {
        out.push_str(&format!("  Success rate: {:.1}%\n", result.success_rate()));
    }

    if result.failed > 0 {
        out.push_str("\nFailed transformations:\n");
        for outcome in &result.outcomes {
            if let Some(error) = outcome.error() {
                out.push_str(&format!("  ✗ {}: {error}\n", outcome.source.display()));
            }
        }
    }
    out
}
