//! # argomig-cli — argocd-migrator Command-Line Interface
//!
//! clap-based front end for the migration pipeline.
//!
//! ## Subcommands
//!
//! - `migrate`: Migrate a directory of Applications into one `config.json`
//! - `validate`: Schema-validate a single Application document
//! - `version`: Print the tool version
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the pipeline; handlers only build
//!   `PipelineOptions` and render results.
//! - The run report goes to stdout, logs go to stderr.
//! - Handlers return an exit code; `MigratorError`s surface as `Err` so the
//!   binary can tell expected failures from internal ones.

pub mod migrate;
pub mod validate;
