//! # argocd-migrator CLI entry point
//!
//! Parses command-line arguments, configures logging from the verbosity
//! flags and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use argomig_cli::migrate::{run_migrate, MigrateArgs};
use argomig_cli::validate::{run_validate, ValidateArgs};
use argomig_core::MigratorError;

/// Migrate ArgoCD Application manifests into an ApplicationSet generator config.json.
#[derive(Parser, Debug)]
#[command(name = "argocd-migrator", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Migrate Application YAML files into one aggregated generator config.
    Migrate(MigrateArgs),

    /// Validate one Application document against its schema.
    Validate(ValidateArgs),

    /// Display version information.
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose, cli.quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "argocd-migrator starting");

    let result = match &cli.command {
        Commands::Migrate(args) => run_migrate(args, cli.quiet),
        Commands::Validate(args) => run_validate(args),
        Commands::Version => {
            println!("argocd-migrator version {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) if e.downcast_ref::<MigratorError>().is_some() => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Unexpected error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// `RUST_LOG` wins when set; otherwise the flags pick the level.
fn env_filter(verbose: u8, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbose, quiet)))
}

fn level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
