//! # jsgen CLI entry point
//!
//! Parses command-line arguments, installs logging, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jsgen_cli::check::{run_check, CheckArgs};
use jsgen_cli::generate::{run_generate, GenerateArgs};
use jsgen_cli::load_config;

/// Generate type declarations from JSON Schema documents.
///
/// Cross-schema references become separate, reusable types; inline objects
/// are promoted to named types; `x-go-type` / `x-rust-type` extensions
/// override inferred types.
#[derive(Parser, Debug)]
#[command(name = "jsgen", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate declarations for a schema and everything it references.
    Generate(GenerateArgs),

    /// Load a schema graph and report which documents compile.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("jsgen starting");

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Generate(args) => run_generate(args, &config),
        Commands::Check(args) => run_check(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
