//! # Check Subcommand
//!
//! Loads a schema graph and compiles every document in it, printing one
//! line per URI. Exits non-zero when any document fails.

use anyhow::{Context, Result};
use clap::Args;

use jsgen_core::Config;
use jsgen_schema::{SchemaLoader, SchemaRegistry};

use crate::LoaderArgs;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Root schema: a path, a file:// URI, or an http(s) URL.
    pub schema: String,

    #[command(flatten)]
    pub loader: LoaderArgs,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, config: &Config) -> Result<u8> {
    let mut loader_config = config.loader.clone();
    args.loader.apply(&mut loader_config);

    let loader = SchemaLoader::new(loader_config);
    let mut registry = SchemaRegistry::from_config(&config.generator);
    loader
        .load_with_references(&mut registry, &args.schema)
        .with_context(|| format!("failed to load {}", args.schema))?;

    let mut failed = 0usize;
    for uri in registry.uris() {
        match registry.compile(uri) {
            Ok(_) => println!("  ok    {uri}"),
            Err(e) => {
                failed += 1;
                println!("  FAIL  {uri}: {e}");
            }
        }
    }

    println!();
    println!("{} schemas, {failed} failed", registry.len());
    if failed > 0 {
        tracing::warn!(failed, "some schemas do not compile");
        Ok(1)
    } else {
        Ok(0)
    }
}
