//! # Generate Subcommand
//!
//! Loads the root schema and every document it transitively references,
//! generates all declarations, and writes one source file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use jsgen_codegen::{emit_source, Generator};
use jsgen_core::naming::type_name_from_uri;
use jsgen_core::{Config, GeneratedType, TargetLanguage};
use jsgen_schema::{SchemaLoader, SchemaRegistry};

use crate::LoaderArgs;

/// What `generate` writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Source code in the target language.
    Code,
    /// The generated declarations as a JSON array.
    Json,
}

/// Arguments for the generate subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Root schema: a path, a file:// URI, or an http(s) URL.
    pub schema: String,

    /// Name of the root type. Derived from the schema URI when omitted.
    #[arg(long)]
    pub name: Option<String>,

    /// Output language (go or rust).
    #[arg(long)]
    pub target: Option<TargetLanguage>,

    /// Go package clause / Rust module header.
    #[arg(long)]
    pub package: Option<String>,

    /// Register an extra schema before generating. Repeatable.
    #[arg(long = "with", value_name = "SCHEMA")]
    pub with: Vec<String>,

    #[command(flatten)]
    pub loader: LoaderArgs,

    /// Write to FILE instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Code)]
    pub format: OutputFormat,
}

/// Execute the generate subcommand.
pub fn run_generate(args: &GenerateArgs, config: &Config) -> Result<u8> {
    let mut config = config.clone();
    args.loader.apply(&mut config.loader);
    if let Some(target) = args.target {
        config.generator.target = target;
    }
    if let Some(package) = &args.package {
        config.output.package = Some(package.clone());
    }

    let loader = SchemaLoader::new(config.loader.clone());
    let mut registry = SchemaRegistry::from_config(&config.generator);

    for extra in &args.with {
        let document = loader
            .load(extra)
            .with_context(|| format!("failed to load --with schema {extra}"))?;
        registry
            .register_unique(extra.clone(), document)
            .with_context(|| format!("cannot register --with schema {extra}"))?;
        loader
            .load_with_references(&mut registry, extra)
            .with_context(|| format!("failed to load references of {extra}"))?;
    }

    let loaded = loader
        .load_with_references(&mut registry, &args.schema)
        .with_context(|| format!("failed to load {}", args.schema))?;
    tracing::info!(root = %args.schema, loaded = loaded.len(), "schemas loaded");

    let root = registry
        .raw(&args.schema)
        .with_context(|| format!("{} is not registered", args.schema))?
        .clone();
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| type_name_from_uri(&args.schema, &config.generator.fallback_type_name));

    let mut generator = Generator::with_registry(config.generator.clone(), registry);
    let types = generator
        .generate_all(&args.schema, root, &name)
        .with_context(|| format!("generation failed for {}", args.schema))?;
    tracing::info!(declarations = types.len(), backend = generator.backend().name(), "generated");

    let declarations: Vec<&GeneratedType> = types.iter().map(|t| t.as_ref()).collect();
    let text = match args.format {
        OutputFormat::Code => emit_source(
            generator.backend(),
            config.output.package.as_deref(),
            declarations.iter().copied(),
        ),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&declarations)
                .context("failed to serialize declarations")?;
            json.push('\n');
            json
        }
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => {
            std::io::stdout()
                .lock()
                .write_all(text.as_bytes())
                .context("failed to write to stdout")?;
        }
    }

    Ok(0)
}
