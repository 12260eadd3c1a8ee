//! # jsgen-cli: Command-Line Front End
//!
//! Provides the `jsgen` command.
//!
//! ## Subcommands
//!
//! - `jsgen generate`: load a schema and everything it references, then
//!   print Go or Rust declarations (or the declaration list as JSON).
//! - `jsgen check`: load a schema graph and report which documents
//!   compile.
//!
//! ```bash
//! jsgen generate schemas/company.yaml --name Company --package models
//! jsgen generate https://schemas.example.org/company.json \
//!     --map https://schemas.example.org/=./schemas --target rust
//! jsgen check schemas/company.yaml
//! ```

pub mod check;
pub mod generate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use jsgen_core::{Config, LoaderConfig};

/// Document-loading flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct LoaderArgs {
    /// Serve URIs starting with PREFIX from local directory DIR.
    #[arg(long = "map", value_name = "PREFIX=DIR", value_parser = parse_mapping)]
    pub mappings: Vec<(String, PathBuf)>,

    /// Skip TLS certificate verification for HTTPS schemas.
    #[arg(long)]
    pub insecure: bool,

    /// Extra PEM root certificate for HTTPS schemas.
    #[arg(long, value_name = "PEM")]
    pub cacert: Option<PathBuf>,

    /// HTTP timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl LoaderArgs {
    /// Layer the flags over the file configuration.
    pub fn apply(&self, config: &mut LoaderConfig) {
        for (prefix, dir) in &self.mappings {
            config.mappings.insert(prefix.clone(), dir.clone());
        }
        config.insecure |= self.insecure;
        if let Some(cacert) = &self.cacert {
            config.cacert = Some(cacert.clone());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
    }
}

/// Parse a `PREFIX=DIR` mapping.
pub fn parse_mapping(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((prefix, dir)) if !prefix.is_empty() && !dir.is_empty() => {
            Ok((prefix.to_string(), PathBuf::from(dir)))
        }
        _ => Err(format!("expected PREFIX=DIR, got '{s}'")),
    }
}

/// The configuration file at `path`, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping() {
        assert_eq!(
            parse_mapping("https://x.org/=./schemas").unwrap(),
            ("https://x.org/".to_string(), PathBuf::from("./schemas"))
        );
        assert!(parse_mapping("no-separator").is_err());
        assert!(parse_mapping("=dir").is_err());
        assert!(parse_mapping("prefix=").is_err());
    }

    #[test]
    fn test_loader_args_override_config() {
        let mut config = LoaderConfig::default();
        config.mappings.insert("a/".to_string(), PathBuf::from("old"));
        let args = LoaderArgs {
            mappings: vec![("a/".to_string(), PathBuf::from("new"))],
            insecure: true,
            cacert: None,
            timeout: Some(3),
        };
        args.apply(&mut config);
        assert_eq!(config.mappings.get("a/"), Some(&PathBuf::from("new")));
        assert!(config.insecure);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_load_config_defaults_and_file() {
        assert_eq!(load_config(None).unwrap(), Config::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jsgen.yaml");
        std::fs::write(&path, "output:\n  package: models\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.output.package.as_deref(), Some("models"));

        let err = load_config(Some(&dir.path().join("missing.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("missing.yaml"));
    }
}
