//! # Run Configuration
//!
//! Settings for a generation run, loaded from a YAML file and overridden by
//! command-line flags. Every section and field has a default, so an empty
//! file (or no file at all) is a valid configuration.
//!
//! ```yaml
//! generator:
//!   target: rust
//!   inline_suffix: Inline
//! loader:
//!   mappings:
//!     "https://schemas.example.org/": ./schemas
//! output:
//!   package: models
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output language of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    #[default]
    Go,
    Rust,
}

impl TargetLanguage {
    /// Extension key naming a literal output type for this language.
    pub fn default_override_key(&self) -> &'static str {
        match self {
            Self::Go => "x-go-type",
            Self::Rust => "x-rust-type",
        }
    }

    /// File extension of generated sources.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Rust => "rs",
        }
    }
}

impl std::str::FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "go" | "golang" => Ok(Self::Go),
            "rust" | "rs" => Ok(Self::Rust),
            other => Err(format!("unknown target language '{other}' (expected go or rust)")),
        }
    }
}

/// JSON Schema draft forced on the schema compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaDraft {
    #[serde(rename = "draft4")]
    Draft4,
    #[serde(rename = "draft6")]
    Draft6,
    #[serde(rename = "draft7")]
    Draft7,
    #[serde(rename = "2019-09")]
    Draft201909,
    #[serde(rename = "2020-12")]
    Draft202012,
}

/// Settings of the generator and inference engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub target: TargetLanguage,
    /// Prefix marking a schema key as an extension.
    pub extension_prefix: String,
    /// Extension key carrying a literal type name. `None` uses the target's
    /// default key.
    pub type_override_key: Option<String>,
    /// Appended to a property's display name to name a promoted inline object.
    pub inline_suffix: String,
    /// Type name used when a URI yields no usable name.
    pub fallback_type_name: String,
    /// Draft forced on the compiler; `None` detects it from `$schema`.
    pub draft: Option<SchemaDraft>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target: TargetLanguage::Go,
            extension_prefix: "x-".to_string(),
            type_override_key: None,
            inline_suffix: "Object".to_string(),
            fallback_type_name: "Object".to_string(),
            draft: None,
        }
    }
}

/// Settings of the document loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// URI prefix → local directory. The longest matching prefix wins.
    pub mappings: BTreeMap<String, PathBuf>,
    /// Skip TLS certificate verification for HTTPS fetches.
    pub insecure: bool,
    /// Extra PEM root certificate for HTTPS fetches.
    pub cacert: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            mappings: BTreeMap::new(),
            insecure: false,
            cacert: None,
            timeout_secs: 15,
        }
    }
}

/// Settings of the emitted source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Go package clause. Ignored by the Rust target.
    pub package: Option<String>,
}

/// Complete run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub loader: LoaderConfig,
    pub output: OutputConfig,
}

/// Error loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl Config {
    /// Parse a configuration from YAML text. Empty text yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.generator.target, TargetLanguage::Go);
        assert_eq!(config.generator.extension_prefix, "x-");
        assert!(config.generator.type_override_key.is_none());
        assert_eq!(config.generator.inline_suffix, "Object");
        assert_eq!(config.loader.timeout_secs, 15);
        assert!(config.output.package.is_none());
    }

    #[test]
    fn test_default_override_key_per_target() {
        assert_eq!(TargetLanguage::Go.default_override_key(), "x-go-type");
        assert_eq!(TargetLanguage::Rust.default_override_key(), "x-rust-type");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
generator:
  target: rust
  draft: "2020-12"
loader:
  mappings:
    "https://schemas.example.org/": ./schemas
output:
  package: models
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.generator.target, TargetLanguage::Rust);
        assert_eq!(config.generator.draft, Some(SchemaDraft::Draft202012));
        assert_eq!(config.generator.inline_suffix, "Object");
        assert_eq!(
            config.loader.mappings.get("https://schemas.example.org/"),
            Some(&PathBuf::from("./schemas"))
        );
        assert_eq!(config.output.package.as_deref(), Some("models"));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml_str("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = Config::from_yaml_str("generator:\n  targt: go\n").unwrap_err();
        assert!(err.to_string().contains("targt"), "unexpected error: {err}");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jsgen.yaml");
        std::fs::write(&path, "generator:\n  inline_suffix: Inline\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.generator.inline_suffix, "Inline");

        let missing = Config::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("Go".parse::<TargetLanguage>().unwrap(), TargetLanguage::Go);
        assert_eq!("rs".parse::<TargetLanguage>().unwrap(), TargetLanguage::Rust);
        assert!("java".parse::<TargetLanguage>().is_err());
    }
}
