//! # jsgen-core: Foundational Types for jsgen
//!
//! Every other crate in the workspace depends on `jsgen-core`; it depends on
//! nothing internal.
//!
//! ## Contents
//!
//! - [`ir`]: the output data model: [`LogicalType`], [`Field`],
//!   [`GeneratedType`].
//! - [`error`]: the error taxonomy shared by registry, generator, renderer,
//!   and loader.
//! - [`naming`]: identifier conversions (PascalCase, snake_case, type names
//!   derived from schema URIs).
//! - [`config`]: run configuration loaded from YAML.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsgen-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod ir;
pub mod naming;

// Re-export primary types for ergonomic imports.
pub use config::{
    Config, ConfigError, GeneratorConfig, LoaderConfig, OutputConfig, SchemaDraft, TargetLanguage,
};
pub use error::{
    CompileError, JsgenError, LoadError, ReferenceResolutionError, RegistrationError, RenderError,
};
pub use ir::{Field, GeneratedType, LogicalType};
