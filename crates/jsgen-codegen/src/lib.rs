//! # jsgen-codegen: Schema to Type Declarations
//!
//! Walks compiled schemas and produces one [`GeneratedType`] per schema
//! URI, then renders them as Go or Rust source.
//!
//! ## Contents
//!
//! - [`generator`]: [`Generator`] and the per-run [`GenerationCache`]:
//!   memoized, cycle-safe generation across `$ref`s.
//! - [`inference`]: the per-property decision of override, reference,
//!   inline promotion, or table type.
//! - [`backend`]: the [`Backend`] trait with [`GoBackend`] and
//!   [`RustBackend`].
//!
//! ## Example
//!
//! ```
//! use jsgen_codegen::{emit_source, Generator};
//! use jsgen_core::GeneratorConfig;
//! use serde_json::json;
//!
//! let mut generator = Generator::new(GeneratorConfig::default());
//! let types = generator
//!     .generate_all("a", json!({"type": "object", "properties": {"id": {"type": "string"}}}), "A")
//!     .unwrap();
//! let source = emit_source(generator.backend(), None, types.iter().map(|t| t.as_ref()));
//! assert_eq!(source, "type A struct {\n\tId string `json:\"id\"`\n}\n");
//! ```
//!
//! [`GeneratedType`]: jsgen_core::GeneratedType

pub mod backend;
pub mod generator;
pub mod inference;

pub use backend::{backend_for, emit_source, render_all, Backend, GoBackend, RustBackend};
pub use generator::{GenerationCache, Generator, UriState};
