//! # jsgen-schema: Schema Documents, Extensions, and Compilation
//!
//! Everything jsgen knows about JSON Schema documents before type
//! generation starts.
//!
//! ## Contents
//!
//! - [`extensions`]: pulls prefixed extension keys out of raw documents.
//! - [`compiled`]: the read-only view of a compiled schema and its
//!   `$ref` resolution rules.
//! - [`registry`]: URI-keyed document store that compiles through the
//!   `jsonschema` crate and pairs the result with its extensions.
//! - [`loader`]: fetches documents from disk, mapped prefixes, or
//!   HTTP(S), decoding JSON or YAML.
//!
//! ## Crate Policy
//!
//! - The compiler never fetches anything itself; referenced documents are
//!   served from the registry.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod compiled;
pub mod extensions;
pub mod loader;
pub mod registry;

pub use compiled::{resolve_reference, AnnotatedSchema, CompiledSchema, Reference};
pub use extensions::{ExtensionExtractor, ExtensionSet, Extracted};
pub use loader::{decode, SchemaLoader};
pub use registry::SchemaRegistry;
