//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout jsgen. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - A hard failure aborts the whole generation run; there is no partial
//!   output.
//! - Errors carry the offending URI and, for reference failures, the
//!   property name and the raw `$ref` text.
//! - Reference failures nest: the cause of a [`ReferenceResolutionError`]
//!   is itself a [`JsgenError`], so a failure several references deep reads
//!   as a chain from the root schema down to the schema that broke.

use thiserror::Error;

/// Top-level error type for jsgen.
#[derive(Error, Debug)]
pub enum JsgenError {
    /// A URI was looked up but never registered, or registered twice with
    /// different content.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// The schema compiler rejected a document.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// A `$ref` target could not be generated.
    #[error("reference error: {0}")]
    Reference(#[from] ReferenceResolutionError),

    /// The renderer was handed a structurally invalid declaration.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A schema document could not be fetched or decoded.
    #[error("load error: {0}")]
    Load(#[from] LoadError),
}

/// Error in the URI → raw document registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// No document is registered under the URI.
    #[error("schema not registered: {uri}")]
    NotFound {
        /// The URI that was looked up.
        uri: String,
    },

    /// A different document is already registered under the URI.
    #[error("schema already registered with different content: {uri}")]
    Duplicate {
        /// The contested URI.
        uri: String,
    },
}

/// Error raised while compiling a registered document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The URI has no registered document.
    #[error(transparent)]
    Unregistered(#[from] RegistrationError),

    /// The external compiler rejected the document (malformed schema or an
    /// unresolvable external reference).
    #[error("schema '{uri}' rejected: {reason}")]
    Rejected {
        /// URI of the rejected document.
        uri: String,
        /// Message from the compiler.
        reason: String,
    },

    /// The URI fragment does not point at a node inside its document.
    #[error("fragment '{pointer}' not found in schema '{uri}'")]
    Fragment {
        /// URI of the containing document.
        uri: String,
        /// JSON Pointer taken from the fragment.
        pointer: String,
    },
}

/// A property's `$ref` target could not be turned into a declaration.
#[derive(Error, Debug)]
#[error("{uri}.{property}: reference '{reference}' (resolved to '{resolved}'): {source}")]
pub struct ReferenceResolutionError {
    /// URI of the schema declaring the property.
    pub uri: String,
    /// Name of the property carrying the reference.
    pub property: String,
    /// The `$ref` location as resolved against the declaring document.
    pub reference: String,
    /// The registered (or fallback) URI generation was attempted for.
    pub resolved: String,
    /// Why generation of the target failed.
    #[source]
    pub source: Box<JsgenError>,
}

/// Structural violation in a declaration handed to a renderer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The declaration has no type name.
    #[error("declaration has an empty type name")]
    EmptyTypeName,

    /// Two fields of one declaration share a display name.
    #[error("type {type_name} declares field {field} more than once")]
    DuplicateField {
        /// Declaration being rendered.
        type_name: String,
        /// The repeated field name.
        field: String,
    },
}

/// Error fetching or decoding a schema document.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Reading a local file failed.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An HTTP(S) fetch failed or returned a non-200 status.
    #[error("cannot fetch '{url}': {reason}")]
    Http {
        /// URL that was fetched.
        url: String,
        /// Transport error or status description.
        reason: String,
    },

    /// The bytes are neither JSON nor YAML.
    #[error("cannot decode '{uri}': {reason}")]
    Decode {
        /// URI of the document.
        uri: String,
        /// Parser message.
        reason: String,
    },

    /// The HTTP client could not be configured (bad CA certificate, TLS setup).
    #[error("http client setup failed: {0}")]
    Client(String),
}
