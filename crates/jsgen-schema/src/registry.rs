//! # Schema Registry & Compiler
//!
//! Holds the raw schema documents of one generation run, keyed by URI, and
//! compiles them on demand into [`AnnotatedSchema`] values.
//!
//! ## Compilation
//!
//! The `jsonschema` crate is the external compiler: it validates the
//! document (against its draft metaschema) and resolves every `$ref`. A
//! document the compiler rejects fails with [`CompileError::Rejected`].
//! Cross-document references are served from the registry itself through
//! [`RegistryRetriever`], so the compiler never reaches the network and
//! every referenced URI must be registered first.
//!
//! ## URI Forms
//!
//! A URI with a JSON Pointer fragment (`company.yaml#/$defs/address`)
//! compiles the node the pointer selects inside the registered document.
//! [`SchemaRegistry::canonicalize`] maps reference locations onto
//! registered URIs: exact key, then `$id` alias, then the longest suffix
//! match.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use jsgen_core::{CompileError, GeneratorConfig, RegistrationError, SchemaDraft};
use jsonschema::{Retrieve, Uri, ValidationOptions};
use serde_json::Value;

use crate::compiled::{split_fragment, AnnotatedSchema, CompiledSchema};
use crate::extensions::ExtensionExtractor;

/// Base URI the compiler assigns to documents without an `$id`.
const DEFAULT_BASE_URI: &str = "json-schema:///";

/// URI → raw document store plus the compiler front-end.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    documents: BTreeMap<String, Arc<Value>>,
    extractor: ExtensionExtractor,
    draft: Option<SchemaDraft>,
    /// Documents the compiler has already accepted.
    validated: RefCell<BTreeSet<String>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry using the extension prefix and draft of `config`.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            extractor: ExtensionExtractor::new(config.extension_prefix.clone()),
            draft: config.draft,
            ..Self::default()
        }
    }

    pub fn extractor(&self) -> &ExtensionExtractor {
        &self.extractor
    }

    /// Store `document` under `uri`. The first registration of a URI wins;
    /// returns `false` when `uri` was already registered.
    pub fn register(&mut self, uri: impl Into<String>, document: Value) -> bool {
        let uri = uri.into();
        if self.documents.contains_key(&uri) {
            tracing::debug!(uri = %uri, "schema already registered, keeping first");
            return false;
        }
        tracing::debug!(uri = %uri, "registered schema");
        self.documents.insert(uri, Arc::new(document));
        true
    }

    /// Like [`register`](Self::register), but registering a URI again with
    /// different content is an error. Identical re-registration is a no-op.
    pub fn register_unique(
        &mut self,
        uri: impl Into<String>,
        document: Value,
    ) -> Result<(), RegistrationError> {
        let uri = uri.into();
        match self.documents.get(&uri) {
            Some(existing) if **existing != document => Err(RegistrationError::Duplicate { uri }),
            Some(_) => Ok(()),
            None => {
                self.register(uri, document);
                Ok(())
            }
        }
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Registered URIs, sorted.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// The raw node at `uri`: the registered document itself, or the node a
    /// fragment pointer selects inside the registered containing document.
    pub fn raw(&self, uri: &str) -> Result<&Value, CompileError> {
        if let Some(document) = self.documents.get(uri) {
            return Ok(&**document);
        }
        let (doc, fragment) = split_fragment(uri);
        let document = self.documents.get(doc).ok_or_else(|| RegistrationError::NotFound {
            uri: uri.to_string(),
        })?;
        match fragment {
            None => Ok(&**document),
            Some(pointer) => document.pointer(pointer).ok_or_else(|| CompileError::Fragment {
                uri: doc.to_string(),
                pointer: pointer.to_string(),
            }),
        }
    }

    /// Whether the document part of `location` is registered under exactly
    /// that URI or declares it as its `$id`. Unlike
    /// [`canonicalize`](Self::canonicalize) this never matches by suffix.
    pub fn is_known(&self, location: &str) -> bool {
        let (doc, _) = split_fragment(location);
        self.documents.contains_key(doc) || find_by_id(&self.documents, doc).is_some()
    }

    /// Map a reference location onto a registered URI, carrying its
    /// fragment over. Returns `None` when no registered document matches.
    pub fn canonicalize(&self, location: &str) -> Option<String> {
        if self.documents.contains_key(location) {
            return Some(location.to_string());
        }
        let (doc, fragment) = split_fragment(location);
        let key = find_document(&self.documents, doc)?;
        Some(match fragment {
            Some(pointer) => format!("{key}#{pointer}"),
            None => key.to_string(),
        })
    }

    /// Compile the schema registered at `uri` and attach its extensions.
    pub fn compile(&self, uri: &str) -> Result<AnnotatedSchema, CompileError> {
        let node = self.raw(uri)?;
        let (doc, _) = split_fragment(uri);

        // Validate the whole containing document so internal pointers
        // resolve; an exact fragment entry without its base stands alone.
        let validated_key = if self.documents.contains_key(doc) { doc } else { uri };
        self.validate(validated_key)?;

        tracing::debug!(uri = %uri, "compiled schema");
        let schema = CompiledSchema::lower(node, doc, uri);
        Ok(AnnotatedSchema::new(uri, schema, self.extractor.extract(node)))
    }

    /// Run the external compiler over the document registered at `key`.
    fn validate(&self, key: &str) -> Result<(), CompileError> {
        if self.validated.borrow().contains(key) {
            return Ok(());
        }
        let document = self.documents.get(key).ok_or_else(|| RegistrationError::NotFound {
            uri: key.to_string(),
        })?;

        self.build_options()
            .build(document)
            .map_err(|e| CompileError::Rejected {
                uri: key.to_string(),
                reason: e.to_string(),
            })?;

        self.validated.borrow_mut().insert(key.to_string());
        Ok(())
    }

    /// Compiler options with the registry installed as the only source of
    /// referenced documents.
    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        if let Some(draft) = self.draft {
            opts.with_draft(compiler_draft(draft));
        }
        let retriever = RegistryRetriever {
            documents: self.documents.clone(),
        };
        opts.with_retriever(retriever);
        opts
    }
}

fn compiler_draft(draft: SchemaDraft) -> jsonschema::Draft {
    match draft {
        SchemaDraft::Draft4 => jsonschema::Draft::Draft4,
        SchemaDraft::Draft6 => jsonschema::Draft::Draft6,
        SchemaDraft::Draft7 => jsonschema::Draft::Draft7,
        SchemaDraft::Draft201909 => jsonschema::Draft::Draft201909,
        SchemaDraft::Draft202012 => jsonschema::Draft::Draft202012,
    }
}

/// Serves `$ref` targets to the compiler from a snapshot of the registry.
///
/// Unknown URIs are an error, which the compiler reports as an unresolvable
/// reference.
struct RegistryRetriever {
    documents: BTreeMap<String, Arc<Value>>,
}

impl Retrieve for RegistryRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let (doc, _) = split_fragment(uri_str);
        let doc = doc.strip_prefix(DEFAULT_BASE_URI).unwrap_or(doc);

        match find_document(&self.documents, doc) {
            Some(key) => {
                tracing::trace!(uri = %uri_str, registered = %key, "retrieved referenced schema");
                Ok((*self.documents[key]).clone())
            }
            None => Err(format!("schema '{uri_str}' is not registered").into()),
        }
    }
}

/// Strip forms that do not identify a document: `file://`, the compiler's
/// default base, and leading `./`.
fn comparable(uri: &str) -> &str {
    let mut s = uri;
    for prefix in ["file://", DEFAULT_BASE_URI] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest;
        }
    }
    while let Some(rest) = s.strip_prefix("./") {
        s = rest;
    }
    s
}

/// Either string ends with the other at a path boundary.
fn suffix_related(a: &str, b: &str) -> bool {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return false;
    }
    long == short || (long.ends_with(short) && long[..long.len() - short.len()].ends_with('/'))
}

/// Registered key of the document whose `$id` is `doc`.
fn find_by_id<'a>(documents: &'a BTreeMap<String, Arc<Value>>, doc: &str) -> Option<&'a str> {
    documents
        .iter()
        .find(|(_, document)| {
            document
                .get("$id")
                .and_then(Value::as_str)
                .is_some_and(|id| id.trim_end_matches('#') == doc)
        })
        .map(|(key, _)| key.as_str())
}

/// Registered key for the document part `doc`: exact key, `$id` alias, or
/// the longest suffix-related key.
fn find_document<'a>(documents: &'a BTreeMap<String, Arc<Value>>, doc: &str) -> Option<&'a str> {
    if let Some((key, _)) = documents.get_key_value(doc) {
        return Some(key);
    }

    if let Some(key) = find_by_id(documents, doc) {
        return Some(key);
    }

    let wanted = comparable(doc);
    documents
        .keys()
        .filter(|key| suffix_related(comparable(key), wanted))
        .max_by_key(|key| comparable(key).len())
        .map(String::as_str)
}
