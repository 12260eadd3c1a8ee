//! # Recursive Generator
//!
//! Turns a registered schema URI into a [`GeneratedType`], recursing into
//! every referenced or inline-promoted sub-schema along the way.
//!
//! ## Memoization and Cycles
//!
//! Each URI moves through `unvisited → in progress → done` inside a
//! [`GenerationCache`]. The URI is marked in progress before its properties
//! are resolved, so a reference back to it (directly or through other
//! schemas) becomes a recursive field instead of unbounded recursion. A
//! done URI is never generated again: the cached `Arc` is returned.
//!
//! The cache belongs to one run. [`Generator::generate_all`] creates a
//! fresh one and returns its contents sorted by URI.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use jsgen_core::naming::type_name_from_uri;
use jsgen_core::{Field, GeneratedType, GeneratorConfig, JsgenError};
use jsgen_schema::{AnnotatedSchema, SchemaRegistry};
use serde_json::Value;

use crate::backend::{backend_for, Backend};

/// Generation state of one URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriState {
    Unvisited,
    InProgress,
    Done,
}

/// Per-run store of generated declarations, keyed by schema URI.
#[derive(Debug, Default)]
pub struct GenerationCache {
    /// URI → type name, for URIs whose properties are being resolved.
    in_progress: HashMap<String, String>,
    done: BTreeMap<String, Arc<GeneratedType>>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, uri: &str) -> UriState {
        if self.done.contains_key(uri) {
            UriState::Done
        } else if self.in_progress.contains_key(uri) {
            UriState::InProgress
        } else {
            UriState::Unvisited
        }
    }

    pub fn get(&self, uri: &str) -> Option<&Arc<GeneratedType>> {
        self.done.get(uri)
    }

    /// Type name of a URI that is still being generated.
    pub fn in_progress_name(&self, uri: &str) -> Option<&str> {
        self.in_progress.get(uri).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Finished declarations, sorted by URI.
    pub fn types(&self) -> impl Iterator<Item = &Arc<GeneratedType>> {
        self.done.values()
    }

    pub fn into_types(self) -> Vec<Arc<GeneratedType>> {
        self.done.into_values().collect()
    }

    fn begin(&mut self, uri: &str, type_name: &str) {
        self.in_progress.insert(uri.to_string(), type_name.to_string());
    }

    fn finish(&mut self, uri: &str, generated: Arc<GeneratedType>) {
        self.in_progress.remove(uri);
        self.done.insert(uri.to_string(), generated);
    }

    fn abandon(&mut self, uri: &str) {
        self.in_progress.remove(uri);
    }
}

/// Generates type declarations for the schemas of one registry.
pub struct Generator {
    pub(crate) registry: SchemaRegistry,
    pub(crate) backend: Box<dyn Backend>,
    pub(crate) config: GeneratorConfig,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .field("registered", &self.registry.len())
            .finish()
    }
}

impl Generator {
    /// A generator with an empty registry and the backend of `config.target`.
    pub fn new(config: GeneratorConfig) -> Self {
        let registry = SchemaRegistry::from_config(&config);
        Self::with_registry(config, registry)
    }

    /// A generator over documents already registered in `registry`.
    pub fn with_registry(config: GeneratorConfig, registry: SchemaRegistry) -> Self {
        Self {
            registry,
            backend: backend_for(config.target),
            config,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Extension key carrying literal type names for this run.
    pub fn override_key(&self) -> &str {
        self.config
            .type_override_key
            .as_deref()
            .unwrap_or_else(|| self.backend.type_override_key())
    }

    /// Register `raw` under `uri` (unless already registered), generate it
    /// as `desired_name`, and return every declaration produced, sorted by
    /// URI.
    pub fn generate_all(
        &mut self,
        uri: &str,
        raw: Value,
        desired_name: &str,
    ) -> Result<Vec<Arc<GeneratedType>>, JsgenError> {
        self.registry.register(uri, raw);
        let mut cache = GenerationCache::new();
        self.generate(&mut cache, uri, desired_name)?;

        let types = cache.into_types();
        warn_duplicate_names(&types);
        Ok(types)
    }

    /// Generate the declaration for `uri`, named `desired_name` unless the
    /// schema carries a root-level type override.
    ///
    /// A URI that is already done returns its cached declaration. A URI that
    /// is still in progress returns an uncached forward-reference
    /// placeholder with no fields.
    pub fn generate(
        &mut self,
        cache: &mut GenerationCache,
        uri: &str,
        desired_name: &str,
    ) -> Result<Arc<GeneratedType>, JsgenError> {
        if let Some(done) = cache.get(uri) {
            tracing::debug!(uri = %uri, "cache hit");
            return Ok(Arc::clone(done));
        }
        if let Some(name) = cache.in_progress_name(uri) {
            tracing::debug!(uri = %uri, type_name = %name, "forward reference to type in progress");
            return Ok(Arc::new(GeneratedType {
                uri: uri.to_string(),
                name: name.to_string(),
                fields: Vec::new(),
                code: String::new(),
            }));
        }

        let annotated = self.registry.compile(uri)?;
        let type_name = self.effective_name(&annotated, desired_name);

        cache.begin(uri, &type_name);
        tracing::debug!(uri = %uri, type_name = %type_name, "generating");

        match self.build(cache, &annotated, &type_name) {
            Ok(generated) => {
                let generated = Arc::new(generated);
                cache.finish(uri, Arc::clone(&generated));
                tracing::debug!(uri = %uri, type_name = %type_name, "cached");
                Ok(generated)
            }
            Err(e) => {
                cache.abandon(uri);
                Err(e)
            }
        }
    }

    /// Root override, then the requested name, then a name derived from the
    /// URI.
    fn effective_name(&self, annotated: &AnnotatedSchema, desired_name: &str) -> String {
        let name = annotated
            .type_override(self.override_key())
            .unwrap_or(desired_name)
            .trim();
        if name.is_empty() {
            type_name_from_uri(&annotated.uri, &self.config.fallback_type_name)
        } else {
            name.to_string()
        }
    }

    fn build(
        &mut self,
        cache: &mut GenerationCache,
        annotated: &AnnotatedSchema,
        type_name: &str,
    ) -> Result<GeneratedType, JsgenError> {
        let mut fields = Vec::with_capacity(annotated.schema.properties().len());
        for (property, schema) in annotated.schema.properties() {
            fields.push(self.resolve_type(cache, property, schema, annotated)?);
        }
        dedupe_field_names(&mut fields);

        let code = self.backend.render(type_name, &fields)?;
        Ok(GeneratedType {
            uri: annotated.uri.clone(),
            name: type_name.to_string(),
            fields,
            code,
        })
    }
}

/// Suffix display names that collide after case conversion (`Name`,
/// `Name2`, ...). Fields arrive in tag order, which fixes who keeps the
/// bare name.
fn dedupe_field_names(fields: &mut [Field]) {
    let mut seen = BTreeSet::new();
    for field in fields.iter_mut() {
        if seen.insert(field.name.clone()) {
            continue;
        }
        let mut n = 2;
        let mut candidate = format!("{}{n}", field.name);
        while !seen.insert(candidate.clone()) {
            n += 1;
            candidate = format!("{}{n}", field.name);
        }
        field.name = candidate;
    }
}

fn warn_duplicate_names(types: &[Arc<GeneratedType>]) {
    let mut by_name: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for ty in types {
        by_name.entry(ty.name.as_str()).or_default().push(ty.uri.as_str());
    }
    for (name, uris) in by_name.into_iter().filter(|(_, uris)| uris.len() > 1) {
        tracing::warn!(type_name = %name, uris = ?uris, "several schemas generate the same type name");
    }
}
