//! # Compiled Schema View
//!
//! A read-only, typed view of a schema node that the `jsonschema` crate has
//! accepted. It keeps the standard keywords the generator needs (declared
//! types, properties, `items`, `required`, and `$ref` targets resolved
//! against the containing document) and drops everything else, extension
//! keys included.
//!
//! [`AnnotatedSchema`] puts the extensions back next to the view.

use std::collections::BTreeMap;

use jsgen_core::naming::escape_pointer_token;
use jsgen_core::LogicalType;
use serde_json::{Map, Value};

use crate::extensions::{ExtensionSet, Extracted};

/// A `$ref` as written and as resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The `$ref` text.
    pub raw: String,
    /// `raw` resolved against the URI of the containing document.
    pub location: String,
}

/// Typed view of one compiled schema node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledSchema {
    location: String,
    types: Vec<String>,
    properties: BTreeMap<String, CompiledSchema>,
    required: Vec<String>,
    items: Option<Box<CompiledSchema>>,
    reference: Option<Reference>,
    title: Option<String>,
    description: Option<String>,
}

impl CompiledSchema {
    /// Build the view of `node`, found at `location` inside the document
    /// registered under `doc_uri`.
    pub fn lower(node: &Value, doc_uri: &str, location: &str) -> Self {
        let Some(map) = node.as_object() else {
            // Boolean schemas constrain nothing the generator models.
            return Self {
                location: location.to_string(),
                ..Self::default()
            };
        };

        let types = match map.get("type") {
            Some(Value::String(t)) => vec![t.clone()],
            Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).map(String::from).collect(),
            _ => Vec::new(),
        };

        let properties = map
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, sub)| {
                        let child = child_location(location, &["properties", name]);
                        (name.clone(), Self::lower(sub, doc_uri, &child))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let required = map
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).map(String::from).collect())
            .unwrap_or_default();

        let items = map
            .get("items")
            .filter(|items| items.is_object())
            .map(|items| Box::new(Self::lower(items, doc_uri, &child_location(location, &["items"]))));

        let reference = map.get("$ref").and_then(Value::as_str).map(|raw| Reference {
            raw: raw.to_string(),
            location: resolve_reference(doc_uri, raw),
        });

        Self {
            location: location.to_string(),
            types,
            properties,
            required,
            items,
            reference,
            title: map.get("title").and_then(Value::as_str).map(String::from),
            description: map.get("description").and_then(Value::as_str).map(String::from),
        }
    }

    /// URI of this node (document URI plus JSON Pointer fragment).
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Declared `type` values, in document order.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.iter().any(|t| t == name)
    }

    /// The inference-table mapping of the declared types.
    pub fn logical_type(&self) -> LogicalType {
        LogicalType::from_declared(&self.types)
    }

    pub fn properties(&self) -> &BTreeMap<String, CompiledSchema> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&CompiledSchema> {
        self.properties.get(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn items(&self) -> Option<&CompiledSchema> {
        self.items.as_deref()
    }

    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Rebuild a raw schema from the view: `type`, `properties`,
    /// `required`, `items`, and the original `$ref` text. Extension keys are
    /// not part of the view and are not reconstructed.
    pub fn to_raw(&self) -> Value {
        let mut map = Map::new();
        match self.types.as_slice() {
            [] => {}
            [only] => {
                map.insert("type".to_string(), Value::String(only.clone()));
            }
            many => {
                map.insert(
                    "type".to_string(),
                    Value::Array(many.iter().cloned().map(Value::String).collect()),
                );
            }
        }
        if let Some(reference) = &self.reference {
            map.insert("$ref".to_string(), Value::String(reference.raw.clone()));
        }
        if !self.properties.is_empty() {
            let props = self
                .properties
                .iter()
                .map(|(name, sub)| (name.clone(), sub.to_raw()))
                .collect();
            map.insert("properties".to_string(), Value::Object(props));
        }
        if !self.required.is_empty() {
            map.insert(
                "required".to_string(),
                Value::Array(self.required.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(items) = &self.items {
            map.insert("items".to_string(), items.to_raw());
        }
        Value::Object(map)
    }
}

/// A compiled schema paired with the extensions of its raw node.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSchema {
    /// URI the schema was compiled for.
    pub uri: String,
    pub schema: CompiledSchema,
    /// Extensions on the schema node itself.
    pub extensions: ExtensionSet,
    /// Extensions on each declared property. The compiled view's property
    /// map stays authoritative for the property schemas themselves.
    pub property_extensions: BTreeMap<String, ExtensionSet>,
}

impl AnnotatedSchema {
    pub fn new(uri: impl Into<String>, schema: CompiledSchema, extracted: Extracted) -> Self {
        Self {
            uri: uri.into(),
            schema,
            extensions: extracted.root,
            property_extensions: extracted.properties,
        }
    }

    /// Root-level literal type name under `key`.
    pub fn type_override(&self, key: &str) -> Option<&str> {
        self.extensions.type_override(key)
    }

    /// Property-level literal type name under `key`.
    pub fn property_type_override(&self, property: &str, key: &str) -> Option<&str> {
        self.property_extensions
            .get(property)
            .and_then(|ext| ext.type_override(key))
    }
}

/// Append JSON Pointer tokens to a URI's fragment, creating the fragment if
/// the URI has none.
pub fn child_location(location: &str, tokens: &[&str]) -> String {
    let mut out = location.to_string();
    if !out.contains('#') {
        out.push('#');
    }
    for token in tokens {
        out.push('/');
        out.push_str(&escape_pointer_token(token));
    }
    out
}

/// Split a URI into document part and JSON Pointer (without the `#`).
/// Empty fragments count as none.
pub fn split_fragment(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('#') {
        Some((doc, fragment)) if !fragment.is_empty() => (doc, Some(fragment)),
        Some((doc, _)) => (doc, None),
        None => (uri, None),
    }
}

/// Whether `reference` stands on its own without a base URI.
pub fn is_absolute(reference: &str) -> bool {
    reference.contains("://") || reference.starts_with('/') || reference.starts_with("urn:")
}

/// Resolve a `$ref` against the URI of the document containing it.
///
/// Fragment-only references stay inside the document, absolute references
/// are taken verbatim, and relative paths replace the last path segment of
/// the document URI. A trailing empty fragment is dropped.
pub fn resolve_reference(doc_uri: &str, reference: &str) -> String {
    let (doc, _) = split_fragment(doc_uri);
    let reference = reference.strip_suffix('#').unwrap_or(reference);

    if reference.is_empty() {
        return doc.to_string();
    }
    if reference.starts_with('#') {
        return format!("{doc}{reference}");
    }
    if is_absolute(reference) {
        return normalize_uri(reference);
    }

    let base_dir = match doc.rfind('/') {
        Some(i) => &doc[..=i],
        None => "",
    };
    normalize_uri(&format!("{base_dir}{reference}"))
}

/// Collapse `.` and `..` path segments of a URI, keeping scheme, authority,
/// and fragment untouched.
pub fn normalize_uri(uri: &str) -> String {
    let (without_fragment, fragment) = match uri.split_once('#') {
        Some((u, f)) => (u, Some(f)),
        None => (uri, None),
    };

    let (prefix, path) = match without_fragment.find("://") {
        Some(i) => {
            let authority_start = i + 3;
            match without_fragment[authority_start..].find('/') {
                Some(j) => without_fragment.split_at(authority_start + j),
                None => (without_fragment, ""),
            }
        }
        None => ("", without_fragment),
    };

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut out = String::from(prefix);
    if rooted {
        out.push('/');
    }
    out.push_str(&segments.join("/"));
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
