//! # Extension Extraction
//!
//! Pulls out-of-band annotations (keys starting with a reserved prefix,
//! `x-` by default) out of a raw schema document, at the document root and
//! for every declared property.
//!
//! Extraction runs on the raw tree because the compiled view keeps standard
//! keywords only. It never fails: a non-object document yields no
//! extensions, and a `properties` value that is not an object yields an
//! empty property mapping.

use std::collections::BTreeMap;

use serde_json::Value;

/// Extension key → value, for one schema node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionSet {
    entries: BTreeMap<String, Value>,
}

impl ExtensionSet {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// The literal type name under `key`, if the value is text.
    pub fn type_override(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Result of running the extractor over one schema node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    /// Extensions declared on the node itself.
    pub root: ExtensionSet,
    /// Extensions declared on each entry of the node's `properties`.
    pub properties: BTreeMap<String, ExtensionSet>,
}

/// Extracts prefixed keys from raw schema nodes.
#[derive(Debug, Clone)]
pub struct ExtensionExtractor {
    prefix: String,
}

impl Default for ExtensionExtractor {
    fn default() -> Self {
        Self::new("x-")
    }
}

impl ExtensionExtractor {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `key` is an extension key.
    pub fn is_extension(&self, key: &str) -> bool {
        key.starts_with(&self.prefix)
    }

    /// Extension entries declared directly on `node`.
    pub fn extract_node(&self, node: &Value) -> ExtensionSet {
        let Some(map) = node.as_object() else {
            return ExtensionSet::default();
        };
        map.iter()
            .filter(|(key, _)| self.is_extension(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Root extensions of `node` plus the extensions of each declared
    /// property. Property entries that are not objects are skipped.
    pub fn extract(&self, node: &Value) -> Extracted {
        let root = self.extract_node(node);
        let properties = node
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .filter(|(_, schema)| schema.is_object())
                    .map(|(name, schema)| (name.clone(), self.extract_node(schema)))
                    .collect()
            })
            .unwrap_or_default();
        Extracted { root, properties }
    }
}
