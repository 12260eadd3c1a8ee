//! # Document Loader
//!
//! Fetches raw schema documents and feeds them to a [`SchemaRegistry`].
//!
//! ## Resolution Order
//!
//! 1. Path-prefix mappings from [`LoaderConfig::mappings`] (longest prefix
//!    wins), so `https://schemas.example.org/person.json` can be served from
//!    `./schemas/person.json`.
//! 2. `http://` and `https://` URIs through a blocking `reqwest` client.
//! 3. `file://` URIs and plain paths from the filesystem.
//!
//! Bytes are decoded as JSON when they parse as JSON, and as YAML
//! otherwise. YAML tags are dropped and scalar mapping keys stringified.

use std::cell::OnceCell;
use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;
use std::time::Duration;

use jsgen_core::{LoadError, LoaderConfig};
use serde_json::Value;

use crate::compiled::{resolve_reference, split_fragment};
use crate::registry::SchemaRegistry;

/// Where the bytes of a URI come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Http(String),
}

/// Fetches and decodes schema documents.
#[derive(Debug)]
pub struct SchemaLoader {
    config: LoaderConfig,
    client: OnceCell<reqwest::blocking::Client>,
}

impl SchemaLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Decide where `uri` is read from. Any fragment is ignored.
    pub fn locate(&self, uri: &str) -> Location {
        let (doc, _) = split_fragment(uri);

        let mapped = self
            .config
            .mappings
            .iter()
            .filter(|(prefix, _)| doc.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len());
        if let Some((prefix, dir)) = mapped {
            let rest = doc[prefix.len()..].trim_start_matches('/');
            return Location::File(dir.join(rest));
        }

        if doc.starts_with("http://") || doc.starts_with("https://") {
            return Location::Http(doc.to_string());
        }
        Location::File(PathBuf::from(doc.strip_prefix("file://").unwrap_or(doc)))
    }

    /// Raw bytes of the document at `uri`.
    pub fn fetch(&self, uri: &str) -> Result<Vec<u8>, LoadError> {
        match self.locate(uri) {
            Location::File(path) => {
                tracing::debug!(uri = %uri, path = %path.display(), "reading schema file");
                std::fs::read(&path).map_err(|source| LoadError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
            Location::Http(url) => self.fetch_http(&url),
        }
    }

    /// Fetch and decode the document at `uri`.
    pub fn load(&self, uri: &str) -> Result<Value, LoadError> {
        let bytes = self.fetch(uri)?;
        decode(uri, &bytes)
    }

    /// Load `uri` and every document it references, transitively, into
    /// `registry`. A target registered under the same URI, or declared as
    /// some document's `$id`, is not fetched again. Returns the URIs
    /// registered by this call, in load order.
    pub fn load_with_references(
        &self,
        registry: &mut SchemaRegistry,
        uri: &str,
    ) -> Result<Vec<String>, LoadError> {
        let mut registered = Vec::new();
        let mut queue = VecDeque::from([uri.to_string()]);
        let mut seen = BTreeSet::new();

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }

            if !registry.contains(&current) {
                let document = self.load(&current)?;
                registry.register(current.clone(), document);
                registered.push(current.clone());
            }
            let Ok(document) = registry.raw(&current) else {
                continue;
            };

            for reference in collect_references(document) {
                let location = resolve_reference(&current, &reference);
                let (target, _) = split_fragment(&location);
                if target.is_empty() || target == current || registry.is_known(target) {
                    continue;
                }
                queue.push_back(target.to_string());
            }
        }

        Ok(registered)
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        tracing::debug!(url = %url, "fetching schema over HTTP");
        let response = self
            .client()?
            .get(url)
            .send()
            .map_err(|e| LoadError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(LoadError::Http {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| LoadError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// The HTTP client, built on first use.
    fn client(&self) -> Result<&reqwest::blocking::Client, LoadError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .danger_accept_invalid_certs(self.config.insecure);

        if let Some(path) = &self.config.cacert {
            let pem = std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| LoadError::Client(format!("invalid CA certificate '{}': {e}", path.display())))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| LoadError::Client(format!("failed to build HTTP client: {e}")))?;
        Ok(self.client.get_or_init(|| client))
    }
}

/// Decode document bytes: JSON first, YAML otherwise.
pub fn decode(uri: &str, bytes: &[u8]) -> Result<Value, LoadError> {
    if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
        return Ok(value);
    }
    let yaml: serde_yaml::Value = serde_yaml::from_slice(bytes).map_err(|e| LoadError::Decode {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;
    yaml_to_json_value(&yaml).map_err(|reason| LoadError::Decode {
        uri: uri.to_string(),
        reason,
    })
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML mapping key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

/// Every `$ref` string anywhere in `document`, sorted and deduplicated.
pub fn collect_references(document: &Value) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut stack = vec![document];
    while let Some(node) = stack.pop() {
        match node {
            Value::Object(map) => {
                for (key, value) in map {
                    match (key.as_str(), value) {
                        ("$ref", Value::String(reference)) => {
                            out.insert(reference.clone());
                        }
                        _ => stack.push(value),
                    }
                }
            }
            Value::Array(items) => stack.extend(items),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_and_yaml() {
        let json_doc = decode("a.json", br#"{"type": "string"}"#).unwrap();
        assert_eq!(json_doc, json!({"type": "string"}));

        let yaml_doc = decode("a.yaml", b"type: object\nproperties:\n  id:\n    type: string\n").unwrap();
        assert_eq!(
            yaml_doc,
            json!({"type": "object", "properties": {"id": {"type": "string"}}})
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode("bad.yaml", b"key: [unclosed").unwrap_err();
        assert!(matches!(err, LoadError::Decode { ref uri, .. } if uri == "bad.yaml"), "{err:?}");
    }

    #[test]
    fn test_yaml_scalar_keys_are_stringified() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\nf: 1.5\n").unwrap();
        let value = yaml_to_json_value(&yaml).unwrap();
        assert_eq!(value, json!({"1": "one", "true": "yes", "f": 1.5}));
    }

    #[test]
    fn test_collect_references_walks_whole_tree() {
        let doc = json!({
            "properties": {
                "a": {"$ref": "a.json"},
                "b": {"type": "array", "items": {"$ref": "b.json#/$defs/x"}},
                "c": {"allOf": [{"$ref": "a.json"}, {"$ref": "#/$defs/local"}]}
            },
            "$defs": {"local": {"type": "string"}}
        });
        let refs: Vec<_> = collect_references(&doc).into_iter().collect();
        assert_eq!(refs, vec!["#/$defs/local", "a.json", "b.json#/$defs/x"]);
    }

    #[test]
    fn test_locate_prefers_longest_mapping() {
        let mut config = LoaderConfig::default();
        config.mappings.insert("https://x.org/".to_string(), PathBuf::from("/srv/all"));
        config.mappings.insert("https://x.org/v2/".to_string(), PathBuf::from("/srv/v2"));
        let loader = SchemaLoader::new(config);

        assert_eq!(
            loader.locate("https://x.org/v2/person.json#/$defs/a"),
            Location::File(PathBuf::from("/srv/v2/person.json"))
        );
        assert_eq!(
            loader.locate("https://x.org/person.json"),
            Location::File(PathBuf::from("/srv/all/person.json"))
        );
        assert_eq!(
            loader.locate("https://y.org/person.json"),
            Location::Http("https://y.org/person.json".to_string())
        );
        assert_eq!(
            loader.locate("file:///tmp/person.json"),
            Location::File(PathBuf::from("/tmp/person.json"))
        );
        assert_eq!(
            loader.locate("schemas/person.yaml"),
            Location::File(PathBuf::from("schemas/person.yaml"))
        );
    }

    #[test]
    fn test_load_missing_file() {
        let loader = SchemaLoader::new(LoaderConfig::default());
        let err = loader.load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }), "{err:?}");
    }

    #[test]
    fn test_bad_cacert_is_a_client_error() {
        let dir = tempfile::tempdir().unwrap();
        let pem = dir.path().join("ca.pem");
        std::fs::write(&pem, "not a certificate").unwrap();
        let config = LoaderConfig {
            cacert: Some(pem),
            ..LoaderConfig::default()
        };
        let loader = SchemaLoader::new(config);
        let err = loader.load("https://127.0.0.1:1/a.json").unwrap_err();
        assert!(
            matches!(err, LoadError::Client(_) | LoadError::Http { .. }),
            "unexpected error: {err:?}"
        );
    }
}
