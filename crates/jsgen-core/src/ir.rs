//! # Generated-Type Data Model
//!
//! The language-agnostic result of a generation run. A [`GeneratedType`] is
//! created exactly once per schema URI and never mutated afterwards; its
//! [`Field`]s carry the display name, the target-language type spelling,
//! the serialization tag, and the reference target when the field points at
//! another declaration.

use serde::{Deserialize, Serialize};

/// Target-agnostic type a schema primitive maps to.
///
/// `Untyped` covers every shape the inference table does not model:
/// composition keywords, several declared types, or no type at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    Text,
    Integer,
    Float,
    Boolean,
    Sequence,
    Mapping,
    Untyped,
}

impl LogicalType {
    /// Map a JSON Schema `type` keyword value.
    pub fn from_json_type(name: &str) -> Self {
        match name {
            "string" => Self::Text,
            "integer" => Self::Integer,
            "number" => Self::Float,
            "boolean" => Self::Boolean,
            "array" => Self::Sequence,
            "object" => Self::Mapping,
            _ => Self::Untyped,
        }
    }

    /// Map a declared type list. `"null"` is ignored; anything but exactly
    /// one remaining type is untyped.
    pub fn from_declared<S: AsRef<str>>(types: &[S]) -> Self {
        let mut non_null = types.iter().map(AsRef::as_ref).filter(|t| *t != "null");
        match (non_null.next(), non_null.next()) {
            (Some(only), None) => Self::from_json_type(only),
            _ => Self::Untyped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Untyped => "untyped",
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a generated declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Display name in the target language's naming convention.
    pub name: String,
    /// Target-language type spelling, already in its final form.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Serialization tag: the schema property name, verbatim.
    pub tag: String,
    /// URI of the declaration this field refers to, for reference and
    /// promoted-inline fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_uri: Option<String>,
    /// The field points back at a declaration that was still being
    /// generated when the field was resolved.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recursive: bool,
}

impl Field {
    /// A field with a plain (non-reference) type.
    pub fn plain(name: impl Into<String>, type_name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            tag: tag.into(),
            ref_uri: None,
            recursive: false,
        }
    }

    /// Whether the field refers to another generated declaration.
    pub fn is_ref(&self) -> bool {
        self.ref_uri.is_some()
    }
}

/// A type declaration produced for one schema URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedType {
    /// URI of the schema the declaration was generated from.
    pub uri: String,
    /// Declared type name.
    pub name: String,
    /// Fields, sorted by display name.
    pub fields: Vec<Field>,
    /// Rendered source text of the declaration.
    pub code: String,
}

impl GeneratedType {
    /// Look up a field by its serialization tag.
    pub fn field_by_tag(&self, tag: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// URIs of every declaration this one refers to.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|f| f.ref_uri.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_type_table() {
        assert_eq!(LogicalType::from_json_type("string"), LogicalType::Text);
        assert_eq!(LogicalType::from_json_type("integer"), LogicalType::Integer);
        assert_eq!(LogicalType::from_json_type("number"), LogicalType::Float);
        assert_eq!(LogicalType::from_json_type("boolean"), LogicalType::Boolean);
        assert_eq!(LogicalType::from_json_type("array"), LogicalType::Sequence);
        assert_eq!(LogicalType::from_json_type("object"), LogicalType::Mapping);
        assert_eq!(LogicalType::from_json_type("null"), LogicalType::Untyped);
        assert_eq!(LogicalType::from_json_type("strng"), LogicalType::Untyped);
    }

    #[test]
    fn test_declared_types_ignore_null() {
        assert_eq!(LogicalType::from_declared(&["string", "null"]), LogicalType::Text);
        assert_eq!(LogicalType::from_declared(&["null", "integer"]), LogicalType::Integer);
    }

    #[test]
    fn test_declared_types_multiple_or_none_are_untyped() {
        assert_eq!(LogicalType::from_declared(&["string", "integer"]), LogicalType::Untyped);
        assert_eq!(LogicalType::from_declared::<&str>(&[]), LogicalType::Untyped);
        assert_eq!(LogicalType::from_declared(&["null"]), LogicalType::Untyped);
    }

    #[test]
    fn test_field_serializes_without_empty_reference() {
        let field = Field::plain("Id", "string", "id");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Id", "type": "string", "tag": "id"}));
        assert!(!field.is_ref());
    }

    #[test]
    fn test_references_lists_ref_fields() {
        let mut owner = Field::plain("Owner", "Person", "owner");
        owner.ref_uri = Some("person".to_string());
        let ty = GeneratedType {
            uri: "company".to_string(),
            name: "Company".to_string(),
            fields: vec![Field::plain("Name", "string", "name"), owner],
            code: String::new(),
        };
        assert_eq!(ty.references().collect::<Vec<_>>(), vec!["person"]);
        assert_eq!(ty.field_by_tag("owner").map(|f| f.name.as_str()), Some("Owner"));
    }
}
