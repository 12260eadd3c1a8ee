//! # Target-Language Backends
//!
//! A [`Backend`] owns everything that depends on the output language: the
//! logical-type table, field-name convention, how references are spelled,
//! the file prelude, and the text of one declaration.
//!
//! ## Rendering Contract
//!
//! [`Backend::render`] sorts fields by display name before emitting them,
//! so output does not depend on the order fields were collected in.
//! [`render_all`] joins declarations with a blank line in caller order.
//!
//! | Logical type | Go | Rust |
//! |--------------|----|------|
//! | text | `string` | `String` |
//! | integer | `int` | `i64` |
//! | float | `float64` | `f64` |
//! | boolean | `bool` | `bool` |
//! | sequence | `[]any` | `Vec<serde_json::Value>` |
//! | mapping | `map[string]any` | `serde_json::Map<String, serde_json::Value>` |
//! | untyped | `any` | `serde_json::Value` |

use jsgen_core::naming::{ensure_identifier, to_pascal_case, to_snake_case};
use jsgen_core::{Field, GeneratedType, LogicalType, RenderError, TargetLanguage};

/// A code generation backend.
pub trait Backend: Send + Sync {
    /// Backend identifier (e.g. "go").
    fn name(&self) -> &'static str;

    fn language(&self) -> TargetLanguage;

    /// Extension key naming a literal type for this language.
    fn type_override_key(&self) -> &'static str {
        self.language().default_override_key()
    }

    /// Spelling of a logical type.
    fn logical_type(&self, logical: LogicalType) -> &'static str;

    /// Display name of the field generated for schema property `property`.
    fn field_name(&self, property: &str) -> String;

    /// Field type pointing at the declaration `type_name`. `recursive` is set
    /// when the target is still being generated, i.e. the reference closes
    /// a cycle.
    fn reference_type(&self, type_name: &str, recursive: bool) -> String;

    /// Text placed before all declarations of a file.
    fn prelude(&self, package: Option<&str>) -> String;

    /// Source text of one declaration.
    fn render(&self, type_name: &str, fields: &[Field]) -> Result<String, RenderError>;
}

/// The backend for `target`.
pub fn backend_for(target: TargetLanguage) -> Box<dyn Backend> {
    match target {
        TargetLanguage::Go => Box::new(GoBackend),
        TargetLanguage::Rust => Box::new(RustBackend),
    }
}

/// Join rendered declarations with a blank line, in the order given.
pub fn render_all<'a, I>(declarations: I) -> String
where
    I: IntoIterator<Item = &'a GeneratedType>,
{
    declarations
        .into_iter()
        .map(|d| d.code.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A complete source file: prelude, declarations, trailing newline.
pub fn emit_source<'a, I>(backend: &dyn Backend, package: Option<&str>, declarations: I) -> String
where
    I: IntoIterator<Item = &'a GeneratedType>,
{
    let mut out = backend.prelude(package);
    out.push_str(&render_all(declarations));
    out.push('\n');
    out
}

/// Fields sorted by display name, after checking the declaration is
/// well-formed.
fn sorted_fields<'a>(type_name: &str, fields: &'a [Field]) -> Result<Vec<&'a Field>, RenderError> {
    if type_name.trim().is_empty() {
        return Err(RenderError::EmptyTypeName);
    }
    let mut sorted: Vec<&Field> = fields.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(pair) = sorted.windows(2).find(|w| w[0].name == w[1].name) {
        return Err(RenderError::DuplicateField {
            type_name: type_name.to_string(),
            field: pair[0].name.clone(),
        });
    }
    Ok(sorted)
}

/// Go structs with `json` tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoBackend;

impl Backend for GoBackend {
    fn name(&self) -> &'static str {
        "go"
    }

    fn language(&self) -> TargetLanguage {
        TargetLanguage::Go
    }

    fn logical_type(&self, logical: LogicalType) -> &'static str {
        match logical {
            LogicalType::Text => "string",
            LogicalType::Integer => "int",
            LogicalType::Float => "float64",
            LogicalType::Boolean => "bool",
            LogicalType::Sequence => "[]any",
            LogicalType::Mapping => "map[string]any",
            LogicalType::Untyped => "any",
        }
    }

    fn field_name(&self, property: &str) -> String {
        ensure_identifier(to_pascal_case(property), "F", "Field")
    }

    fn reference_type(&self, type_name: &str, recursive: bool) -> String {
        if recursive {
            format!("*{type_name}")
        } else {
            type_name.to_string()
        }
    }

    fn prelude(&self, package: Option<&str>) -> String {
        match package {
            Some(package) => format!("package {package}\n\n"),
            None => String::new(),
        }
    }

    fn render(&self, type_name: &str, fields: &[Field]) -> Result<String, RenderError> {
        let fields = sorted_fields(type_name, fields)?;
        let mut out = format!("type {type_name} struct {{\n");
        for field in fields {
            out.push_str(&format!("\t{} {} `json:\"{}\"`\n", field.name, field.type_name, field.tag));
        }
        out.push('}');
        Ok(out)
    }
}

/// Rust structs deriving serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const RUST_RESERVED_PATHS: &[&str] = &["crate", "self", "super"];

impl RustBackend {
    /// Field name without any `r#` prefix.
    fn bare_name(name: &str) -> &str {
        name.strip_prefix("r#").unwrap_or(name)
    }
}

impl Backend for RustBackend {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn language(&self) -> TargetLanguage {
        TargetLanguage::Rust
    }

    fn logical_type(&self, logical: LogicalType) -> &'static str {
        match logical {
            LogicalType::Text => "String",
            LogicalType::Integer => "i64",
            LogicalType::Float => "f64",
            LogicalType::Boolean => "bool",
            LogicalType::Sequence => "Vec<serde_json::Value>",
            LogicalType::Mapping => "serde_json::Map<String, serde_json::Value>",
            LogicalType::Untyped => "serde_json::Value",
        }
    }

    fn field_name(&self, property: &str) -> String {
        let name = ensure_identifier(to_snake_case(property), "field_", "field");
        if RUST_RESERVED_PATHS.contains(&name.as_str()) {
            format!("{name}_")
        } else if RUST_KEYWORDS.contains(&name.as_str()) {
            format!("r#{name}")
        } else {
            name
        }
    }

    fn reference_type(&self, type_name: &str, recursive: bool) -> String {
        if recursive {
            format!("Option<Box<{type_name}>>")
        } else {
            type_name.to_string()
        }
    }

    fn prelude(&self, package: Option<&str>) -> String {
        let mut out = String::new();
        if let Some(package) = package {
            out.push_str(&format!("//! Types generated for `{package}`.\n\n"));
        }
        out.push_str("use serde::{Deserialize, Serialize};\n\n");
        out
    }

    fn render(&self, type_name: &str, fields: &[Field]) -> Result<String, RenderError> {
        let fields = sorted_fields(type_name, fields)?;
        let mut out = String::from("#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n");
        out.push_str(&format!("pub struct {type_name} {{\n"));
        for field in fields {
            if Self::bare_name(&field.name) != field.tag {
                out.push_str(&format!("    #[serde(rename = {:?})]\n", field.tag));
            }
            out.push_str(&format!("    pub {}: {},\n", field.name, field.type_name));
        }
        out.push('}');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: &str, tag: &str) -> Field {
        Field::plain(name, ty, tag)
    }

    #[test]
    fn test_go_render_sorts_fields() {
        let fields = vec![
            field("Name", "string", "name"),
            field("Address", "AddressObject", "address"),
            field("ZipCode", "string", "zip_code"),
        ];
        let code = GoBackend.render("Company", &fields).unwrap();
        assert_eq!(
            code,
            "type Company struct {\n\
             \tAddress AddressObject `json:\"address\"`\n\
             \tName string `json:\"name\"`\n\
             \tZipCode string `json:\"zip_code\"`\n\
             }"
        );
    }

    #[test]
    fn test_go_render_empty_struct() {
        assert_eq!(GoBackend.render("Empty", &[]).unwrap(), "type Empty struct {\n}");
    }

    #[test]
    fn test_render_rejects_empty_type_name() {
        assert_eq!(GoBackend.render(" ", &[]), Err(RenderError::EmptyTypeName));
        assert_eq!(RustBackend.render("", &[]), Err(RenderError::EmptyTypeName));
    }

    #[test]
    fn test_render_rejects_duplicate_field() {
        let fields = vec![field("Id", "string", "id"), field("Id", "int", "ID")];
        assert_eq!(
            GoBackend.render("A", &fields),
            Err(RenderError::DuplicateField {
                type_name: "A".to_string(),
                field: "Id".to_string(),
            })
        );
    }

    #[test]
    fn test_rust_render_renames_and_raw_identifiers() {
        let fields = vec![
            field("zip_code", "String", "zipCode"),
            field("r#type", "String", "type"),
            field("name", "String", "name"),
        ];
        let code = RustBackend.render("Address", &fields).unwrap();
        assert_eq!(
            code,
            "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n\
             pub struct Address {\n\
             \x20   pub name: String,\n\
             \x20   pub r#type: String,\n\
             \x20   #[serde(rename = \"zipCode\")]\n\
             \x20   pub zip_code: String,\n\
             }"
        );
    }

    #[test]
    fn test_field_names_per_language() {
        assert_eq!(GoBackend.field_name("first_name"), "FirstName");
        assert_eq!(GoBackend.field_name("2fa"), "F2fa");
        assert_eq!(GoBackend.field_name("--"), "Field");
        assert_eq!(RustBackend.field_name("firstName"), "first_name");
        assert_eq!(RustBackend.field_name("type"), "r#type");
        assert_eq!(RustBackend.field_name("self"), "self_");
        assert_eq!(RustBackend.field_name("3d"), "field_3d");
    }

    #[test]
    fn test_reference_types() {
        assert_eq!(GoBackend.reference_type("Person", false), "Person");
        assert_eq!(GoBackend.reference_type("Node", true), "*Node");
        assert_eq!(RustBackend.reference_type("Node", true), "Option<Box<Node>>");
    }

    #[test]
    fn test_preludes() {
        assert_eq!(GoBackend.prelude(None), "");
        assert_eq!(GoBackend.prelude(Some("models")), "package models\n\n");
        assert!(RustBackend.prelude(None).starts_with("use serde::{Deserialize, Serialize};"));
        assert!(RustBackend.prelude(Some("models")).starts_with("//! Types generated for `models`."));
    }

    #[test]
    fn test_render_all_and_emit_source() {
        let a = GeneratedType {
            uri: "a".to_string(),
            name: "A".to_string(),
            fields: vec![],
            code: "type A struct {\n}".to_string(),
        };
        let b = GeneratedType {
            uri: "b".to_string(),
            name: "B".to_string(),
            fields: vec![],
            code: "type B struct {\n}".to_string(),
        };
        assert_eq!(render_all([&a, &b]), "type A struct {\n}\n\ntype B struct {\n}");
        assert_eq!(
            emit_source(&GoBackend, Some("m"), [&a]),
            "package m\n\ntype A struct {\n}\n"
        );
    }

    #[test]
    fn test_override_keys() {
        assert_eq!(backend_for(TargetLanguage::Go).type_override_key(), "x-go-type");
        assert_eq!(backend_for(TargetLanguage::Rust).type_override_key(), "x-rust-type");
    }
}
