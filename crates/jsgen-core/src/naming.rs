//! Naming convention utilities for code generation.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `first_name` | [`to_pascal_case`] | `FirstName` |
//! | `firstName` | [`to_snake_case`] | `first_name` |
//! | `word` | [`capitalize`] | `Word` |
//! | `schemas/person.yaml` | [`type_name_from_uri`] | `Person` |

/// Capitalize the first letter of a string.
///
/// ```
/// use jsgen_core::naming::capitalize;
///
/// assert_eq!(capitalize("hello"), "Hello");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Convert a schema name to PascalCase.
///
/// Every non-alphanumeric character separates words; the casing inside a
/// word is kept, so `firstName` stays `FirstName`.
///
/// ```
/// use jsgen_core::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("first_name"), "FirstName");
/// assert_eq!(to_pascal_case("company-info"), "CompanyInfo");
/// assert_eq!(to_pascal_case("id"), "Id");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .map(capitalize)
        .collect()
}

/// Convert a schema name to snake_case.
///
/// ```
/// use jsgen_core::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("firstName"), "first_name");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// assert_eq!(to_snake_case("zip-code"), "zip_code");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Make `name` usable as an identifier: empty names become `fallback`, and a
/// leading digit gets `prefix` in front of it.
pub fn ensure_identifier(name: String, prefix: &str, fallback: &str) -> String {
    match name.chars().next() {
        None => fallback.to_string(),
        Some(c) if c.is_ascii_digit() => format!("{prefix}{name}"),
        Some(_) => name,
    }
}

/// Derive a type name from a schema URI.
///
/// Fragment URIs name the type after the last pointer segment
/// (`doc.json#/$defs/address` → `Address`); other URIs after the last path
/// segment with `.json`/`.yaml`/`.yml` and a trailing `.schema` removed.
/// Returns `fallback` when nothing usable remains.
///
/// ```
/// use jsgen_core::naming::type_name_from_uri;
///
/// assert_eq!(type_name_from_uri("person", "Object"), "Person");
/// assert_eq!(type_name_from_uri("https://x.org/s/company.schema.json", "Object"), "Company");
/// assert_eq!(type_name_from_uri("doc.yaml#/$defs/street_address", "Object"), "StreetAddress");
/// assert_eq!(type_name_from_uri("", "Object"), "Object");
/// ```
pub fn type_name_from_uri(uri: &str, fallback: &str) -> String {
    let (doc, fragment) = match uri.split_once('#') {
        Some((doc, fragment)) => (doc, fragment),
        None => (uri, ""),
    };

    let raw = match fragment.rsplit('/').find(|s| !s.is_empty()) {
        Some(segment) => unescape_pointer_token(segment),
        None => {
            let last = doc.rsplit('/').next().unwrap_or("");
            let stem = [".json", ".yaml", ".yml"]
                .iter()
                .find_map(|ext| last.strip_suffix(ext))
                .unwrap_or(last);
            stem.strip_suffix(".schema").unwrap_or(stem).to_string()
        }
    };

    ensure_identifier(to_pascal_case(&raw), "T", fallback)
}

/// Escape a JSON Pointer reference token (RFC 6901).
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Undo [`escape_pointer_token`].
pub fn unescape_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case_splits_on_separators() {
        assert_eq!(to_pascal_case("first_name"), "FirstName");
        assert_eq!(to_pascal_case("first-name"), "FirstName");
        assert_eq!(to_pascal_case("first.name"), "FirstName");
        assert_eq!(to_pascal_case("firstName"), "FirstName");
        assert_eq!(to_pascal_case("__private"), "Private");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_snake_case_boundaries() {
        assert_eq!(to_snake_case("id"), "id");
        assert_eq!(to_snake_case("userID"), "user_id");
        assert_eq!(to_snake_case("version2Name"), "version2_name");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("Trailing-"), "trailing");
    }

    #[test]
    fn test_ensure_identifier() {
        assert_eq!(ensure_identifier("3d".to_string(), "F", "Field"), "F3d");
        assert_eq!(ensure_identifier(String::new(), "F", "Field"), "Field");
        assert_eq!(ensure_identifier("Ok".to_string(), "F", "Field"), "Ok");
    }

    #[test]
    fn test_type_name_from_uri_variants() {
        assert_eq!(type_name_from_uri("person.yaml", "Object"), "Person");
        assert_eq!(type_name_from_uri("./schemas/person.yml", "Object"), "Person");
        assert_eq!(type_name_from_uri("company.yaml#", "Object"), "Company");
        assert_eq!(type_name_from_uri("a.json#/definitions/b~1c", "Object"), "BC");
        assert_eq!(type_name_from_uri("dir/", "Object"), "Object");
        assert_eq!(type_name_from_uri("2fa.json", "Object"), "T2fa");
    }

    #[test]
    fn test_pointer_token_round_trip() {
        let token = "a/b~c";
        assert_eq!(escape_pointer_token(token), "a~1b~0c");
        assert_eq!(unescape_pointer_token(&escape_pointer_token(token)), token);
    }
}
