//! # Type Inference
//!
//! Decides the type of one property field. The first rule that applies
//! wins:
//!
//! 1. A property-level type override is used verbatim.
//! 2. A `$ref` becomes a reference field. The target is canonicalized
//!    against the registry and generated before the field is returned.
//! 3. An inline object with at least one property is promoted to its own
//!    declaration named `<Property><inline suffix>`.
//! 4. Anything else maps through the backend's logical-type table.
//!
//! The serialization tag is always the property name as written in the
//! schema.

use jsgen_core::naming::{to_pascal_case, type_name_from_uri};
use jsgen_core::{Field, JsgenError, LogicalType, ReferenceResolutionError};
use jsgen_schema::{AnnotatedSchema, CompiledSchema, ExtensionExtractor, Reference};
use serde_json::Value;

use crate::generator::{GenerationCache, Generator};

impl Generator {
    /// Field for `property`, whose compiled schema is `schema`, declared by
    /// `parent`.
    pub fn resolve_type(
        &mut self,
        cache: &mut GenerationCache,
        property: &str,
        schema: &CompiledSchema,
        parent: &AnnotatedSchema,
    ) -> Result<Field, JsgenError> {
        let name = self.backend.field_name(property);

        if let Some(literal) = parent.property_type_override(property, self.override_key()) {
            return Ok(Field::plain(name, literal, property));
        }

        if let Some(reference) = schema.reference() {
            return self.reference_field(cache, name, property, reference, parent);
        }

        if schema.logical_type() == LogicalType::Mapping && !schema.properties().is_empty() {
            match self.promote_inline(cache, property, schema) {
                Ok((uri, field_type)) => {
                    return Ok(Field {
                        name,
                        type_name: field_type,
                        tag: property.to_string(),
                        ref_uri: Some(uri),
                        recursive: false,
                    })
                }
                Err(e) => {
                    tracing::warn!(
                        uri = %parent.uri,
                        property = %property,
                        error = %e,
                        "inline object not promoted, falling back to mapping type"
                    );
                }
            }
        }

        let field_type = self.backend.logical_type(schema.logical_type());
        Ok(Field::plain(name, field_type, property))
    }

    fn reference_field(
        &mut self,
        cache: &mut GenerationCache,
        name: String,
        property: &str,
        reference: &Reference,
        parent: &AnnotatedSchema,
    ) -> Result<Field, JsgenError> {
        let resolved = match self.registry.canonicalize(&reference.location) {
            Some(uri) => uri,
            None => {
                tracing::warn!(
                    uri = %parent.uri,
                    property = %property,
                    reference = %reference.raw,
                    "reference matches no registered schema, trying it as written"
                );
                reference.location.clone()
            }
        };

        if let Some(in_progress) = cache.in_progress_name(&resolved) {
            tracing::debug!(uri = %resolved, "reference closes a cycle");
            return Ok(Field {
                name,
                type_name: self.backend.reference_type(in_progress, true),
                tag: property.to_string(),
                ref_uri: Some(resolved),
                recursive: true,
            });
        }

        let desired = type_name_from_uri(&resolved, &self.config.fallback_type_name);
        let target = self.generate(cache, &resolved, &desired).map_err(|source| {
            ReferenceResolutionError {
                uri: parent.uri.clone(),
                property: property.to_string(),
                reference: reference.raw.clone(),
                resolved: resolved.clone(),
                source: Box::new(source),
            }
        })?;

        Ok(Field {
            name,
            type_name: self.backend.reference_type(&target.name, false),
            tag: property.to_string(),
            ref_uri: Some(resolved),
            recursive: false,
        })
    }

    /// Register a reconstructed schema for an inline object under a URI
    /// scoped below its parent, generate it, and return that URI with the
    /// field type.
    fn promote_inline(
        &mut self,
        cache: &mut GenerationCache,
        property: &str,
        schema: &CompiledSchema,
    ) -> Result<(String, String), JsgenError> {
        let uri = schema.location().to_string();
        let mut raw = schema.to_raw();
        if let Ok(original) = self.registry.raw(&uri) {
            overlay_extensions(&mut raw, original, self.registry.extractor());
        }
        self.registry.register(uri.clone(), raw);

        let desired = format!("{}{}", to_pascal_case(property), self.config.inline_suffix);
        tracing::debug!(uri = %uri, type_name = %desired, "promoting inline object");
        let generated = self.generate(cache, &uri, &desired)?;
        let field_type = self.backend.reference_type(&generated.name, false);
        Ok((uri, field_type))
    }
}

/// Copy extension keys from `source` onto `target` at matching positions
/// (the node itself, each property, `items`).
fn overlay_extensions(target: &mut Value, source: &Value, extractor: &ExtensionExtractor) {
    let (Some(target_map), Some(source_map)) = (target.as_object_mut(), source.as_object()) else {
        return;
    };

    for (key, value) in source_map {
        if extractor.is_extension(key) {
            target_map.insert(key.clone(), value.clone());
        }
    }

    if let (Some(Value::Object(target_props)), Some(Value::Object(source_props))) =
        (target_map.get_mut("properties"), source_map.get("properties"))
    {
        for (name, sub) in target_props.iter_mut() {
            if let Some(source_sub) = source_props.get(name) {
                overlay_extensions(sub, source_sub, extractor);
            }
        }
    }

    if let (Some(target_items), Some(source_items)) = (target_map.get_mut("items"), source_map.get("items")) {
        overlay_extensions(target_items, source_items, extractor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsgen_core::GeneratorConfig;
    use serde_json::json;

    #[test]
    fn test_overlay_restores_nested_extensions() {
        let mut target = json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        });
        let source = json!({
            "type": "object",
            "x-go-type": "Thing",
            "description": "not copied",
            "properties": {
                "id": {"type": "string", "x-go-type": "uuid.UUID"},
                "tags": {"type": "array", "items": {"type": "string", "x-k": 1}},
                "gone": {"x-go-type": "Never"}
            }
        });
        overlay_extensions(&mut target, &source, &ExtensionExtractor::default());
        assert_eq!(
            target,
            json!({
                "type": "object",
                "x-go-type": "Thing",
                "properties": {
                    "id": {"type": "string", "x-go-type": "uuid.UUID"},
                    "tags": {"type": "array", "items": {"type": "string", "x-k": 1}}
                }
            })
        );
    }

    #[test]
    fn test_promoted_inline_field_is_a_reference() {
        let mut generator = Generator::new(GeneratorConfig::default());
        let types = generator
            .generate_all(
                "a",
                json!({"properties": {"addr": {"type": "object", "properties": {"s": {"type": "string"}}}}}),
                "A",
            )
            .unwrap();

        let a = &types[0];
        let addr = a.field_by_tag("addr").unwrap();
        assert!(addr.is_ref());
        assert!(!addr.recursive);
        assert_eq!(addr.type_name, "AddrObject");
        assert_eq!(addr.ref_uri.as_deref(), Some("a#/properties/addr"));
        assert_eq!(a.references().collect::<Vec<_>>(), vec!["a#/properties/addr"]);
        assert_eq!(types[1].uri, "a#/properties/addr");
    }

    #[test]
    fn test_override_bypasses_inference() {
        let mut generator = Generator::new(GeneratorConfig::default());
        let raw = json!({
            "type": "object",
            "properties": {"when": {"type": "integer", "x-go-type": "time.Time"}}
        });
        generator.registry_mut().register("e", raw);
        let parent = generator.registry().compile("e").unwrap();
        let schema = parent.schema.property("when").unwrap().clone();

        let mut cache = GenerationCache::new();
        let field = generator.resolve_type(&mut cache, "when", &schema, &parent).unwrap();
        assert_eq!(field, Field::plain("When", "time.Time", "when"));
    }
}
