//! Property tests: deterministic output and tag preservation over generated
//! schemas.

use jsgen_codegen::{emit_source, Generator};
use jsgen_core::GeneratorConfig;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({"type": "string"})),
        Just(json!({"type": "integer"})),
        Just(json!({"type": "number"})),
        Just(json!({"type": "boolean"})),
        Just(json!({"type": "array"})),
        Just(json!({"type": "object"})),
        Just(json!({})),
        Just(json!({"$ref": "shared"})),
        Just(json!({"type": "object", "properties": {"inner": {"type": "string"}}})),
    ]
}

fn properties() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map("[a-z][a-zA-Z0-9_]{0,10}", primitive(), 0..8)
        .prop_map(|map| map.into_iter().collect())
}

fn object_from(entries: &[(String, Value)]) -> Value {
    let props: Map<String, Value> = entries.iter().cloned().collect();
    json!({"type": "object", "properties": props})
}

fn run(root: Value) -> String {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator
        .registry_mut()
        .register("shared", json!({"type": "object", "properties": {"id": {"type": "string"}}}));
    let types = generator.generate_all("root", root, "Root").unwrap();
    emit_source(generator.backend(), None, types.iter().map(|t| t.as_ref()))
}

proptest! {
    /// Property insertion order never changes the output.
    #[test]
    fn output_independent_of_property_order(entries in properties()) {
        let forward = object_from(&entries);
        let mut reversed_entries = entries.clone();
        reversed_entries.reverse();
        let reversed = object_from(&reversed_entries);

        prop_assert_eq!(run(forward.clone()), run(reversed));
        prop_assert_eq!(run(forward.clone()), run(forward));
    }

    /// Every field's tag is exactly one of the schema's property names.
    #[test]
    fn tags_are_original_property_names(entries in properties()) {
        let root = object_from(&entries);
        let mut generator = Generator::new(GeneratorConfig::default());
        generator
            .registry_mut()
            .register("shared", json!({"type": "object", "properties": {"id": {"type": "string"}}}));
        let types = generator.generate_all("root", root.clone(), "Root").unwrap();

        let declared: Vec<&String> = root["properties"].as_object().unwrap().keys().collect();
        let root_type = types.iter().find(|t| t.uri == "root").unwrap();
        prop_assert_eq!(root_type.fields.len(), declared.len());
        for field in &root_type.fields {
            prop_assert!(declared.contains(&&field.tag), "tag {} not declared", field.tag);
        }
    }
}
