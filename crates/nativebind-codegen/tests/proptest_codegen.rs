//! Property-based tests for naming and type mapping
//!
//! Generated names must be valid C identifiers, distinct for distinct
//! inputs, and stable across runs.

use nativebind_codegen::naming::{child_prefix, enum_case_name, qualified_name};
use nativebind_codegen::{NativeMapper, TypeRequest};
use nativebind_core::{Module, RuntimeNames, SchemaIndex, SchemaKind, SchemaNode};
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;

fn is_c_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Strategy: JSON-ish enum values as they appear in API schemas
fn arb_enum_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9.:+-]{0,15}"
}

// Strategy: schema property names
fn arb_property_names() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-z][a-zA-Z0-9]{0,8}", 1..8)
}

fn index_with_object(properties: &BTreeSet<String>) -> SchemaIndex {
    let props: Map<String, Value> = properties
        .iter()
        .map(|name| (name.clone(), json!({ "type": "string" })))
        .collect();
    let module = Module::from_value(json!({
        "$id": "https://example.com/schemas/Types",
        "title": "Types",
        "definitions": { "Info": { "type": "object", "properties": props } }
    }))
    .unwrap();
    [module].into_iter().collect()
}

proptest! {
    /// Property: enum case identifiers are uppercase C identifiers under the type prefix
    #[test]
    fn proptest_enum_case_name_is_identifier(value in arb_enum_value(), ty in "[A-Z][a-zA-Z]{0,10}") {
        let case = enum_case_name(&value, &ty);

        prop_assert!(is_c_identifier(&case), "not an identifier: {}", case);
        let expected_prefix = format!("{}_", ty.to_uppercase());
        prop_assert!(case.starts_with(&expected_prefix));
        prop_assert_eq!(case.to_uppercase(), case.clone());
    }

    /// Property: type names keep module, prefix and name in that order
    #[test]
    fn proptest_type_name_structure(
        module in "[a-z][a-zA-Z0-9]{0,8}",
        prefix in "[a-z][a-zA-Z0-9]{0,8}",
        name in "[a-z][a-zA-Z0-9]{0,8}"
    ) {
        let nested = qualified_name(&module, &child_prefix(&prefix, &name));

        prop_assert!(is_c_identifier(&nested));
        prop_assert_eq!(nested.matches('_').count(), 2);
        let expected_suffix = format!("_{}", nativebind_codegen::naming::capitalize(&name));
        prop_assert!(nested.ends_with(&expected_suffix));
    }

    /// Property: every property gets its own getter and mapping is repeatable
    #[test]
    fn proptest_object_accessors_unique_and_stable(properties in arb_property_names()) {
        let index = index_with_object(&properties);
        let runtime = RuntimeNames::default();
        let module = index.get("https://example.com/schemas/Types").unwrap();
        let node = SchemaNode::new(SchemaKind::Ref(module.definition_ref("Info")));
        let request = TypeRequest::new("Info", "", "Types#/definitions/Info");

        let first = NativeMapper::new(&index, &runtime).map_type(module, &node, &request).unwrap();
        let second = NativeMapper::new(&index, &runtime).map_type(module, &node, &request).unwrap();
        prop_assert_eq!(&first, &second);

        let declarations = first.declarations.render("\n");
        let getters: BTreeSet<&str> = declarations
            .lines()
            .filter(|line| line.contains("_Get_"))
            .collect();
        prop_assert_eq!(getters.len(), properties.len());
    }
}
