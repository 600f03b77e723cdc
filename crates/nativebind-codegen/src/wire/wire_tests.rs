#![allow(non_snake_case)]

use super::*;
use serde_json::json;

fn index(schemas: Value) -> SchemaIndex {
    let types = Module::from_value(json!({
        "$id": "https://example.com/schemas/Types",
        "title": "Types",
        "definitions": {
            "Resolution": { "type": "object", "properties": { "width": { "type": "integer", "minimum": 0 } } }
        }
    }))
    .unwrap();
    let device = Module::from_value(json!({
        "openrpc": "1.2.4",
        "info": { "title": "Device" },
        "methods": [],
        "components": { "schemas": schemas }
    }))
    .unwrap();
    [types, device].into_iter().collect()
}

fn map(schemas: Value, definition: &str) -> GenResult<WireType> {
    let index = index(schemas);
    let runtime = RuntimeNames::default();
    let device = index.get("Device").unwrap();
    let node = SchemaNode::new(SchemaKind::Ref(device.definition_ref(definition)));
    WireMapper::new(&index, &runtime).map_type(device, &node, &TypeRequest::new(definition, "", "Device#/test"))
}

#[test]
fn map_type___object___container_class_with_members_in_order() {
    let mapped = map(
        json!({ "Info": { "type": "object", "properties": {
            "name": { "type": "string" },
            "count": { "type": "integer", "minimum": 0 },
            "ratio": { "type": "number" }
        } } }),
        "Info",
    )
    .unwrap();

    assert_eq!(mapped.name, "FireboltSDK::Device::JsonData_Info");
    let class = mapped.definitions.get("JsonData_Info").unwrap();
    assert!(class.starts_with("    class JsonData_Info : public WPEFramework::Core::JSON::Container {\n"));
    let name = class.find("Add(_T(\"name\"), &Name);").unwrap();
    let count = class.find("Add(_T(\"count\"), &Count);").unwrap();
    assert!(name < count);
    assert!(class.contains("        FireboltSDK::JSON::String Name;\n"));
    assert!(class.contains("        WPEFramework::Core::JSON::DecUInt32 Count;\n"));
    assert!(class.contains("        WPEFramework::Core::JSON::Float Ratio;\n"));
    assert!(class.contains("JsonData_Info(const JsonData_Info& copy)"));
    assert!(class.contains("JsonData_Info& operator=(const JsonData_Info& rhs)"));
}

#[test]
fn map_type___nested_object___child_class_first() {
    let mapped = map(
        json!({ "Info": { "type": "object", "properties": {
            "hdcp": { "type": "object", "properties": { "version": { "type": "string" } } }
        } } }),
        "Info",
    )
    .unwrap();

    let classes: Vec<_> = mapped.definitions.symbols().collect();
    assert_eq!(classes, vec!["JsonData_Info_Hdcp", "JsonData_Info"]);
    assert!(
        mapped
            .definitions
            .get("JsonData_Info")
            .unwrap()
            .contains("FireboltSDK::Device::JsonData_Info_Hdcp Hdcp;")
    );
}

#[test]
fn map_type___wrappers___per_schema_kind() {
    let cases = [
        (json!({ "type": "boolean" }), "WPEFramework::Core::JSON::Boolean"),
        (json!({ "type": "integer" }), "WPEFramework::Core::JSON::DecSInt32"),
        (json!({ "type": "string", "enum": ["a"] }), "WPEFramework::Core::JSON::EnumType<Device_X>"),
        (json!({ "type": "object" }), "FireboltSDK::JSON::String"),
        (
            json!({ "type": "object", "additionalProperties": { "type": "string" } }),
            "WPEFramework::Core::JSON::VariantContainer",
        ),
        (
            json!({ "type": "array", "items": { "type": "number" } }),
            "WPEFramework::Core::JSON::ArrayType<WPEFramework::Core::JSON::Float>",
        ),
        (json!({ "const": "fixed" }), "FireboltSDK::JSON::String"),
    ];

    for (schema, expected) in cases {
        let mapped = map(json!({ "X": schema }), "X").unwrap();
        assert_eq!(mapped.name, expected, "schema {schema}");
        assert!(mapped.definitions.is_empty());
    }
}

#[test]
fn map_type___external_ref___no_definitions() {
    let mapped = map(
        json!({ "Screen": { "$ref": "https://example.com/schemas/Types#/definitions/Resolution" } }),
        "Screen",
    )
    .unwrap();

    assert_eq!(mapped.name, "FireboltSDK::Types::JsonData_Resolution");
    assert!(mapped.definitions.is_empty());
    assert!(mapped.external_modules.contains("Types"));
}

#[test]
fn map_type___undetermined_member___skipped_with_diagnostic() {
    let mapped = map(
        json!({ "Info": { "type": "object", "properties": { "a": { "type": "string" }, "any": {} } } }),
        "Info",
    )
    .unwrap();

    assert_eq!(mapped.diagnostics.len(), 1);
    assert!(!mapped.definitions.get("JsonData_Info").unwrap().contains("Any"));
}

#[test]
fn map_type___union___unsupported() {
    let err = map(json!({ "U": { "anyOf": [{ "type": "string" }, { "type": "number" }] } }), "U").unwrap_err();

    assert!(matches!(err, GenError::UnsupportedUnionSchema { .. }));
}

#[test]
fn WireNames___class_name___prefixes_stem() {
    assert_eq!(WireNames::class_name("Info"), "JsonData_Info");
    assert_eq!(WireNames::class_name("Info_Hdcp_2"), "JsonData_Info_Hdcp_2");
}

#[test]
fn map_type___inline_object_named_like_definition___suffixed_container() {
    let mapped = map(
        json!({
            "Info": { "type": "object", "properties": {
                "hdcp": { "type": "object", "properties": { "version": { "type": "string" } } }
            } },
            "Info_Hdcp": { "type": "object", "properties": { "level": { "type": "integer" } } }
        }),
        "Info",
    )
    .unwrap();

    assert!(mapped.definitions.get("JsonData_Info_Hdcp_2").is_some());
    assert!(mapped.definitions.get("JsonData_Info_Hdcp").is_none());
    assert!(
        mapped
            .definitions
            .get("JsonData_Info")
            .unwrap()
            .contains("        FireboltSDK::Device::JsonData_Info_Hdcp_2 Hdcp;\n")
    );
}
