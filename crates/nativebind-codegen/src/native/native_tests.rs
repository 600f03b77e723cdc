#![allow(non_snake_case)]

use super::*;
use serde_json::json;

fn types_module() -> Module {
    Module::from_value(json!({
        "$id": "https://example.com/schemas/Types",
        "title": "Types",
        "definitions": {
            "Resolution": {
                "type": "object",
                "properties": { "width": { "type": "integer" }, "height": { "type": "integer" } }
            }
        }
    }))
    .unwrap()
}

fn device_module(schemas: serde_json::Value) -> Module {
    Module::from_value(json!({
        "openrpc": "1.2.4",
        "info": { "title": "Device" },
        "methods": [],
        "components": { "schemas": schemas }
    }))
    .unwrap()
}

fn map(schemas: serde_json::Value, definition: &str) -> GenResult<NativeType> {
    let index: SchemaIndex = [types_module(), device_module(schemas)].into_iter().collect();
    let runtime = RuntimeNames::default();
    let device = index.get("Device").unwrap();
    let node = SchemaNode::new(SchemaKind::Ref(device.definition_ref(definition)));
    NativeMapper::new(&index, &runtime).map_type(device, &node, &TypeRequest::new(definition, "", "Device#/test"))
}

fn declaration<'a>(mapped: &'a NativeType, symbol: &str) -> &'a str {
    mapped.declarations.get(symbol).unwrap()
}

#[test]
fn map_type___object___handle_with_accessors() {
    let mapped = map(
        json!({ "Info": {
            "type": "object",
            "properties": { "a": { "type": "string" }, "b": { "type": "integer" } },
            "required": ["a", "b"]
        } }),
        "Info",
    )
    .unwrap();

    assert_eq!(mapped.name, "Device_InfoHandle");
    assert_eq!(mapped.kind, NativeKind::Handle);
    assert_eq!(mapped.wire, "FireboltSDK::Device::JsonData_Info");
    let functions: Vec<_> = declaration(&mapped, "Device_InfoHandle")
        .lines()
        .filter(|line| line.contains("Device_Info_"))
        .collect();
    assert_eq!(
        functions,
        vec![
            "FireboltTypes_StringHandle Device_Info_Get_A(Device_InfoHandle handle);",
            "void Device_Info_Set_A(Device_InfoHandle handle, FireboltTypes_StringHandle value);",
            "int32_t Device_Info_Get_B(Device_InfoHandle handle);",
            "void Device_Info_Set_B(Device_InfoHandle handle, int32_t value);",
        ]
    );
}

#[test]
fn map_type___property_missing_from_required___is_optional() {
    let mapped = map(
        json!({ "Info": {
            "type": "object",
            "properties": { "a": { "type": "string" }, "b": { "type": "boolean" } },
            "required": ["a"]
        } }),
        "Info",
    )
    .unwrap();

    let declarations = declaration(&mapped, "Device_InfoHandle");
    assert!(!declarations.contains("Device_Info_Has_A"));
    assert!(declarations.contains("bool Device_Info_Has_B(Device_InfoHandle handle);"));
}

#[test]
fn map_type___no_required_list___all_properties_required() {
    let mapped = map(
        json!({ "Info": { "type": "object", "properties": { "a": { "type": "string" } } } }),
        "Info",
    )
    .unwrap();

    assert!(!declaration(&mapped, "Device_InfoHandle").contains("_Has_"));
}

#[test]
fn map_type___const_property___read_only() {
    let mapped = map(
        json!({ "Info": { "type": "object", "properties": { "version": { "const": 2, "minimum": 0 } } } }),
        "Info",
    )
    .unwrap();

    let declarations = declaration(&mapped, "Device_InfoHandle");
    assert!(declarations.contains("uint32_t Device_Info_Get_Version(Device_InfoHandle handle);"));
    assert!(!declarations.contains("Device_Info_Set_Version"));
}

#[test]
fn map_type___nested_inline_object___named_under_parent() {
    let mapped = map(
        json!({ "Info": { "type": "object", "properties": {
            "hdcp": { "type": "object", "properties": { "version": { "type": "string" } } }
        } } }),
        "Info",
    )
    .unwrap();

    let symbols: Vec<_> = mapped.declarations.symbols().collect();
    assert_eq!(symbols, vec!["Device_Info_HdcpHandle", "Device_InfoHandle"]);
    assert!(
        declaration(&mapped, "Device_InfoHandle")
            .contains("Device_Info_HdcpHandle Device_Info_Get_Hdcp(Device_InfoHandle handle);")
    );
}

#[test]
fn map_type___inline_enum___emits_codec_under_parent_prefix() {
    let mapped = map(
        json!({ "Info": { "type": "object", "properties": {
            "source": { "type": "string", "enum": ["voice", "channel-lineup"] }
        } } }),
        "Info",
    )
    .unwrap();

    let codec = mapped.enums.get("Device_Info_Source").unwrap();
    assert!(codec.contains("DEVICE_INFO_SOURCE_CHANNEL_LINEUP"));
    assert!(mapped.conversions.contains("Device_Info_Source"));
    assert!(declaration(&mapped, "Device_InfoHandle").contains("Device_Info_Source Device_Info_Get_Source("));
}

#[test]
fn map_type___integer_signedness___follows_minimum() {
    let unsigned = map(json!({ "Count": { "type": "integer", "minimum": 0 } }), "Count").unwrap();
    let signed = map(json!({ "Offset": { "type": "integer" } }), "Offset").unwrap();
    let negative = map(json!({ "Delta": { "type": "integer", "minimum": -10 } }), "Delta").unwrap();

    assert_eq!(unsigned.name, "uint32_t");
    assert_eq!(unsigned.wire, "WPEFramework::Core::JSON::DecUInt32");
    assert_eq!(signed.name, "int32_t");
    assert_eq!(negative.name, "int32_t");
}

#[test]
fn map_type___scalars___by_value() {
    let text = map(json!({ "Name": { "type": "string" } }), "Name").unwrap();
    let ratio = map(json!({ "Ratio": { "type": "number" } }), "Ratio").unwrap();
    let flag = map(json!({ "Flag": { "type": "boolean" } }), "Flag").unwrap();
    let opaque = map(json!({ "Blob": { "type": "object" } }), "Blob").unwrap();

    assert_eq!(text.name, "FireboltTypes_StringHandle");
    assert_eq!(ratio.name, "float");
    assert_eq!(flag.name, "bool");
    assert_eq!(opaque.name, "FireboltTypes_StringHandle");
    assert_eq!(opaque.wire, "FireboltSDK::JSON::String");
    assert!(text.declarations.is_empty());
}

#[test]
fn map_type___two_refs_to_same_target___equal_descriptors() {
    let schemas = json!({
        "Info": { "type": "object", "properties": { "a": { "type": "string" } } },
        "First": { "$ref": "#/components/schemas/Info" },
        "Second": { "$ref": "#/components/schemas/Info" }
    });

    let first = map(schemas.clone(), "First").unwrap();
    let second = map(schemas, "Second").unwrap();

    assert_eq!(first, second);
    assert_eq!(first.name, "Device_InfoHandle");
}

#[test]
fn map_type___external_ref___name_only_with_module_recorded() {
    let mapped = map(
        json!({ "Screen": { "$ref": "https://example.com/schemas/Types#/definitions/Resolution" } }),
        "Screen",
    )
    .unwrap();

    assert_eq!(mapped.name, "Types_ResolutionHandle");
    assert_eq!(mapped.wire, "FireboltSDK::Types::JsonData_Resolution");
    assert!(mapped.declarations.is_empty());
    assert!(mapped.definitions.is_empty());
    assert!(mapped.external_modules.contains("Types"));
}

#[test]
fn map_type___unknown_module___error() {
    let err = map(
        json!({ "Screen": { "$ref": "https://example.com/schemas/Missing#/definitions/X" } }),
        "Screen",
    )
    .unwrap_err();

    assert!(matches!(err, GenError::UnknownModuleReference { .. }));
}

#[test]
fn map_type___self_referencing_object___cycle_error() {
    let err = map(
        json!({ "Node": { "type": "object", "properties": {
            "next": { "$ref": "#/components/schemas/Node" }
        } } }),
        "Node",
    )
    .unwrap_err();

    let GenError::CyclicSchemaReference { chain, .. } = err else {
        panic!("expected cycle, got {err:?}");
    };
    assert_eq!(chain.len(), 2);
}

#[test]
fn map_type___heterogeneous_tuple___rejected() {
    let err = map(
        json!({ "Pair": { "type": "array", "items": [{ "type": "string" }, { "type": "integer" }] } }),
        "Pair",
    )
    .unwrap_err();

    assert!(matches!(err, GenError::HeterogeneousArrayItems { .. }));
}

#[test]
fn map_type___homogeneous_tuple___uses_first_item() {
    let mapped = map(
        json!({ "Pair": { "type": "array", "items": [{ "type": "string" }, { "type": "string" }] } }),
        "Pair",
    )
    .unwrap();

    assert_eq!(mapped.name, "Device_PairArrayHandle");
    assert_eq!(mapped.wire, "WPEFramework::Core::JSON::ArrayType<FireboltSDK::JSON::String>");
}

#[test]
fn map_type___array_of_ref___named_after_element() {
    let mapped = map(
        json!({
            "Resolution": { "type": "object", "properties": { "w": { "type": "integer" } } },
            "Resolutions": { "type": "array", "items": { "$ref": "#/components/schemas/Resolution" } }
        }),
        "Resolutions",
    )
    .unwrap();

    assert_eq!(mapped.name, "Device_ResolutionArrayHandle");
    assert_eq!(mapped.kind, NativeKind::ArrayHandle);
    let declarations = declaration(&mapped, "Device_ResolutionArrayHandle");
    assert!(declarations.contains("uint32_t Device_ResolutionArray_Size(Device_ResolutionArrayHandle handle);"));
    assert!(declarations.contains(
        "Device_ResolutionHandle Device_ResolutionArray_Get(Device_ResolutionArrayHandle handle, uint32_t index);"
    ));
}

#[test]
fn map_type___inline_array_property___accessors_on_parent() {
    let mapped = map(
        json!({ "Info": { "type": "object", "properties": {
            "ports": { "type": "array", "items": { "type": "integer" } }
        } } }),
        "Info",
    )
    .unwrap();

    let declarations = declaration(&mapped, "Device_InfoHandle");
    assert!(declarations.contains("uint32_t Device_Info_PortsArray_Size(Device_InfoHandle handle);"));
    assert!(declarations.contains("int32_t Device_Info_PortsArray_Get(Device_InfoHandle handle, uint32_t index);"));
    assert!(!declarations.contains("Device_Info_Get_Ports"));
    assert!(
        mapped
            .definitions
            .get("Device_InfoHandle")
            .unwrap()
            .contains("FIREBOLT_BOUNDS_CHECK_FAILED(index, (*var)->Ports.Length());")
    );
}

#[test]
fn map_type___additional_properties___map_handle() {
    let mapped = map(
        json!({ "Labels": { "type": "object", "additionalProperties": { "type": "string" } } }),
        "Labels",
    )
    .unwrap();

    assert_eq!(mapped.name, "Device_LabelsHandle");
    assert_eq!(mapped.kind, NativeKind::MapHandle);
    assert_eq!(mapped.wire, "WPEFramework::Core::JSON::VariantContainer");
    assert!(declaration(&mapped, "Device_LabelsHandle").contains(
        "bool Device_Labels_FindKey(Device_LabelsHandle handle, const char* key, FireboltTypes_StringHandle* value);"
    ));
}

#[test]
fn map_type___pattern_properties_only___unsupported() {
    let err = map(
        json!({ "Dynamic": { "type": "object", "patternProperties": { "^x-": { "type": "string" } } } }),
        "Dynamic",
    )
    .unwrap_err();

    assert!(matches!(err, GenError::UnsupportedPatternProperties { .. }));
}

#[test]
fn map_type___union___unsupported() {
    let err = map(
        json!({ "Either": { "oneOf": [{ "type": "string" }, { "type": "integer" }] } }),
        "Either",
    )
    .unwrap_err();

    assert!(matches!(err, GenError::UnsupportedUnionSchema { .. }));
}

#[test]
fn map_type___undetermined_property___skipped_with_diagnostic() {
    let mapped = map(
        json!({ "Info": { "type": "object", "properties": { "a": { "type": "string" }, "any": {} } } }),
        "Info",
    )
    .unwrap();

    assert_eq!(mapped.diagnostics.len(), 1);
    assert!(mapped.diagnostics[0].path.ends_with("/properties/any"));
    assert!(!declaration(&mapped, "Device_InfoHandle").contains("_Any"));
}

#[test]
fn map_type___all_of___merged_into_one_object() {
    let mapped = map(
        json!({
            "Base": { "type": "object", "properties": { "id": { "type": "string" } } },
            "Extended": { "allOf": [
                { "$ref": "#/components/schemas/Base" },
                { "type": "object", "properties": { "count": { "type": "integer" } } }
            ] }
        }),
        "Extended",
    )
    .unwrap();

    assert_eq!(mapped.name, "Device_ExtendedHandle");
    let declarations = declaration(&mapped, "Device_ExtendedHandle");
    assert!(declarations.contains("Device_Extended_Get_Id("));
    assert!(declarations.contains("Device_Extended_Get_Count("));
}

#[test]
fn map_type___inline_schema_named_like_definition___suffixed() {
    let mapped = map(
        json!({
            "A": { "type": "object", "properties": { "b": { "type": "object", "properties": { "x": { "type": "string" } } } } },
            "A_B": { "type": "object", "properties": { "y": { "type": "number" } } },
            "Holder": { "type": "object", "properties": {
                "first": { "$ref": "#/components/schemas/A" },
                "second": { "$ref": "#/components/schemas/A_B" }
            } }
        }),
        "Holder",
    )
    .unwrap();

    assert!(
        declaration(&mapped, "Device_AHandle").contains("Device_A_B_2Handle Device_A_Get_B(Device_AHandle handle);")
    );
    assert!(declaration(&mapped, "Device_A_B_2Handle").contains("Device_A_B_2_Get_X("));
    assert!(declaration(&mapped, "Device_A_BHandle").contains("float Device_A_B_Get_Y(Device_A_BHandle handle);"));
    assert!(
        declaration(&mapped, "Device_HolderHandle")
            .contains("Device_A_BHandle Device_Holder_Get_Second(Device_HolderHandle handle);")
    );
}

#[test]
fn map_type___array_named_like_object_definition___array_suffixed() {
    let mapped = map(
        json!({
            "Ports": { "type": "array", "items": { "type": "integer" } },
            "PortsArray": { "type": "object", "properties": { "count": { "type": "integer" } } },
            "Holder": { "type": "object", "properties": {
                "first": { "$ref": "#/components/schemas/Ports" },
                "second": { "$ref": "#/components/schemas/PortsArray" }
            } }
        }),
        "Holder",
    )
    .unwrap();

    let holder = declaration(&mapped, "Device_HolderHandle");
    assert!(holder.contains("Device_Ports_2ArrayHandle Device_Holder_Get_First(Device_HolderHandle handle);"));
    assert!(holder.contains("Device_PortsArrayHandle Device_Holder_Get_Second(Device_HolderHandle handle);"));
    assert!(declaration(&mapped, "Device_Ports_2ArrayHandle").contains("uint32_t Device_Ports_2Array_Size("));
    assert!(declaration(&mapped, "Device_PortsArrayHandle").contains("Device_PortsArray_Get_Count("));
}

#[test]
fn map_type___same_schema_mapped_twice___keeps_its_name() {
    let index: SchemaIndex = [
        types_module(),
        device_module(json!({
            "Settings": { "type": "object", "properties": {
                "audio": { "type": "object", "properties": { "volume": { "type": "number" } } }
            } }
        })),
    ]
    .into_iter()
    .collect();
    let runtime = RuntimeNames::default();
    let device = index.get("Device").unwrap();
    let node = SchemaNode::new(SchemaKind::Ref(device.definition_ref("Settings")));
    let request = TypeRequest::new("Settings", "", "Device#/test");
    let mut mapper = NativeMapper::new(&index, &runtime);

    let first = mapper.map_type(device, &node, &request).unwrap();
    let second = mapper.map_type(device, &node, &request).unwrap();

    assert_eq!(first, second);
    assert!(first.declarations.get("Device_Settings_AudioHandle").is_some());
}

#[test]
fn map_type___titled_array_items___element_named_after_title() {
    let mapped = map(
        json!({ "Batch": { "type": "array", "items": {
            "title": "Entry",
            "type": "object",
            "properties": { "id": { "type": "string" } }
        } } }),
        "Batch",
    )
    .unwrap();

    assert_eq!(mapped.name, "Device_BatchArrayHandle");
    assert!(
        declaration(&mapped, "Device_BatchArrayHandle")
            .contains("Device_EntryHandle Device_BatchArray_Get(Device_BatchArrayHandle handle, uint32_t index);")
    );
    assert!(declaration(&mapped, "Device_EntryHandle").contains("Device_Entry_Get_Id("));
}

#[test]
fn TypeRequest___label___prefers_name_then_title() {
    let titled = SchemaNode::new(SchemaKind::Unconstrained).with_title("Titled");

    assert_eq!(TypeRequest::new("name", "", "#").label(&titled).unwrap(), "name");
    assert_eq!(TypeRequest::new("", "", "#").label(&titled).unwrap(), "Titled");
    assert!(
        TypeRequest::new("", "", "#")
            .label(&SchemaNode::new(SchemaKind::Unconstrained))
            .is_err()
    );
}

#[test]
fn homogeneous_item___empty_tuple___undetermined() {
    let err = homogeneous_item(&ArrayItems::Tuple(Vec::new()), "#/items").unwrap_err();

    assert!(err.is_recoverable());
}
