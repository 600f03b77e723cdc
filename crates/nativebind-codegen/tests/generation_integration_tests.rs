//! End-to-end generation over a small API surface
//!
//! A shared schema module plus an OpenRPC module exercising properties,
//! events, plain methods, enums and cross-module references.

#![allow(non_snake_case)]

use nativebind_codegen::{AllModules, ModuleArtifacts, generate};
use nativebind_core::{GeneratorConfig, Module, ModuleStatus, SchemaIndex};
use serde_json::json;

const TYPES: &str = "https://example.com/schemas/Types";

fn index() -> SchemaIndex {
    let types = Module::from_value(json!({
        "$id": TYPES,
        "title": "Types",
        "definitions": {
            "Resolution": {
                "type": "array",
                "items": [{ "type": "integer", "minimum": 0 }, { "type": "integer", "minimum": 0 }]
            },
            "AudioProfile": { "type": "string", "enum": ["stereo", "dolbyAtmos"] }
        }
    }))
    .unwrap();

    let discovery = Module::from_value(json!({
        "openrpc": "1.2.4",
        "info": { "title": "Discovery" },
        "methods": [
            {
                "name": "launch",
                "summary": "Launch an app",
                "params": [
                    { "name": "appId", "required": true, "schema": { "type": "string" } },
                    { "name": "source", "schema": { "$ref": "#/components/schemas/Source" } }
                ],
                "result": { "name": "success", "schema": { "type": "boolean" } }
            },
            {
                "name": "policy",
                "tags": [{ "name": "property" }],
                "params": [],
                "result": { "name": "policy", "schema": { "$ref": "#/components/schemas/Policy" } }
            },
            {
                "name": "onNavigateTo",
                "tags": [{ "name": "event" }],
                "params": [],
                "result": { "name": "value", "schema": { "$ref": "#/components/schemas/Policy" } }
            },
            {
                "name": "audio",
                "tags": [{ "name": "property:readonly" }],
                "params": [],
                "result": { "name": "profile", "schema": { "$ref": format!("{TYPES}#/definitions/AudioProfile") } }
            }
        ],
        "components": {
            "schemas": {
                "Source": { "type": "string", "enum": ["voice", "channel-lineup"] },
                "Policy": {
                    "type": "object",
                    "required": ["enableRecommendations"],
                    "properties": {
                        "enableRecommendations": { "type": "boolean" },
                        "shareWatchHistory": { "type": "boolean" },
                        "resolutions": { "type": "array", "items": { "$ref": format!("{TYPES}#/definitions/Resolution") } }
                    }
                }
            }
        }
    }))
    .unwrap();

    [types, discovery].into_iter().collect()
}

/// Every definition emitted, whether or not another document uses it
fn unpruned() -> GeneratorConfig {
    GeneratorConfig {
        prune_unused_definitions: false,
        ..GeneratorConfig::default()
    }
}

fn module<'a>(modules: &'a [ModuleArtifacts], name: &str) -> &'a ModuleArtifacts {
    modules.iter().find(|m| m.module == name).unwrap()
}

#[test]
fn generate___api_surface___every_module_generated() {
    let output = generate(&index(), &AllModules, &GeneratorConfig::default());

    assert!(
        output
            .report
            .outcomes
            .iter()
            .all(|o| o.status == ModuleStatus::Generated),
        "{:?}",
        output.report
    );
    assert_eq!(output.report.warning_count(), 0);
}

#[test]
fn generate___enum___typedef_and_conversion_table() {
    let output = generate(&index(), &AllModules, &GeneratorConfig::default());
    let discovery = module(&output.modules, "Discovery");

    assert!(discovery.native_header.contents.contains(
        "typedef enum {\n    DISCOVERY_SOURCE_VOICE,\n    DISCOVERY_SOURCE_CHANNEL_LINEUP\n} Discovery_Source;\n"
    ));
    let source = &discovery.implementation.contents;
    assert!(source.contains("ENUM_CONVERSION_BEGIN(Discovery_Source)\n"));
    assert!(source.contains("    { DISCOVERY_SOURCE_VOICE, _T(\"voice\") },\n"));
    assert!(source.contains("    { DISCOVERY_SOURCE_CHANNEL_LINEUP, _T(\"channel-lineup\") },\n"));
}

#[test]
fn generate___object_definition___accessors_and_container() {
    let output = generate(&index(), &AllModules, &GeneratorConfig::default());
    let discovery = module(&output.modules, "Discovery");
    let header = &discovery.native_header.contents;

    assert!(header.contains("bool Discovery_Policy_Get_EnableRecommendations(Discovery_PolicyHandle handle);"));
    assert!(!header.contains("Discovery_Policy_Has_EnableRecommendations"));
    assert!(header.contains("bool Discovery_Policy_Has_ShareWatchHistory(Discovery_PolicyHandle handle);"));
    assert!(header.contains(
        "Types_ResolutionArrayHandle Discovery_Policy_ResolutionsArray_Get(Discovery_PolicyHandle handle, uint32_t index);"
    ));

    let wire = &discovery.wire_header.as_ref().unwrap().contents;
    assert!(wire.contains("class JsonData_Policy : public WPEFramework::Core::JSON::Container {"));
    assert!(wire.contains(
        "        WPEFramework::Core::JSON::ArrayType<WPEFramework::Core::JSON::ArrayType<WPEFramework::Core::JSON::DecUInt32>> Resolutions;\n"
    ));
}

#[test]
fn generate___methods___prototypes_after_types() {
    let output = generate(&index(), &AllModules, &GeneratorConfig::default());
    let header = &module(&output.modules, "Discovery").native_header.contents;

    let types = header.find("typedef void* Discovery_PolicyHandle;").unwrap();
    let launch = header
        .find("uint32_t Discovery_Launch(FireboltTypes_StringHandle appId, Discovery_Source* source);")
        .unwrap();
    assert!(types < launch);
    assert!(header.contains("uint32_t Discovery_GetPolicy(Discovery_PolicyHandle* policy);"));
    assert!(header.contains("uint32_t Discovery_SetPolicy(Discovery_PolicyHandle value);"));
    assert!(header.contains(
        "typedef void (*DiscoveryOnNavigateToCallback)(const void* userData, Discovery_PolicyHandle value);"
    ));
    assert!(header.contains("uint32_t Discovery_GetAudio(Types_AudioProfile* profile);"));
}

#[test]
fn generate___shared_schema___common_header_and_tuple_array() {
    let output = generate(&index(), &AllModules, &unpruned());
    let types = module(&output.modules, "Types");

    assert_eq!(types.native_header.path, std::path::PathBuf::from("include/Common/Types.h"));
    let header = &types.native_header.contents;
    assert!(header.contains("typedef void* Types_ResolutionArrayHandle;"));
    assert!(header.contains("uint32_t Types_ResolutionArray_Get(Types_ResolutionArrayHandle handle, uint32_t index);"));
    assert!(header.contains("TYPES_AUDIOPROFILE_DOLBY_ATMOS"));
}
