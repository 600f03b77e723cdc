#![allow(non_snake_case)]

use super::*;

fn values(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn emit_enum___source___cases_and_table() {
    let codec = emit_enum("Source", "Source", None, &values(&["voice", "channel-lineup"]));

    assert_eq!(
        codec.cases,
        vec![
            ("SOURCE_VOICE".to_string(), "voice".to_string()),
            ("SOURCE_CHANNEL_LINEUP".to_string(), "channel-lineup".to_string()),
        ]
    );
    assert_eq!(
        codec.declaration,
        "/* Source */\ntypedef enum {\n    SOURCE_VOICE,\n    SOURCE_CHANNEL_LINEUP\n} Source;\n"
    );
    assert_eq!(
        codec.conversion,
        "ENUM_CONVERSION_BEGIN(Source)\n    { SOURCE_VOICE, _T(\"voice\") },\n    { SOURCE_CHANNEL_LINEUP, _T(\"channel-lineup\") },\nENUM_CONVERSION_END(Source)\n"
    );
}

#[test]
fn emit_enum___preserves_declared_order() {
    let codec = emit_enum("Discovery_Order", "Order", None, &values(&["zeta", "alpha", "mid"]));

    let wire: Vec<_> = codec.cases.iter().map(|(_, w)| w.as_str()).collect();
    assert_eq!(wire, vec!["zeta", "alpha", "mid"]);
    let zeta = codec.conversion.find("zeta").unwrap();
    let alpha = codec.conversion.find("alpha").unwrap();
    assert!(zeta < alpha);
}

#[test]
fn emit_enum___prefixes_cases_with_full_type_name() {
    let codec = emit_enum("Device_AudioProfile", "AudioProfile", None, &values(&["dolbyAtmos"]));

    assert_eq!(codec.cases[0].0, "DEVICE_AUDIOPROFILE_DOLBY_ATMOS");
    assert!(codec.declaration.ends_with("} Device_AudioProfile;\n"));
}

#[test]
fn emit_enum___description___in_leading_comment() {
    let codec = emit_enum("T", "Kind", Some("The kind of thing"), &values(&["a"]));

    assert!(codec.declaration.starts_with("/* Kind - The kind of thing */\n"));
}

#[test]
fn emit_enum___is_deterministic() {
    let first = emit_enum("X", "X", Some("d"), &values(&["a", "b-c", "d:e"]));
    let second = emit_enum("X", "X", Some("d"), &values(&["a", "b-c", "d:e"]));

    assert_eq!(first, second);
}

#[test]
fn comment___multiline_description___is_flattened() {
    assert_eq!(comment("Name", Some("first\nsecond */ x")), "/* Name - first second * / x */");
    assert_eq!(comment("Name", Some("   ")), "/* Name */");
}
