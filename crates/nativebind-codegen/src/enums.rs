//! Enum codec emission
//!
//! A string schema with `enum` becomes a C enum typedef plus a conversion
//! table mapping every case back to its wire string. Both follow the
//! declared value order.

use crate::naming::enum_case_name;

/// Emitted enum typedef and its conversion table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCodec {
    pub type_name: String,
    /// `(case identifier, wire string)` in declared order
    pub cases: Vec<(String, String)>,
    /// Header typedef
    pub declaration: String,
    /// `ENUM_CONVERSION_BEGIN` table for the implementation file
    pub conversion: String,
}

/// Build the codec for `type_name`.
///
/// `label` and `description` only feed the leading comment.
pub fn emit_enum(type_name: &str, label: &str, description: Option<&str>, values: &[String]) -> EnumCodec {
    let cases: Vec<(String, String)> = values
        .iter()
        .map(|value| (enum_case_name(value, type_name), value.clone()))
        .collect();

    let mut declaration = comment(label, description);
    declaration.push_str("\ntypedef enum {\n");
    declaration.push_str(
        &cases
            .iter()
            .map(|(case, _)| format!("    {case}"))
            .collect::<Vec<_>>()
            .join(",\n"),
    );
    declaration.push_str(&format!("\n}} {type_name};\n"));

    let mut conversion = format!("ENUM_CONVERSION_BEGIN({type_name})\n");
    for (case, value) in &cases {
        conversion.push_str(&format!("    {{ {case}, _T(\"{}\") }},\n", escape_c_string(value)));
    }
    conversion.push_str(&format!("ENUM_CONVERSION_END({type_name})\n"));

    EnumCodec {
        type_name: type_name.to_string(),
        cases,
        declaration,
        conversion,
    }
}

/// `/* Title - description */`
pub fn comment(title: &str, description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => format!("/* {title} - {} */", sanitize_comment(description)),
        None => format!("/* {title} */"),
    }
}

/// Comments are single-line and must not terminate early
fn sanitize_comment(text: &str) -> String {
    text.replace("*/", "* /").replace(['\n', '\r'], " ")
}

fn escape_c_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
#[path = "enums/enums_tests.rs"]
mod enums_tests;
