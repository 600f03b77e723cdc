//! Naming convention utilities for code generation.
//!
//! Every generated symbol is a module name joined to a stem built from
//! `(prefix, schema name)` by the functions here. Which stem a schema
//! finally gets is decided by [`crate::symbols::SymbolTable`].
//!
//! # Supported Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `word` | [`capitalize`] | `Word` |
//! | `(device, Info)` | [`qualified_name`] | `Device_Info` |
//! | `("Info", "details")` | [`child_prefix`] | `Info_Details` |
//! | `("channel-lineup", "Source")` | [`enum_case_name`] | `SOURCE_CHANNEL_LINEUP` |
//! | `("Device", "name")` | [`rpc_method_name`] | `device.name` |

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use nativebind_codegen::naming::capitalize;
///
/// assert_eq!(capitalize("hello"), "Hello");
/// assert_eq!(capitalize("helloWorld"), "HelloWorld");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Generated type name: the capitalized module joined to a type stem.
///
/// Stems come from [`child_prefix`], so nesting shows up as `Prefix_Name`.
///
/// # Examples
///
/// ```
/// use nativebind_codegen::naming::qualified_name;
///
/// assert_eq!(qualified_name("device", "Info"), "Device_Info");
/// assert_eq!(qualified_name("Device", "Info_Hdcp"), "Device_Info_Hdcp");
/// ```
pub fn qualified_name(module: &str, stem: &str) -> String {
    format!("{}_{}", capitalize(module), stem)
}

/// Prefix for schemas nested inline under `name`.
pub fn child_prefix(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        capitalize(name)
    } else {
        format!("{}_{}", capitalize(prefix), capitalize(name))
    }
}

/// Enum case identifier for a wire value.
///
/// `.`, `-` and `:` become `_`, `+` becomes `_plus`, camelCase boundaries
/// (lowercase followed by uppercase or digit) get an `_`, and the result is
/// uppercased and prefixed with the owning type name.
///
/// # Examples
///
/// ```
/// use nativebind_codegen::naming::enum_case_name;
///
/// assert_eq!(enum_case_name("channel-lineup", "Source"), "SOURCE_CHANNEL_LINEUP");
/// assert_eq!(enum_case_name("hdr10plus", "Hdr"), "HDR_HDR_10PLUS");
/// assert_eq!(enum_case_name("dolbyAtmos+", "Audio"), "AUDIO_DOLBY_ATMOS_PLUS");
/// ```
pub fn enum_case_name(value: &str, type_name: &str) -> String {
    let replaced = value.replace(['.', '-', ':'], "_").replace('+', "_plus");

    let mut key = String::with_capacity(replaced.len() + 4);
    let mut previous: Option<char> = None;
    for c in replaced.chars() {
        if previous.is_some_and(|p| p.is_ascii_lowercase()) && (c.is_ascii_uppercase() || c.is_ascii_digit()) {
            key.push('_');
        }
        key.push(c);
        previous = Some(c);
    }

    format!("{}_{}", type_name.to_uppercase(), key.to_uppercase())
}

/// Wire method or event name: lowercase module, `.`, method name as declared.
pub fn rpc_method_name(module: &str, method: &str) -> String {
    format!("{}.{}", module.to_lowercase(), method)
}

/// Header include-guard macro: `_MODULE_H` or `_PREFIX_MODULE_H`.
pub fn include_guard(module: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => format!("_{}_{}_H", prefix.to_uppercase(), module.to_uppercase()),
        None => format!("_{}_H", module.to_uppercase()),
    }
}
