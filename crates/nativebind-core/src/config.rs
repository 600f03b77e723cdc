//! Generator configuration
//!
//! Loaded from a TOML file. Every field has a default, so an empty file is a
//! valid configuration.
//!
//! ```toml
//! prune_unused_definitions = true
//! log_level = "info"
//!
//! [runtime]
//! sdk_namespace = "FireboltSDK"
//!
//! [modules]
//! exclude = ["Internal"]
//! ```

use crate::error::{GenError, GenResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Names of the native runtime the generated code is written against
    #[serde(default)]
    pub runtime: RuntimeNames,

    /// Which modules to generate
    #[serde(default)]
    pub modules: ModuleSelection,

    /// Skip schema-module definitions that no loaded document references
    #[serde(default = "default_prune_unused")]
    pub prune_unused_definitions: bool,

    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Comment block placed at the top of every generated file
    #[serde(default)]
    pub header_text: Option<String>,
}

/// Runtime-library symbols referenced by generated code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeNames {
    pub sdk_namespace: String,
    pub core_namespace: String,
    pub json_namespace: String,
    pub string_handle: String,
    pub types_header: String,
    pub runtime_header: String,
    pub enum_conversion_namespace: String,
    pub status_ok: String,
    pub status_unavailable: String,
    pub status_not_supported: String,
    pub bounds_check: String,
    pub log_info: String,
    pub log_error: String,
    /// Module whose functions `calls-metrics` methods report to
    pub metrics_module: String,
}

impl Default for RuntimeNames {
    fn default() -> Self {
        Self {
            sdk_namespace: "FireboltSDK".to_string(),
            core_namespace: "WPEFramework::Core".to_string(),
            json_namespace: "WPEFramework::Core::JSON".to_string(),
            string_handle: "FireboltTypes_StringHandle".to_string(),
            types_header: "Firebolt.h".to_string(),
            runtime_header: "FireboltSDK.h".to_string(),
            enum_conversion_namespace: "WPEFramework".to_string(),
            status_ok: "FireboltSDKErrorNone".to_string(),
            status_unavailable: "FireboltSDKErrorUnavailable".to_string(),
            status_not_supported: "FireboltSDKErrorNotSupported".to_string(),
            bounds_check: "FIREBOLT_BOUNDS_CHECK_FAILED".to_string(),
            log_info: "FIREBOLT_LOG_INFO".to_string(),
            log_error: "FIREBOLT_LOG_ERROR".to_string(),
            metrics_module: "Metrics".to_string(),
        }
    }
}

/// Include/exclude lists of module titles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSelection {
    /// When non-empty, only these modules are generated
    pub include: Vec<String>,
    /// Never generated, even when included
    pub exclude: Vec<String>,
}

impl ModuleSelection {
    pub fn allows(&self, module: &str) -> bool {
        if self.exclude.iter().any(|m| m == module) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|m| m == module)
    }
}

fn default_prune_unused() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeNames::default(),
            modules: ModuleSelection::default(),
            prune_unused_definitions: default_prune_unused(),
            log_level: default_log_level(),
            header_text: None,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> GenResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GenError::Config(format!("failed to read {:?}: {e}", path.as_ref())))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> GenResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reject configurations that would produce uncompilable output
    pub fn validate(&self) -> GenResult<()> {
        let runtime = &self.runtime;
        let identifiers = [
            ("runtime.sdk_namespace", &runtime.sdk_namespace),
            ("runtime.core_namespace", &runtime.core_namespace),
            ("runtime.json_namespace", &runtime.json_namespace),
            ("runtime.string_handle", &runtime.string_handle),
            ("runtime.enum_conversion_namespace", &runtime.enum_conversion_namespace),
            ("runtime.status_ok", &runtime.status_ok),
            ("runtime.status_unavailable", &runtime.status_unavailable),
            ("runtime.status_not_supported", &runtime.status_not_supported),
            ("runtime.bounds_check", &runtime.bounds_check),
            ("runtime.log_info", &runtime.log_info),
            ("runtime.log_error", &runtime.log_error),
            ("runtime.metrics_module", &runtime.metrics_module),
        ];

        for (key, value) in identifiers {
            if value.is_empty() {
                return Err(GenError::Config(format!("{key} cannot be empty")));
            }
            if !is_cpp_path(value) {
                return Err(GenError::Config(format!("{key} is not a valid identifier: {value}")));
            }
        }

        if runtime.types_header.is_empty() || runtime.runtime_header.is_empty() {
            return Err(GenError::Config("runtime header names cannot be empty".to_string()));
        }

        if let Some(module) = self.modules.include.iter().find(|m| self.modules.exclude.contains(*m)) {
            return Err(GenError::Config(format!(
                "module '{module}' is both included and excluded"
            )));
        }

        if self.log_level.parse::<crate::LogLevel>().is_err() {
            return Err(GenError::Config(format!("invalid log level: {}", self.log_level)));
        }

        Ok(())
    }
}

/// `Ident` or `Ns::Ident`, each segment a C identifier
fn is_cpp_path(value: &str) -> bool {
    value.split("::").all(|segment| {
        let mut chars = segment.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
