//! nativebind-core - Schema model, configuration, and errors
//!
//! This crate provides the foundational types shared by the generator:
//! - [`SchemaNode`] / [`Module`] / [`SchemaIndex`] for parsed schema documents
//! - [`GenError`] for error handling
//! - [`GeneratorConfig`] for runtime names and module selection
//! - [`GenerationReport`] for per-module outcomes and diagnostics

mod config;
mod error;
mod report;
pub mod schema;

pub use config::{GeneratorConfig, ModuleSelection, RuntimeNames};
pub use error::{GenError, GenResult};
pub use report::{Diagnostic, GenerationReport, ModuleOutcome, ModuleStatus};
pub use schema::{
    ArrayItems, Method, MethodResult, Module, ModuleKind, ObjectSchema, Param, PrimitiveKind,
    SchemaIndex, SchemaKind, SchemaNode,
};

/// Log levels for generator output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}
