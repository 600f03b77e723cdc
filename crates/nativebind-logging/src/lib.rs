//! nativebind-logging - Tracing setup for the generator
//!
//! This crate provides:
//! - [`init_logging`] to install a stderr subscriber filtered by level or `RUST_LOG`
//! - [`DiagnosticLayer`] tracing layer that counts warnings and errors
//! - [`DiagnosticCounter`] holding those counts for the end-of-run summary

mod counter;
mod layer;

pub use counter::{DiagnosticCounter, DiagnosticCounts};
pub use layer::{DiagnosticLayer, env_filter, init_logging};
pub use nativebind_core::LogLevel;
