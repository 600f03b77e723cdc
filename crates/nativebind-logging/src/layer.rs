//! Subscriber setup and the diagnostic-counting layer

use crate::counter::DiagnosticCounter;
use nativebind_core::LogLevel;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Tracing layer that counts warning and error events
pub struct DiagnosticLayer {
    counter: &'static DiagnosticCounter,
}

impl DiagnosticLayer {
    /// Create a layer feeding the global counter
    pub fn new() -> Self {
        Self {
            counter: DiagnosticCounter::global(),
        }
    }

    /// Create a layer with a specific counter
    pub fn with_counter(counter: &'static DiagnosticCounter) -> Self {
        Self { counter }
    }
}

impl Default for DiagnosticLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for DiagnosticLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        match *event.metadata().level() {
            Level::WARN => self.counter.record_warning(),
            Level::ERROR => {
                let mut visitor = MessageVisitor::default();
                event.record(&mut visitor);
                self.counter.record_error(&visitor.message.unwrap_or_default());
            }
            _ => {}
        }
    }
}

/// Visitor to extract the message field from tracing events
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }
}

/// `RUST_LOG` when set and valid, otherwise `level`
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_directive()))
}

/// Install the global subscriber: filtered stderr output plus diagnostic counting.
///
/// Calling this more than once keeps the first subscriber.
pub fn init_logging(level: LogLevel) {
    use tracing_subscriber::prelude::*;

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt)
        .with(DiagnosticLayer::new());

    // Try to set as global default (ignore error if already set)
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
#[path = "layer/layer_tests.rs"]
mod layer_tests;
