#![allow(non_snake_case)]

use super::*;
use tracing_subscriber::prelude::*;

fn leaked_counter() -> &'static DiagnosticCounter {
    Box::leak(Box::new(DiagnosticCounter::new()))
}

#[test]
fn DiagnosticLayer___warn_and_error___counted() {
    let counter = leaked_counter();
    let subscriber = tracing_subscriber::registry().with(DiagnosticLayer::with_counter(counter));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("not counted");
        tracing::warn!(path = "Device#/methods/0", "skipping parameter");
        tracing::error!(code = 2, "generation failed: unresolved reference");
    });

    let counts = counter.snapshot();
    assert_eq!(counts.warnings, 1);
    assert_eq!(counts.errors, 1);
    assert_eq!(counts.last_error.as_deref(), Some("generation failed: unresolved reference"));
}

#[test]
fn DiagnosticLayer___below_warn___ignored() {
    let counter = leaked_counter();
    let subscriber = tracing_subscriber::registry().with(DiagnosticLayer::with_counter(counter));

    tracing::subscriber::with_default(subscriber, || {
        tracing::trace!("trace");
        tracing::debug!("debug");
        tracing::info!("info");
    });

    assert_eq!(counter.snapshot(), crate::DiagnosticCounts::default());
}

#[test]
fn DiagnosticLayer___filtered_out_events___not_counted() {
    let counter = leaked_counter();
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new("error"))
        .with(DiagnosticLayer::with_counter(counter));

    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!("filtered");
        tracing::error!("kept");
    });

    assert_eq!(counter.warnings(), 0);
    assert_eq!(counter.errors(), 1);
}

#[test]
fn MessageVisitor___no_message_field___none() {
    let counter = leaked_counter();
    let subscriber = tracing_subscriber::registry().with(DiagnosticLayer::with_counter(counter));

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!(code = 3);
    });

    assert_eq!(counter.errors(), 1);
    assert_eq!(counter.snapshot().last_error.as_deref(), Some(""));
}

#[test]
fn init_logging___called_twice___does_not_panic() {
    init_logging(LogLevel::Warn);
    init_logging(LogLevel::Debug);
}
