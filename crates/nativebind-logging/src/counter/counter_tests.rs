#![allow(non_snake_case)]

use super::*;

#[test]
fn DiagnosticCounter___new___starts_at_zero() {
    let counter = DiagnosticCounter::new();

    assert_eq!(counter.snapshot(), DiagnosticCounts::default());
}

#[test]
fn DiagnosticCounter___record___counts_and_keeps_last_error() {
    let counter = DiagnosticCounter::new();

    counter.record_warning();
    counter.record_warning();
    counter.record_error("first");
    counter.record_error("second");

    let counts = counter.snapshot();
    assert_eq!(counts.warnings, 2);
    assert_eq!(counts.errors, 2);
    assert_eq!(counts.last_error.as_deref(), Some("second"));
}

#[test]
fn DiagnosticCounter___reset___clears_everything() {
    let counter = DiagnosticCounter::new();
    counter.record_warning();
    counter.record_error("failed");

    counter.reset();

    assert_eq!(counter.snapshot(), DiagnosticCounts::default());
}

#[test]
fn DiagnosticCounter___global___returns_same_instance() {
    let first = DiagnosticCounter::global() as *const DiagnosticCounter;
    let second = DiagnosticCounter::global() as *const DiagnosticCounter;

    assert_eq!(first, second);
}
