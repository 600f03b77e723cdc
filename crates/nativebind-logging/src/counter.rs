//! Warning and error counts for a run

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Global counter fed by the installed [`DiagnosticLayer`](crate::DiagnosticLayer)
static COUNTER: OnceCell<DiagnosticCounter> = OnceCell::new();

/// Point-in-time copy of a [`DiagnosticCounter`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticCounts {
    pub warnings: usize,
    pub errors: usize,
    pub last_error: Option<String>,
}

/// Counts warning and error events
pub struct DiagnosticCounter {
    warnings: AtomicUsize,
    errors: AtomicUsize,
    last_error: RwLock<Option<String>>,
}

impl DiagnosticCounter {
    pub fn new() -> Self {
        Self {
            warnings: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            last_error: RwLock::new(None),
        }
    }

    /// Get the global counter instance
    pub fn global() -> &'static DiagnosticCounter {
        COUNTER.get_or_init(DiagnosticCounter::new)
    }

    pub fn record_warning(&self) {
        self.warnings.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_error(&self, message: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        *self.last_error.write() = Some(message.to_string());
    }

    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> DiagnosticCounts {
        DiagnosticCounts {
            warnings: self.warnings(),
            errors: self.errors(),
            last_error: self.last_error.read().clone(),
        }
    }

    /// Zero the counts, e.g. between runs in one process
    pub fn reset(&self) {
        self.warnings.store(0, Ordering::SeqCst);
        self.errors.store(0, Ordering::SeqCst);
        *self.last_error.write() = None;
    }
}

impl Default for DiagnosticCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "counter/counter_tests.rs"]
mod counter_tests;
