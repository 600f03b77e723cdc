//! Generation report

use crate::error::GenError;

/// A recoverable problem encountered while generating a module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Diagnostic for an error that was downgraded to a warning
    pub fn from_error(err: &GenError) -> Self {
        Self::new(err.path().unwrap_or("#"), err.to_string())
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Final state of one module
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleStatus {
    Generated,
    Failed(GenError),
    /// Rejected by the module filter
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOutcome {
    pub module: String,
    pub status: ModuleStatus,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of a whole run, in module input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    pub outcomes: Vec<ModuleOutcome>,
}

impl GenerationReport {
    pub fn push(&mut self, outcome: ModuleOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &GenError)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            ModuleStatus::Failed(err) => Some((o.module.as_str(), err)),
            _ => None,
        })
    }

    pub fn generated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ModuleStatus::Generated)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.diagnostics.len()).sum()
    }
}

#[cfg(test)]
#[path = "report/report_tests.rs"]
mod report_tests;
