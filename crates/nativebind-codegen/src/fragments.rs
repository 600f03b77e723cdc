//! Ordered, deduplicating code-fragment sets
//!
//! Every mapper returns its own fragments and callers merge them explicitly.
//! Insertion order is the order fragments are emitted in, so a child type is
//! always inserted before the parent that refers to it.

use indexmap::IndexMap;
use nativebind_core::{GenError, GenResult};

/// Insertion-ordered map of generated symbol to the code that defines it.
///
/// Re-inserting a symbol with identical code is a no-op. Re-inserting it
/// with different code means two distinct schemas were given the same
/// generated name, which is reported as [`GenError::TypeNameCollision`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragments {
    entries: IndexMap<String, String>,
}

impl Fragments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `code` under `symbol`. `path` is only used for error reporting.
    pub fn insert(&mut self, symbol: impl Into<String>, code: impl Into<String>, path: &str) -> GenResult<()> {
        let symbol = symbol.into();
        let code = code.into();
        match self.entries.get(&symbol) {
            Some(existing) if *existing == code => Ok(()),
            Some(_) => Err(GenError::TypeNameCollision {
                name: symbol,
                path: path.to_string(),
            }),
            None => {
                self.entries.insert(symbol, code);
                Ok(())
            }
        }
    }

    /// Append every entry of `other` not already present, keeping its order
    pub fn merge(&mut self, other: &Fragments, path: &str) -> GenResult<()> {
        for (symbol, code) in &other.entries {
            self.insert(symbol.as_str(), code.as_str(), path)?;
        }
        Ok(())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.entries.get(symbol).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, c)| (s.as_str(), c.as_str()))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All fragments in insertion order, separated by `separator`
    pub fn render(&self, separator: &str) -> String {
        self.entries.values().map(String::as_str).collect::<Vec<_>>().join(separator)
    }
}
