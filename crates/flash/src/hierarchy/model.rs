//! Generalization hierarchy value type.

use serde::{Deserialize, Serialize};

use crate::relation::MISSING_MARKER;

/// The top-level value of every hierarchy.
pub const SUPPRESSION_SYMBOL: &str = "*";

/// A generalization hierarchy for one attribute.
///
/// Each row maps a raw value (position 0) through progressively coarser
/// generalizations to the suppression symbol (last position). All rows of a
/// well-formed hierarchy have the same width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    rows: Vec<Vec<String>>,
}

impl Hierarchy {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hierarchy from rows.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Append a generalization row.
    pub fn add(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Append a two-level row mapping `raw` directly to the suppression symbol.
    pub fn add_suppressed(&mut self, raw: impl Into<String>) {
        self.rows.push(vec![raw.into(), SUPPRESSION_SYMBOL.to_string()]);
    }

    /// Append the row generalizing the missing-value marker at `width` levels.
    pub fn add_missing(&mut self, width: usize) {
        self.rows.push(missing_row(width));
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of generalization levels (0 for an empty hierarchy).
    pub fn height(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Highest selectable level.
    pub fn max_level(&self) -> usize {
        self.height().saturating_sub(1)
    }

    /// Clamp a requested level to the levels this hierarchy has.
    pub fn clamp_level(&self, level: usize) -> usize {
        level.min(self.max_level())
    }

    /// Raw values in row order.
    pub fn raw_values(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(|row| row.first().map(String::as_str))
    }

    /// Check whether a raw value has a row.
    pub fn covers(&self, value: &str) -> bool {
        self.raw_values().any(|raw| raw == value)
    }

    /// Generalize a raw value.
    ///
    /// Levels above the hierarchy's height are clamped to the top level.
    /// Returns `None` when no row starts with `value`.
    pub fn generalize(&self, value: &str, level: usize) -> Option<&str> {
        let level = self.clamp_level(level);
        self.rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(value))
            .and_then(|row| row.get(level))
            .map(String::as_str)
    }
}

/// Row generalizing the missing marker: "?" at every level but the last, "*" at the top.
pub fn missing_row(width: usize) -> Vec<String> {
    let mut row = vec![MISSING_MARKER.to_string(); width];
    if let Some(top) = row.last_mut() {
        *top = SUPPRESSION_SYMBOL.to_string();
    }
    row
}
