//! Anonymization engine trait and types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::adapter::EngineInput;
use crate::hierarchy::SUPPRESSION_SYMBOL;

use super::criteria::{Metric, PrivacyCriterion};

/// Opaque error raised by an engine.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Tuning knobs forwarded verbatim to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Value written into suppressed cells.
    pub suppression_string: String,
    /// Number of transformations kept in the engine's history.
    pub history_size: usize,
    /// Maximum snapshot size relative to the dataset.
    pub snapshot_size_dataset: f64,
    /// Maximum snapshot size relative to the parent snapshot.
    pub snapshot_size_snapshot: f64,
    /// Whether outlier rows are suppressed in the output.
    pub remove_outliers: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            suppression_string: SUPPRESSION_SYMBOL.to_string(),
            history_size: 200,
            snapshot_size_dataset: 0.2,
            snapshot_size_snapshot: 0.2,
            remove_outliers: true,
        }
    }
}

/// Everything the engine needs besides the input table.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub criteria: Vec<PrivacyCriterion>,
    pub metric: Metric,
    /// Maximum fraction of rows that may be suppressed.
    pub max_outliers: f64,
    pub settings: EngineSettings,
}

/// The engine's transformed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Values of the named column, one per row.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(move |row| row.get(index).map(String::as_str).unwrap_or("")),
        )
    }
}

/// Result of one engine run.
#[derive(Debug, Clone)]
pub struct AnonymizationResult {
    pub output: OutputTable,
    /// Selected generalization level per quasi-identifier.
    pub generalization: IndexMap<String, usize>,
    /// Indices of rows suppressed as outliers.
    pub suppressed_rows: Vec<usize>,
}

impl AnonymizationResult {
    /// Selected level for an attribute (0 when the engine reported none).
    pub fn level(&self, attribute: &str) -> usize {
        self.generalization.get(attribute).copied().unwrap_or(0)
    }
}

/// An anonymization engine.
///
/// Implementations search for a transformation of `input` that satisfies
/// every criterion in `config` and report the result. Errors are passed
/// through to the caller untouched.
pub trait AnonymizationEngine: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Anonymize the input table.
    fn anonymize(
        &self,
        input: &EngineInput,
        config: &EngineConfig,
    ) -> std::result::Result<AnonymizationResult, EngineError>;
}
