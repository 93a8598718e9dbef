//! Engine that applies preset generalization levels.

use std::collections::HashMap;

use indexmap::IndexMap;
use thiserror::Error;

use crate::adapter::EngineInput;

use super::criteria::PrivacyCriterion;
use super::provider::{
    AnonymizationEngine, AnonymizationResult, EngineConfig, EngineError, OutputTable,
};

/// Tolerance for floating-point criterion comparisons.
const EPSILON: f64 = 1e-9;

/// Errors raised by [`FixedLevelEngine`].
#[derive(Debug, Error)]
pub enum FixedEngineError {
    #[error("Value \"{value}\" of attribute \"{attribute}\" has no hierarchy row")]
    Uncovered { attribute: String, value: String },

    #[error("Criterion refers to unknown attribute \"{0}\"")]
    UnknownAttribute(String),

    #[error(
        "{failing_rows} rows violate the privacy criteria but at most {budget} may be suppressed"
    )]
    CriteriaNotSatisfied { failing_rows: usize, budget: usize },
}

/// Generalizes every quasi-identifier at a caller-chosen level.
///
/// There is no search: each attribute is generalized at its preset level
/// (clamped to its hierarchy's height), the configured criteria are checked
/// per equivalence class, and failing classes are suppressed while they fit
/// in the outlier budget. If they do not fit the run fails.
#[derive(Debug, Clone, Default)]
pub struct FixedLevelEngine {
    levels: IndexMap<String, usize>,
    default_level: usize,
}

impl FixedLevelEngine {
    /// Create an engine that leaves every attribute at level 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level for one attribute.
    pub fn with_level(mut self, attribute: impl Into<String>, level: usize) -> Self {
        self.levels.insert(attribute.into(), level);
        self
    }

    /// Set the level for attributes without an explicit level.
    pub fn with_default_level(mut self, level: usize) -> Self {
        self.default_level = level;
        self
    }

    /// Level requested for an attribute, before clamping.
    pub fn requested_level(&self, attribute: &str) -> usize {
        self.levels
            .get(attribute)
            .copied()
            .unwrap_or(self.default_level)
    }
}

impl AnonymizationEngine for FixedLevelEngine {
    fn name(&self) -> &str {
        "fixed-level"
    }

    fn anonymize(
        &self,
        input: &EngineInput,
        config: &EngineConfig,
    ) -> Result<AnonymizationResult, EngineError> {
        let mut rows = input.rows.clone();
        let mut generalization = IndexMap::new();
        let mut qi_columns = Vec::new();

        for (name, hierarchy) in input.quasi_identifiers() {
            let col = input
                .column_index(name)
                .ok_or_else(|| FixedEngineError::UnknownAttribute(name.to_string()))?;
            let level = hierarchy.clamp_level(self.requested_level(name));

            for row in rows.iter_mut() {
                let generalized = hierarchy.generalize(&row[col], level).ok_or_else(|| {
                    FixedEngineError::Uncovered {
                        attribute: name.to_string(),
                        value: row[col].clone(),
                    }
                })?;
                row[col] = generalized.to_string();
            }

            generalization.insert(name.to_string(), level);
            qi_columns.push(col);
        }

        let checks = config
            .criteria
            .iter()
            .map(|c| Check::new(c, input, &rows))
            .collect::<Result<Vec<_>, _>>()?;

        let mut failing = Vec::new();
        {
            let mut classes: IndexMap<Vec<&str>, Vec<usize>> = IndexMap::new();
            for (idx, row) in rows.iter().enumerate() {
                let key = qi_columns.iter().map(|&c| row[c].as_str()).collect();
                classes.entry(key).or_default().push(idx);
            }

            for members in classes.values() {
                if !checks.iter().all(|check| check.holds(members, &rows)) {
                    failing.extend_from_slice(members);
                }
            }
        }

        let budget = if config.settings.remove_outliers {
            (config.max_outliers * rows.len() as f64).floor() as usize
        } else {
            0
        };
        if failing.len() > budget {
            return Err(FixedEngineError::CriteriaNotSatisfied {
                failing_rows: failing.len(),
                budget,
            }
            .into());
        }

        failing.sort_unstable();
        for &idx in &failing {
            for &col in &qi_columns {
                rows[idx][col] = config.settings.suppression_string.clone();
            }
        }

        Ok(AnonymizationResult {
            output: OutputTable {
                header: input.header.clone(),
                rows,
            },
            generalization,
            suppressed_rows: failing,
        })
    }
}

/// A criterion resolved against the table's columns.
enum Check {
    K(usize),
    DistinctL { col: usize, l: usize },
    EntropyL { col: usize, l: f64 },
    TCloseness { col: usize, t: f64, global: HashMap<String, f64> },
}

impl Check {
    fn new(
        criterion: &PrivacyCriterion,
        input: &EngineInput,
        rows: &[Vec<String>],
    ) -> Result<Self, FixedEngineError> {
        let column = |attribute: &str| {
            input
                .column_index(attribute)
                .ok_or_else(|| FixedEngineError::UnknownAttribute(attribute.to_string()))
        };

        Ok(match criterion {
            PrivacyCriterion::KAnonymity { k } => Check::K(*k as usize),
            PrivacyCriterion::DistinctLDiversity { attribute, l } => Check::DistinctL {
                col: column(attribute)?,
                l: *l as usize,
            },
            PrivacyCriterion::EntropyLDiversity { attribute, l } => Check::EntropyL {
                col: column(attribute)?,
                l: *l as f64,
            },
            PrivacyCriterion::EqualDistanceTCloseness { attribute, t } => {
                let col = column(attribute)?;
                let all: Vec<usize> = (0..rows.len()).collect();
                let global = frequencies(&all, rows, col)
                    .into_iter()
                    .map(|(value, count)| (value.to_string(), count as f64 / rows.len() as f64))
                    .collect();
                Check::TCloseness { col, t: *t, global }
            }
        })
    }

    fn holds(&self, members: &[usize], rows: &[Vec<String>]) -> bool {
        match self {
            Check::K(k) => members.len() >= *k,
            Check::DistinctL { col, l } => frequencies(members, rows, *col).len() >= *l,
            Check::EntropyL { col, l } => {
                let n = members.len() as f64;
                let entropy: f64 = frequencies(members, rows, *col)
                    .values()
                    .map(|&count| {
                        let p = count as f64 / n;
                        -p * p.ln()
                    })
                    .sum();
                entropy + EPSILON >= l.ln()
            }
            Check::TCloseness { col, t, global } => {
                let n = members.len() as f64;
                let local = frequencies(members, rows, *col);
                let distance: f64 = global
                    .iter()
                    .map(|(value, q)| {
                        let p = local.get(value.as_str()).copied().unwrap_or(0) as f64 / n;
                        (p - q).abs()
                    })
                    .sum::<f64>()
                    / 2.0;
                distance <= t + EPSILON
            }
        }
    }
}

fn frequencies<'r>(members: &[usize], rows: &'r [Vec<String>], col: usize) -> HashMap<&'r str, usize> {
    let mut counts = HashMap::new();
    for &idx in members {
        *counts.entry(rows[idx][col].as_str()).or_insert(0) += 1;
    }
    counts
}
