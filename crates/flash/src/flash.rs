//! The Flash filter and its public entry point.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::adapter::adapt;
use crate::config::FlashConfig;
use crate::engine::{AnonymizationEngine, Metric};
use crate::error::{FlashError, Result};
use crate::hierarchy::{HierarchyLoader, HierarchySource};
use crate::reconcile::reconcile;
use crate::relation::Relation;
use crate::schema::{RolePartition, classify};

/// Summary of one hierarchy handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchySummary {
    pub source: HierarchySource,
    /// Number of generalization levels above the raw values.
    pub levels: usize,
    /// Number of rows, including the missing-value row.
    pub entries: usize,
}

/// What happened during one run of the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationReport {
    pub relation: String,
    pub rows: usize,
    pub engine: String,
    /// Criteria passed to the engine, in display form.
    pub criteria: Vec<String>,
    pub metric: Metric,
    pub partition: RolePartition,
    pub hierarchies: IndexMap<String, HierarchySummary>,
    /// Selected generalization level per quasi-identifier.
    pub levels: IndexMap<String, usize>,
    /// Attributes whose values were replaced.
    pub rewritten: Vec<String>,
    pub suppressed_rows: usize,
    pub elapsed_ms: u64,
    pub created_at: DateTime<Utc>,
    /// True when the relation was too small to anonymize and passed through.
    pub skipped: bool,
}

impl AnonymizationReport {
    fn new(relation: &Relation, engine: &str, metric: Metric) -> Self {
        Self {
            relation: relation.name.clone(),
            rows: relation.row_count(),
            engine: engine.to_string(),
            criteria: Vec::new(),
            metric,
            partition: RolePartition::default(),
            hierarchies: IndexMap::new(),
            levels: IndexMap::new(),
            rewritten: Vec::new(),
            suppressed_rows: 0,
            elapsed_ms: 0,
            created_at: Utc::now(),
            skipped: false,
        }
    }
}

/// The anonymized relation and the report describing it.
#[derive(Debug, Clone)]
pub struct FlashOutcome {
    pub relation: Relation,
    pub report: AnonymizationReport,
}

/// The Flash anonymization filter.
///
/// Wraps an [`AnonymizationEngine`]: classifies attributes, loads their
/// hierarchies, runs the engine, and writes the generalized values back.
pub struct Flash {
    config: FlashConfig,
    engine: Arc<dyn AnonymizationEngine>,
}

impl Flash {
    /// Create a filter with the default configuration.
    pub fn new(engine: impl AnonymizationEngine + 'static) -> Self {
        Self::with_shared_engine(Arc::new(engine))
    }

    /// Create a filter around an engine that is already shared.
    pub fn with_shared_engine(engine: Arc<dyn AnonymizationEngine>) -> Self {
        Self {
            config: FlashConfig::default(),
            engine,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: FlashConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FlashConfig {
        &self.config
    }

    /// Active options in `[NAME=value]` form.
    pub fn options_summary(&self) -> Vec<String> {
        self.config.options_summary()
    }

    /// Anonymize a relation.
    ///
    /// The configuration is validated first. Relations with at most one row
    /// are returned unchanged without calling the engine.
    pub fn process(&self, relation: &Relation) -> Result<FlashOutcome> {
        let started = Instant::now();
        self.config.validate()?;

        let mut report = AnonymizationReport::new(relation, self.engine.name(), self.config.metric);

        if relation.row_count() <= 1 {
            debug!(
                relation = %relation.name,
                rows = relation.row_count(),
                "relation too small, passing through"
            );
            report.skipped = true;
            return Ok(FlashOutcome {
                relation: relation.clone(),
                report,
            });
        }

        let columns = relation.attribute_names();
        let partition = classify(
            &columns,
            &self.config.effective_quasi_identifiers(&columns),
            &self.config.sensitive,
        )?;
        debug!(
            quasi_identifiers = ?partition.quasi_identifiers,
            sensitive = ?partition.sensitive,
            "classified attributes"
        );

        let loader = HierarchyLoader::new(&self.config.hierarchy_dir, &relation.name)
            .with_delimiter(self.config.delimiter_byte()?)
            .with_extension(self.config.hierarchy_extension.clone())
            .with_numeric_policy(self.config.numeric_policy);

        let mut hierarchies = IndexMap::with_capacity(partition.quasi_identifiers.len());
        for name in &partition.quasi_identifiers {
            let loaded = loader.build(name, relation)?;
            if loaded.source == HierarchySource::Synthesized {
                debug!(attribute = %name, "no hierarchy file, using attribute values");
            }
            report.hierarchies.insert(
                name.clone(),
                HierarchySummary {
                    source: loaded.source,
                    levels: loaded.hierarchy.max_level(),
                    entries: loaded.hierarchy.len(),
                },
            );
            hierarchies.insert(name.clone(), loaded.hierarchy);
        }

        let input = adapt(relation, &partition, &hierarchies, self.config.numeric_policy)?;
        let engine_config = self.config.engine_config(&partition.sensitive);
        report.criteria = engine_config.criteria.iter().map(ToString::to_string).collect();

        info!(
            relation = %relation.name,
            rows = relation.row_count(),
            engine = self.engine.name(),
            options = %self.options_summary().join(" "),
            "anonymizing"
        );

        let result = self
            .engine
            .anonymize(&input, &engine_config)
            .map_err(|source| FlashError::Engine {
                engine: self.engine.name().to_string(),
                source,
            })?;

        let anonymized = reconcile(relation, &result, &partition.quasi_identifiers)?;

        for name in &partition.quasi_identifiers {
            let level = result.level(name);
            report.levels.insert(name.clone(), level);
            if level > 0 {
                report.rewritten.push(name.clone());
            }
        }
        report.suppressed_rows = result.suppressed_rows.len();
        if report.suppressed_rows > 0 {
            warn!(
                suppressed = report.suppressed_rows,
                "rows suppressed as outliers"
            );
        }
        report.partition = partition;
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            levels = ?report.levels,
            elapsed_ms = report.elapsed_ms,
            "anonymization finished"
        );

        Ok(FlashOutcome {
            relation: anonymized,
            report,
        })
    }
}
