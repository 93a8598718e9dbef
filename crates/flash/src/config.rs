//! Filter configuration.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{EngineConfig, EngineSettings, LDiversityVariant, Metric, PrivacyCriterion};
use crate::error::{FlashError, Result};
use crate::hierarchy::{DEFAULT_HIERARCHY_DELIMITER, DEFAULT_HIERARCHY_EXTENSION};
use crate::relation::NumericPolicy;
use crate::schema::parse_name_list;

/// Bounds applied to k and l.
pub const KL_MIN_VALUE: u32 = 2;
pub const KL_MAX_VALUE: u32 = 100;

/// Bounds applied to t.
pub const T_MIN_VALUE: f64 = 0.001;
pub const T_MAX_VALUE: f64 = 1.0;

/// Which criteria are enabled and their parameters.
///
/// A criterion is enabled when its parameter is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaConfig {
    pub k: Option<u32>,
    pub l: Option<u32>,
    pub l_variant: LDiversityVariant,
    pub t: Option<f64>,
}

impl Default for CriteriaConfig {
    fn default() -> Self {
        Self {
            k: Some(KL_MIN_VALUE),
            l: None,
            l_variant: LDiversityVariant::default(),
            t: None,
        }
    }
}

impl CriteriaConfig {
    /// k clamped into [2, 100], if k-anonymity is enabled.
    pub fn k(&self) -> Option<u32> {
        self.k.map(|k| k.clamp(KL_MIN_VALUE, KL_MAX_VALUE))
    }

    /// l clamped into [2, 100], if l-diversity is enabled.
    pub fn l(&self) -> Option<u32> {
        self.l.map(|l| l.clamp(KL_MIN_VALUE, KL_MAX_VALUE))
    }

    /// t clamped into [0.001, 1.0], if t-closeness is enabled.
    pub fn t(&self) -> Option<f64> {
        self.t.map(|t| t.clamp(T_MIN_VALUE, T_MAX_VALUE))
    }

    pub fn is_empty(&self) -> bool {
        self.k.is_none() && self.l.is_none() && self.t.is_none()
    }

    /// Whether a criterion needing sensitive attributes is enabled.
    pub fn needs_sensitive(&self) -> bool {
        self.l.is_some() || self.t.is_some()
    }
}

/// Configuration of the Flash filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Folder holding `<relation>_hierarchy_<attribute>.csv` files.
    pub hierarchy_dir: PathBuf,
    /// Quasi-identifying attribute names. Empty means every attribute not
    /// listed as sensitive.
    pub quasi_identifiers: Vec<String>,
    /// Sensitive attribute names.
    pub sensitive: Vec<String>,
    pub criteria: CriteriaConfig,
    /// Maximum fraction of rows that may be suppressed, in [0, 1).
    pub max_outliers: f64,
    pub metric: Metric,
    pub numeric_policy: NumericPolicy,
    /// Field delimiter of hierarchy files.
    pub hierarchy_delimiter: char,
    /// Extension of hierarchy files.
    pub hierarchy_extension: String,
    pub engine: EngineSettings,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            hierarchy_dir: PathBuf::from("."),
            quasi_identifiers: Vec::new(),
            sensitive: Vec::new(),
            criteria: CriteriaConfig::default(),
            max_outliers: 0.0,
            metric: Metric::default(),
            numeric_policy: NumericPolicy::default(),
            hierarchy_delimiter: DEFAULT_HIERARCHY_DELIMITER as char,
            hierarchy_extension: DEFAULT_HIERARCHY_EXTENSION.to_string(),
            engine: EngineSettings::default(),
        }
    }
}

impl FlashConfig {
    /// Create a configuration with defaults (2-anonymity, no outliers).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hierarchy folder.
    pub fn with_hierarchy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.hierarchy_dir = dir.into();
        self
    }

    /// Set quasi-identifiers from a comma-separated list.
    pub fn with_quasi_identifiers(mut self, list: &str) -> Self {
        self.quasi_identifiers = parse_name_list(list);
        self
    }

    /// Set sensitive attributes from a comma-separated list.
    pub fn with_sensitive(mut self, list: &str) -> Self {
        self.sensitive = parse_name_list(list);
        self
    }

    /// Enable or disable k-anonymity.
    pub fn with_k(mut self, k: Option<u32>) -> Self {
        self.criteria.k = k;
        self
    }

    /// Enable or disable l-diversity.
    pub fn with_l(mut self, l: Option<u32>, variant: LDiversityVariant) -> Self {
        self.criteria.l = l;
        self.criteria.l_variant = variant;
        self
    }

    /// Enable or disable t-closeness.
    pub fn with_t(mut self, t: Option<f64>) -> Self {
        self.criteria.t = t;
        self
    }

    pub fn with_max_outliers(mut self, max_outliers: f64) -> Self {
        self.max_outliers = max_outliers;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_numeric_policy(mut self, policy: NumericPolicy) -> Self {
        self.numeric_policy = policy;
        self
    }

    /// Quasi-identifier names to classify `columns` with.
    ///
    /// An empty list selects every column; sensitive names still win during
    /// classification.
    pub fn effective_quasi_identifiers<C: AsRef<str>>(&self, columns: &[C]) -> Vec<String> {
        if self.quasi_identifiers.is_empty() {
            columns.iter().map(|c| c.as_ref().to_string()).collect()
        } else {
            self.quasi_identifiers.clone()
        }
    }

    /// Check the configuration before anything is computed.
    pub fn validate(&self) -> Result<()> {
        if self.criteria.is_empty() {
            return Err(FlashError::NoCriterion);
        }
        if self.criteria.needs_sensitive() && self.sensitive.is_empty() {
            return Err(FlashError::MissingSensitive);
        }
        if let (Some(k), Some(l)) = (self.criteria.k(), self.criteria.l()) {
            if l > k {
                return Err(FlashError::ParameterOrder { l, k });
            }
        }
        if !self.hierarchy_dir.is_dir() {
            return Err(FlashError::NotADirectory(self.hierarchy_dir.clone()));
        }
        if !(0.0..1.0).contains(&self.max_outliers) {
            return Err(FlashError::OutlierBudget(self.max_outliers));
        }
        self.delimiter_byte()?;
        Ok(())
    }

    /// Hierarchy delimiter as a single byte.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.hierarchy_delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                FlashError::InvalidDelimiter(format!(
                    "'{}' is not a single-byte character",
                    self.hierarchy_delimiter
                ))
            })
    }

    /// Criteria for the engine; l-diversity and t-closeness are instantiated
    /// once per sensitive attribute.
    pub fn privacy_criteria(&self, sensitive: &[String]) -> Vec<PrivacyCriterion> {
        let mut criteria = Vec::new();

        if let Some(k) = self.criteria.k() {
            criteria.push(PrivacyCriterion::KAnonymity { k });
        }
        if let Some(l) = self.criteria.l() {
            for attribute in sensitive {
                criteria.push(match self.criteria.l_variant {
                    LDiversityVariant::Distinct => PrivacyCriterion::DistinctLDiversity {
                        attribute: attribute.clone(),
                        l,
                    },
                    LDiversityVariant::Entropy => PrivacyCriterion::EntropyLDiversity {
                        attribute: attribute.clone(),
                        l,
                    },
                });
            }
        }
        if let Some(t) = self.criteria.t() {
            for attribute in sensitive {
                criteria.push(PrivacyCriterion::EqualDistanceTCloseness {
                    attribute: attribute.clone(),
                    t,
                });
            }
        }

        criteria
    }

    /// Engine configuration for the given sensitive attributes.
    pub fn engine_config(&self, sensitive: &[String]) -> EngineConfig {
        EngineConfig {
            criteria: self.privacy_criteria(sensitive),
            metric: self.metric,
            max_outliers: self.max_outliers,
            settings: self.engine.clone(),
        }
    }

    /// Active options in `[NAME=value]` form.
    pub fn options_summary(&self) -> Vec<String> {
        let mut options = Vec::new();

        if let Some(k) = self.criteria.k() {
            options.push(format!("[K={}]", k));
        }
        if let Some(l) = self.criteria.l() {
            options.push(format!("[L={}]", l));
            options.push(format!("[Variant={}]", self.criteria.l_variant.label()));
        }
        if let Some(t) = self.criteria.t() {
            options.push(format!("[T={}]", t));
        }
        if self.max_outliers > 0.0 {
            options.push(format!("[MaxOutliers={}]", self.max_outliers));
        }

        options
    }

    /// Save the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| FlashError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| FlashError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a configuration saved with [`FlashConfig::save`].
    ///
    /// Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| FlashError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}
