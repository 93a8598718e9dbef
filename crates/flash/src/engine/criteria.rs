//! Privacy criteria and information-loss metrics passed to the engine.

use serde::{Deserialize, Serialize};

/// Variant of l-diversity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LDiversityVariant {
    #[default]
    Distinct,
    Entropy,
}

impl LDiversityVariant {
    /// Look up a variant by its numeric tag (0 = distinct, 1 = entropy).
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(LDiversityVariant::Distinct),
            1 => Some(LDiversityVariant::Entropy),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LDiversityVariant::Distinct => "Distinct L-Diversity",
            LDiversityVariant::Entropy => "Entropy L-Diversity",
        }
    }
}

impl std::str::FromStr for LDiversityVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "0" | "distinct" => Ok(LDiversityVariant::Distinct),
            "1" | "entropy" => Ok(LDiversityVariant::Entropy),
            _ => Err(format!(
                "Unknown l-diversity variant: {}. Use distinct (0) or entropy (1).",
                s
            )),
        }
    }
}

/// A privacy criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrivacyCriterion {
    /// Every equivalence class has at least `k` rows.
    KAnonymity { k: u32 },
    /// Every class has at least `l` distinct values of `attribute`.
    DistinctLDiversity { attribute: String, l: u32 },
    /// The entropy of `attribute` within every class is at least ln(l).
    EntropyLDiversity { attribute: String, l: u32 },
    /// Equal-distance EMD between every class and the whole table is at most `t`.
    EqualDistanceTCloseness { attribute: String, t: f64 },
}

impl PrivacyCriterion {
    /// The sensitive attribute this criterion protects, if any.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            PrivacyCriterion::KAnonymity { .. } => None,
            PrivacyCriterion::DistinctLDiversity { attribute, .. }
            | PrivacyCriterion::EntropyLDiversity { attribute, .. }
            | PrivacyCriterion::EqualDistanceTCloseness { attribute, .. } => Some(attribute),
        }
    }
}

impl std::fmt::Display for PrivacyCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrivacyCriterion::KAnonymity { k } => write!(f, "{}-anonymity", k),
            PrivacyCriterion::DistinctLDiversity { attribute, l } => {
                write!(f, "distinct-{}-diversity({})", l, attribute)
            }
            PrivacyCriterion::EntropyLDiversity { attribute, l } => {
                write!(f, "entropy-{}-diversity({})", l, attribute)
            }
            PrivacyCriterion::EqualDistanceTCloseness { attribute, t } => {
                write!(f, "{}-closeness({})", t, attribute)
            }
        }
    }
}

/// Information-loss metric used by the engine to rank transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Sum of generalization levels.
    #[default]
    Height,
    Precision,
    Discernability,
    AverageClassSize,
    NonUniformEntropy,
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "height" => Ok(Metric::Height),
            "precision" => Ok(Metric::Precision),
            "discernability" => Ok(Metric::Discernability),
            "average_class_size" | "aecs" => Ok(Metric::AverageClassSize),
            "non_uniform_entropy" | "entropy" => Ok(Metric::NonUniformEntropy),
            _ => Err(format!("Unknown metric: {}", s)),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Height => write!(f, "height"),
            Metric::Precision => write!(f, "precision"),
            Metric::Discernability => write!(f, "discernability"),
            Metric::AverageClassSize => write!(f, "average_class_size"),
            Metric::NonUniformEntropy => write!(f, "non_uniform_entropy"),
        }
    }
}
