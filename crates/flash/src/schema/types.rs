//! Attribute role definitions.

use serde::{Deserialize, Serialize};

/// Role of an attribute during anonymization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeRole {
    /// May re-identify a record in combination with others; generalized.
    QuasiIdentifying,
    /// Protected by l-diversity / t-closeness; never generalized.
    Sensitive,
    /// Passed through untouched.
    #[default]
    Insensitive,
}

impl std::fmt::Display for AttributeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeRole::QuasiIdentifying => write!(f, "quasi-identifying"),
            AttributeRole::Sensitive => write!(f, "sensitive"),
            AttributeRole::Insensitive => write!(f, "insensitive"),
        }
    }
}
