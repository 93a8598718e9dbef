//! Attribute and cell value types.

use serde::{Deserialize, Serialize};

/// The marker used for missing values in relations and hierarchies.
pub const MISSING_MARKER: &str = "?";

/// Kind of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeKind {
    /// Categorical attribute with a declared, ordered domain.
    Nominal { values: Vec<String> },
    /// Numeric attribute.
    Numeric,
    /// Free text attribute without a declared domain.
    String,
}

/// A named column of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, unique within its relation.
    pub name: String,
    /// Attribute kind.
    #[serde(flatten)]
    pub kind: AttributeKind,
}

impl Attribute {
    /// Create a nominal attribute over the given domain.
    pub fn nominal<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: AttributeKind::Nominal {
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Create a numeric attribute.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    /// Create a string attribute.
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::String,
        }
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self.kind, AttributeKind::Nominal { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, AttributeKind::Numeric)
    }

    /// Declared domain for nominal attributes.
    pub fn domain(&self) -> Option<&[String]> {
        match &self.kind {
            AttributeKind::Nominal { values } => Some(values),
            _ => None,
        }
    }
}

/// How numeric cells are rendered as strings for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    /// Truncate toward zero to an integer. Lossy for fractional values,
    /// kept as the default for compatibility with existing hierarchy files.
    #[default]
    Truncate,
    /// Shortest decimal form that round-trips.
    Preserve,
}

impl NumericPolicy {
    /// Render a numeric value under this policy.
    pub fn render(&self, value: f64) -> String {
        match self {
            NumericPolicy::Truncate => (value.trunc() as i64).to_string(),
            NumericPolicy::Preserve => value.to_string(),
        }
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Numeric(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Render the value the way the engine sees it.
    pub fn render(&self, policy: NumericPolicy) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Numeric(v) => policy.render(*v),
            Value::Missing => MISSING_MARKER.to_string(),
        }
    }
}
