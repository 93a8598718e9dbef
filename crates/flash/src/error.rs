//! Error types for the Flash library.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineError;

/// Main error type for Flash operations.
#[derive(Debug, Error)]
pub enum FlashError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error that has no more specific variant.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An attribute name does not exist in the relation.
    #[error("The attribute \"{0}\" does not exist")]
    UnknownAttribute(String),

    /// No privacy criterion is enabled.
    #[error("Please choose at least one privacy criterion")]
    NoCriterion,

    /// l-diversity or t-closeness is enabled without a sensitive attribute.
    #[error("l-diversity and t-closeness require at least one sensitive attribute")]
    MissingSensitive,

    /// l exceeds k.
    #[error("l must be less or equal to k, but {l} > {k}")]
    ParameterOrder { l: u32, k: u32 },

    /// The hierarchy folder is missing or not a directory.
    #[error("The hierarchy folder '{0}' must be a directory")]
    NotADirectory(PathBuf),

    /// Outlier budget outside [0, 1).
    #[error("maxOutliers must be in [0, 1), got {0}")]
    OutlierBudget(f64),

    /// A hierarchy line has a different field count than the first line.
    #[error(
        "All lines in the hierarchy for attribute \"{attribute}\" ('{path}') must have the same \
         number of entries: expected {expected}, found {found} on line {line}"
    )]
    HierarchyWidth {
        attribute: String,
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A hierarchy file contains no lines.
    #[error("Hierarchy file '{path}' for attribute \"{attribute}\" is empty")]
    EmptyHierarchy { attribute: String, path: PathBuf },

    /// A hierarchy file could not be parsed.
    #[error("Failed to parse hierarchy file '{path}': {source}")]
    HierarchyParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A quasi-identifier value has no row in its hierarchy.
    #[error("Value \"{value}\" of attribute \"{attribute}\" is not covered by its hierarchy")]
    UncoveredValue { attribute: String, value: String },

    /// The engine returned output that does not line up with the input.
    #[error("Engine output does not match the input relation: {0}")]
    EngineOutputShape(String),

    /// Failure raised by the anonymization engine.
    #[error("Anonymization engine '{engine}' failed: {source}")]
    Engine {
        engine: String,
        #[source]
        source: EngineError,
    },
}

/// Result type alias for Flash operations.
pub type Result<T> = std::result::Result<T, FlashError>;
