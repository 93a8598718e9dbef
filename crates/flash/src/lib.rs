//! Flash: a k-anonymity filter for relational datasets.
//!
//! Flash classifies the attributes of a relation into quasi-identifying,
//! sensitive and insensitive ones, loads a generalization hierarchy for each
//! quasi-identifier, and hands the table to an [`AnonymizationEngine`]. The
//! engine's generalized values are then written back into the relation.
//!
//! Supported privacy criteria:
//!
//! - **k-anonymity**: every row shares its quasi-identifiers with k-1 others
//! - **l-diversity** (distinct or entropy): each class holds l sensitive values
//! - **t-closeness** (equal distance): class distributions stay near the global one
//!
//! # Example
//!
//! ```no_run
//! use flash::{Flash, FlashConfig, FixedLevelEngine, RelationReader};
//!
//! let (relation, _) = RelationReader::new().read_file("patients.csv").unwrap();
//! let config = FlashConfig::new()
//!     .with_hierarchy_dir("hierarchies")
//!     .with_quasi_identifiers("age,zipcode")
//!     .with_sensitive("disease")
//!     .with_k(Some(3));
//!
//! let flash = Flash::new(FixedLevelEngine::new().with_level("zipcode", 1)).with_config(config);
//! let outcome = flash.process(&relation).unwrap();
//! println!("levels: {:?}", outcome.report.levels);
//! ```

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod reconcile;
pub mod relation;
pub mod schema;

mod flash;

pub use crate::flash::{AnonymizationReport, Flash, FlashOutcome, HierarchySummary};
pub use adapter::{AttributeDefinition, EngineInput};
pub use config::{CriteriaConfig, FlashConfig};
pub use engine::{
    AnonymizationEngine, AnonymizationResult, EngineConfig, EngineError, FixedLevelEngine,
    LDiversityVariant, Metric, PrivacyCriterion,
};
pub use error::{FlashError, Result};
pub use hierarchy::{Hierarchy, HierarchyLoader, HierarchySource};
pub use relation::{
    Attribute, AttributeKind, NumericPolicy, Relation, RelationReader, RelationWriter,
    SourceMetadata, Value,
};
pub use schema::{AttributeRole, RolePartition};
