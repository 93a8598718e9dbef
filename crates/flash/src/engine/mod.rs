//! The anonymization engine boundary.
//!
//! The engine searches the generalization lattice for a transformation that
//! satisfies the configured privacy criteria. This crate only configures and
//! calls it through [`AnonymizationEngine`]; [`FixedLevelEngine`] is a
//! search-free implementation for preset levels and tests.

mod criteria;
mod fixed;
mod provider;

pub use criteria::{LDiversityVariant, Metric, PrivacyCriterion};
pub use fixed::{FixedEngineError, FixedLevelEngine};
pub use provider::{
    AnonymizationEngine, AnonymizationResult, EngineConfig, EngineError, EngineSettings,
    OutputTable,
};
