//! Generalization hierarchies for quasi-identifying attributes.

mod loader;
mod model;

pub use loader::{
    DEFAULT_HIERARCHY_DELIMITER, DEFAULT_HIERARCHY_EXTENSION, HierarchyLoader, HierarchySource,
    LoadedHierarchy,
};
pub use model::{Hierarchy, SUPPRESSION_SYMBOL, missing_row};
