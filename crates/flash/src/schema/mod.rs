//! Attribute roles and the classifier that assigns them.

mod partition;
mod types;

pub use partition::{RolePartition, classify, parse_name_list};
pub use types::AttributeRole;
