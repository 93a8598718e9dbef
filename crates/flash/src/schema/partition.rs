//! Partitioning attributes into roles.

use serde::{Deserialize, Serialize};

use crate::error::{FlashError, Result};

use super::types::AttributeRole;

/// Disjoint partition of a relation's attributes by role.
///
/// Each list follows the relation's column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePartition {
    pub quasi_identifiers: Vec<String>,
    pub sensitive: Vec<String>,
    pub insensitive: Vec<String>,
}

impl RolePartition {
    /// Role of the named attribute, if it belongs to the partition.
    pub fn role_of(&self, name: &str) -> Option<AttributeRole> {
        if self.quasi_identifiers.iter().any(|n| n == name) {
            Some(AttributeRole::QuasiIdentifying)
        } else if self.sensitive.iter().any(|n| n == name) {
            Some(AttributeRole::Sensitive)
        } else if self.insensitive.iter().any(|n| n == name) {
            Some(AttributeRole::Insensitive)
        } else {
            None
        }
    }

    pub fn is_quasi_identifier(&self, name: &str) -> bool {
        self.role_of(name) == Some(AttributeRole::QuasiIdentifying)
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        self.role_of(name) == Some(AttributeRole::Sensitive)
    }
}

/// Classify `columns` into roles.
///
/// A name listed both as quasi-identifier and sensitive is sensitive. Every
/// requested name must be one of `columns`.
pub fn classify<C, Q, S>(columns: &[C], qi_names: &[Q], sensitive_names: &[S]) -> Result<RolePartition>
where
    C: AsRef<str>,
    Q: AsRef<str>,
    S: AsRef<str>,
{
    let known = |name: &str| columns.iter().any(|c| c.as_ref() == name);

    for name in qi_names
        .iter()
        .map(AsRef::as_ref)
        .chain(sensitive_names.iter().map(AsRef::as_ref))
    {
        if !known(name) {
            return Err(FlashError::UnknownAttribute(name.to_string()));
        }
    }

    let mut partition = RolePartition::default();
    for column in columns.iter().map(AsRef::as_ref) {
        if sensitive_names.iter().any(|n| n.as_ref() == column) {
            partition.sensitive.push(column.to_string());
        } else if qi_names.iter().any(|n| n.as_ref() == column) {
            partition.quasi_identifiers.push(column.to_string());
        } else {
            partition.insensitive.push(column.to_string());
        }
    }

    Ok(partition)
}

/// Split a comma-separated name list, trimming whitespace and skipping
/// empty entries.
pub fn parse_name_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
