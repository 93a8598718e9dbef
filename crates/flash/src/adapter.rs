//! Conversion of relations into the engine's generic table format.

use indexmap::IndexMap;

use crate::error::{FlashError, Result};
use crate::hierarchy::Hierarchy;
use crate::relation::{NumericPolicy, Relation};
use crate::schema::{AttributeRole, RolePartition};

/// How the engine should treat one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeDefinition {
    /// Generalized along the attached hierarchy.
    QuasiIdentifying(Hierarchy),
    Sensitive,
    Insensitive,
}

impl AttributeDefinition {
    pub fn role(&self) -> AttributeRole {
        match self {
            AttributeDefinition::QuasiIdentifying(_) => AttributeRole::QuasiIdentifying,
            AttributeDefinition::Sensitive => AttributeRole::Sensitive,
            AttributeDefinition::Insensitive => AttributeRole::Insensitive,
        }
    }

    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        match self {
            AttributeDefinition::QuasiIdentifying(h) => Some(h),
            _ => None,
        }
    }
}

/// Generic string table plus per-column definitions, as handed to the engine.
#[derive(Debug, Clone)]
pub struct EngineInput {
    /// Column names in relation order.
    pub header: Vec<String>,
    /// One string row per relation row.
    pub rows: Vec<Vec<String>>,
    /// Definition per column name, in header order.
    pub definitions: IndexMap<String, AttributeDefinition>,
}

impl EngineInput {
    /// Number of lines of the generic table, header included.
    pub fn line_count(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    pub fn definition(&self, name: &str) -> Option<&AttributeDefinition> {
        self.definitions.get(name)
    }

    /// Quasi-identifying columns with their hierarchies, in header order.
    pub fn quasi_identifiers(&self) -> impl Iterator<Item = (&str, &Hierarchy)> {
        self.definitions
            .iter()
            .filter_map(|(name, def)| def.hierarchy().map(|h| (name.as_str(), h)))
    }

    /// Names of the sensitive columns, in header order.
    pub fn sensitive(&self) -> impl Iterator<Item = &str> {
        self.definitions
            .iter()
            .filter(|(_, def)| matches!(def, AttributeDefinition::Sensitive))
            .map(|(name, _)| name.as_str())
    }

    /// The header followed by all rows.
    pub fn lines(&self) -> impl Iterator<Item = &[String]> {
        std::iter::once(self.header.as_slice()).chain(self.rows.iter().map(Vec::as_slice))
    }
}

/// Build the engine input for a classified relation.
///
/// Numeric cells are rendered with `policy`; under the default truncating
/// policy fractional digits are dropped, matching the hierarchy files
/// written for integer-valued columns. Every quasi-identifier value must be
/// covered by its hierarchy.
pub fn adapt(
    relation: &Relation,
    partition: &RolePartition,
    hierarchies: &IndexMap<String, Hierarchy>,
    policy: NumericPolicy,
) -> Result<EngineInput> {
    let header: Vec<String> = relation.attributes().iter().map(|a| a.name.clone()).collect();

    let rows: Vec<Vec<String>> = relation
        .rows()
        .iter()
        .map(|row| row.iter().map(|v| v.render(policy)).collect())
        .collect();

    let mut definitions = IndexMap::with_capacity(header.len());
    for (col, name) in header.iter().enumerate() {
        let definition = match partition.role_of(name) {
            Some(AttributeRole::QuasiIdentifying) => {
                let hierarchy = hierarchies.get(name).ok_or_else(|| {
                    FlashError::Config(format!("No hierarchy for quasi-identifier \"{}\"", name))
                })?;
                if let Some(value) = rows.iter().map(|r| &r[col]).find(|v| !hierarchy.covers(v)) {
                    return Err(FlashError::UncoveredValue {
                        attribute: name.clone(),
                        value: value.clone(),
                    });
                }
                AttributeDefinition::QuasiIdentifying(hierarchy.clone())
            }
            Some(AttributeRole::Sensitive) => AttributeDefinition::Sensitive,
            _ => AttributeDefinition::Insensitive,
        };
        definitions.insert(name.clone(), definition);
    }

    Ok(EngineInput {
        header,
        rows,
        definitions,
    })
}
