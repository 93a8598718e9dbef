//! The relation: a named table of typed attributes.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{FlashError, Result};

use super::attribute::{Attribute, Value};

/// Represents a named relation with typed attributes.
///
/// Rows only enter through [`Relation::push_row`], so every row is as wide
/// as the attribute list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    /// Relation name, used to locate hierarchy files.
    pub name: String,
    attributes: Vec<Attribute>,
    rows: Vec<Vec<Value>>,
}

impl Relation {
    /// Create an empty relation.
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Result<Self> {
        let mut seen = HashSet::new();
        for attr in &attributes {
            if !seen.insert(attr.name.as_str()) {
                return Err(FlashError::Config(format!(
                    "Duplicate attribute name \"{}\"",
                    attr.name
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            attributes,
            rows: Vec::new(),
        })
    }

    /// Create a relation and fill it with rows.
    pub fn with_rows(
        name: impl Into<String>,
        attributes: Vec<Attribute>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        let mut relation = Self::new(name, attributes)?;
        for row in rows {
            relation.push_row(row)?;
        }
        Ok(relation)
    }

    /// Append a row, checking its width.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.attributes.len() {
            return Err(FlashError::Config(format!(
                "Row {} has {} values but relation '{}' has {} attributes",
                self.rows.len(),
                row.len(),
                self.name,
                self.attributes.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Attributes in column order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Row data in row-major order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Get the number of attributes.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all attribute names in column order.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Get an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Get the column index of an attribute.
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Replace the attribute at `index`, keeping its position.
    pub(crate) fn replace_attribute(&mut self, index: usize, attribute: Attribute) {
        self.attributes[index] = attribute;
    }

    pub(crate) fn set_value(&mut self, row: usize, col: usize, value: Value) {
        self.rows[row][col] = value;
    }
}
