//! Writing relations back to delimited text or JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{FlashError, Result};

use super::attribute::{NumericPolicy, Value};
use super::table::Relation;

/// Writes relations to delimited text or JSON.
pub struct RelationWriter {
    delimiter: u8,
}

impl RelationWriter {
    /// Create a writer for the given delimiter.
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Write a relation as delimited text with a header row.
    pub fn write<W: Write>(&self, relation: &Relation, writer: W) -> Result<()> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        out.write_record(relation.attribute_names())?;
        for row in relation.rows() {
            out.write_record(row.iter().map(render_cell))?;
        }
        out.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Write a relation to a file.
    pub fn write_file(&self, relation: &Relation, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| FlashError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.write(relation, BufWriter::new(file))
    }

    /// Write a relation as pretty JSON.
    pub fn write_json<W: Write>(relation: &Relation, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, relation)?;
        Ok(())
    }
}

impl Default for RelationWriter {
    fn default() -> Self {
        Self::new(b',')
    }
}

fn render_cell(value: &Value) -> String {
    value.render(NumericPolicy::Preserve)
}
