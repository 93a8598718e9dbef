//! CLI command implementations.

pub mod anonymize;
pub mod hierarchy;
pub mod inspect;

use std::path::Path;

use flash::relation::ReaderConfig;
use flash::{Relation, RelationReader, SourceMetadata};

/// Read a data file, optionally overriding the relation name and delimiter.
pub(crate) fn read_relation(
    file: &Path,
    relation: Option<String>,
    delimiter: Option<char>,
) -> Result<(Relation, SourceMetadata), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let delimiter = match delimiter {
        Some(c) if c.is_ascii() => Some(c as u8),
        Some(c) => return Err(format!("Delimiter must be a single-byte character, got '{}'", c).into()),
        None => None,
    };

    let reader = RelationReader::with_config(ReaderConfig {
        delimiter,
        relation_name: relation,
        ..ReaderConfig::default()
    });
    Ok(reader.read_file(file)?)
}
