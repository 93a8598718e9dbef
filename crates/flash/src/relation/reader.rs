//! CSV/TSV reader producing typed relations.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{FlashError, Result};

use super::attribute::{Attribute, MISSING_MARKER, NumericPolicy, Value};
use super::table::Relation;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was read.
    pub read_at: DateTime<Utc>,
}

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
    /// Relation name (None = file stem).
    pub relation_name: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            relation_name: None,
        }
    }
}

/// Reads delimited files into relations, inferring attribute kinds.
///
/// A column whose non-missing values are all plain decimal numbers becomes a
/// numeric attribute; every other column becomes nominal with its distinct
/// values, in order of first appearance, as the declared domain. A value is
/// plain when it renders back to the same text, so codes such as `02138`,
/// `+5`, `1e3` or `nan` keep the column nominal.
pub struct RelationReader {
    config: ReaderConfig,
}

impl RelationReader {
    /// Create a new reader with default configuration.
    pub fn new() -> Self {
        Self {
            config: ReaderConfig::default(),
        }
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a file and return the relation and metadata.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<(Relation, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| FlashError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| FlashError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let name = self.config.relation_name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let relation = self.read_bytes(&contents, delimiter, name)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let metadata = SourceMetadata {
            file: path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            hash,
            size_bytes: contents.len() as u64,
            format,
            row_count: relation.row_count(),
            column_count: relation.attribute_count(),
            read_at: Utc::now(),
        };

        Ok((relation, metadata))
    }

    /// Read a relation from in-memory bytes.
    pub fn read_bytes(&self, bytes: &[u8], delimiter: u8, name: impl Into<String>) -> Result<Relation> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(FlashError::EmptyData("No columns found".to_string()));
        }

        let expected_cols = headers.len();
        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.trim().to_string()).collect();
            row.resize(expected_cols, String::new());
            raw_rows.push(row);
        }

        let numeric: Vec<bool> = (0..expected_cols)
            .map(|col| is_numeric_column(raw_rows.iter().map(|r| r[col].as_str())))
            .collect();

        let attributes = headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                if numeric[col] {
                    Attribute::numeric(header.clone())
                } else {
                    let domain: IndexSet<&str> = raw_rows
                        .iter()
                        .map(|r| r[col].as_str())
                        .filter(|v| !is_missing_value(v))
                        .collect();
                    Attribute::nominal(header.clone(), domain)
                }
            })
            .collect();

        let rows = raw_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .enumerate()
                    .map(|(col, cell)| to_value(cell, numeric[col]))
                    .collect()
            })
            .collect();

        Relation::with_rows(name, attributes, rows)
    }
}

impl Default for RelationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a raw cell denotes a missing value.
pub fn is_missing_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == MISSING_MARKER
}

fn is_numeric_column<'a>(values: impl Iterator<Item = &'a str>) -> bool {
    let mut any = false;
    for value in values.filter(|v| !is_missing_value(v)) {
        if !is_plain_number(value) {
            return false;
        }
        any = true;
    }
    any
}

/// A number whose text survives a parse and render unchanged.
fn is_plain_number(value: &str) -> bool {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => NumericPolicy::Preserve.render(parsed) == value,
        _ => false,
    }
}

fn to_value(cell: String, numeric: bool) -> Value {
    if is_missing_value(&cell) {
        Value::Missing
    } else if numeric {
        // Checked by is_numeric_column.
        cell.parse().map(Value::Numeric).unwrap_or(Value::Missing)
    } else {
        Value::Text(cell)
    }
}

/// Pick the delimiter that splits the first lines most evenly.
///
/// A candidate found the same number of times on every sampled line beats
/// any irregular one; ties prefer more fields, then tab.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let sample: Vec<String> = BufReader::new(bytes)
        .lines()
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    let Some(header) = sample.first() else {
        return Err(FlashError::EmptyData("No lines to analyze".to_string()));
    };

    let best = DELIMITERS
        .iter()
        .copied()
        .filter_map(|delim| {
            let fields = unquoted_count(header, delim);
            if fields == 0 {
                return None;
            }
            let regular = sample.iter().all(|line| unquoted_count(line, delim) == fields);
            Some(((regular, fields, delim == b'\t'), delim))
        })
        .max_by_key(|(rank, _)| *rank)
        .map(|(_, delim)| delim);

    Ok(best.unwrap_or(b','))
}

/// Occurrences of `delimiter` in `line` outside double quotes.
fn unquoted_count(line: &str, delimiter: u8) -> usize {
    line.bytes()
        .scan(false, |quoted, b| {
            if b == b'"' {
                *quoted = !*quoted;
            }
            Some(!*quoted && b == delimiter)
        })
        .filter(|hit| *hit)
        .count()
}
