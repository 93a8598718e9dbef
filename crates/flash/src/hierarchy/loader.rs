//! Loading hierarchies from side-files or synthesizing flat ones.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{FlashError, Result};
use crate::relation::{Attribute, AttributeKind, NumericPolicy, Relation, Value};

use super::model::Hierarchy;

/// Default field delimiter of hierarchy files.
pub const DEFAULT_HIERARCHY_DELIMITER: u8 = b';';

/// Default extension of hierarchy files.
pub const DEFAULT_HIERARCHY_EXTENSION: &str = "csv";

/// Where a hierarchy came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HierarchySource {
    /// Parsed from a side-file.
    File { path: PathBuf },
    /// Built from the attribute's own values.
    Synthesized,
}

/// A hierarchy together with its source.
#[derive(Debug, Clone)]
pub struct LoadedHierarchy {
    pub hierarchy: Hierarchy,
    pub source: HierarchySource,
}

/// Builds hierarchies for the attributes of one relation.
///
/// Side-files are looked up as
/// `<directory>/<relation>_hierarchy_<attribute>.<extension>`.
#[derive(Debug, Clone)]
pub struct HierarchyLoader {
    directory: PathBuf,
    relation: String,
    delimiter: u8,
    extension: String,
    numeric_policy: NumericPolicy,
}

impl HierarchyLoader {
    /// Create a loader for `relation` reading side-files from `directory`.
    pub fn new(directory: impl Into<PathBuf>, relation: &str) -> Self {
        Self {
            directory: directory.into(),
            relation: relation.trim().to_string(),
            delimiter: DEFAULT_HIERARCHY_DELIMITER,
            extension: DEFAULT_HIERARCHY_EXTENSION.to_string(),
            numeric_policy: NumericPolicy::default(),
        }
    }

    /// Set the side-file field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the side-file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set how numeric values are rendered when synthesizing.
    pub fn with_numeric_policy(mut self, policy: NumericPolicy) -> Self {
        self.numeric_policy = policy;
        self
    }

    /// Expected side-file path for an attribute.
    pub fn path_for(&self, attribute: &str) -> PathBuf {
        self.directory.join(format!(
            "{}_hierarchy_{}.{}",
            self.relation, attribute, self.extension
        ))
    }

    /// Build the hierarchy for the named attribute of `relation`.
    pub fn build(&self, attribute: &str, relation: &Relation) -> Result<LoadedHierarchy> {
        let index = relation
            .attribute_index(attribute)
            .ok_or_else(|| FlashError::UnknownAttribute(attribute.to_string()))?;
        let attr = &relation.attributes()[index];

        let path = self.path_for(attribute);
        if path.exists() {
            let hierarchy = self.load_file(attribute, &path)?;
            Ok(LoadedHierarchy {
                hierarchy,
                source: HierarchySource::File { path },
            })
        } else {
            Ok(LoadedHierarchy {
                hierarchy: self.synthesize(attr, relation.column_values(index)),
                source: HierarchySource::Synthesized,
            })
        }
    }

    /// Parse a side-file, appending the missing-value row.
    fn load_file(&self, attribute: &str, path: &Path) -> Result<Hierarchy> {
        let file = File::open(path).map_err(|e| FlashError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut hierarchy = Hierarchy::new();
        let mut width = 0;

        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| FlashError::HierarchyParse {
                path: path.to_path_buf(),
                source: e,
            })?;

            if width == 0 {
                width = record.len();
            } else if record.len() != width {
                return Err(FlashError::HierarchyWidth {
                    attribute: attribute.to_string(),
                    path: path.to_path_buf(),
                    line: record.position().map(|p| p.line() as usize).unwrap_or(idx + 1),
                    expected: width,
                    found: record.len(),
                });
            }

            hierarchy.add(record.iter().map(str::to_string).collect());
        }

        if width == 0 {
            return Err(FlashError::EmptyHierarchy {
                attribute: attribute.to_string(),
                path: path.to_path_buf(),
            });
        }

        hierarchy.add_missing(width);
        Ok(hierarchy)
    }

    /// Build a flat raw -> "*" hierarchy.
    ///
    /// Nominal attributes use their declared domain, numeric attributes the
    /// distinct observed values in order of first appearance. String
    /// attributes have no enumerable domain and yield an empty hierarchy.
    fn synthesize<'a>(
        &self,
        attribute: &Attribute,
        values: impl Iterator<Item = &'a Value>,
    ) -> Hierarchy {
        let mut hierarchy = Hierarchy::new();

        match &attribute.kind {
            AttributeKind::Nominal { values: domain } => {
                for value in domain {
                    hierarchy.add_suppressed(value.clone());
                }
            }
            AttributeKind::Numeric => {
                let distinct: IndexSet<String> = values
                    .filter_map(|v| match v {
                        Value::Numeric(n) => Some(self.numeric_policy.render(*n)),
                        _ => None,
                    })
                    .collect();
                for value in distinct {
                    hierarchy.add_suppressed(value);
                }
            }
            AttributeKind::String => return hierarchy,
        }

        hierarchy.add_missing(2);
        hierarchy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn relation() -> Relation {
        Relation::with_rows(
            " patients ",
            vec![
                Attribute::numeric("age"),
                Attribute::nominal("sex", ["m", "f"]),
                Attribute::string("name"),
            ],
            vec![
                vec![Value::Numeric(30.0), Value::text("m"), Value::text("Ann")],
                vec![Value::Numeric(30.4), Value::text("f"), Value::text("Bob")],
                vec![Value::Numeric(41.0), Value::Missing, Value::text("Cid")],
                vec![Value::Missing, Value::text("m"), Value::text("Dee")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_path_convention() {
        let loader = HierarchyLoader::new("/data/h", " patients ");
        assert_eq!(
            loader.path_for("zip"),
            PathBuf::from("/data/h/patients_hierarchy_zip.csv")
        );

        let loader = loader.with_extension("txt");
        assert_eq!(
            loader.path_for("zip"),
            PathBuf::from("/data/h/patients_hierarchy_zip.txt")
        );
    }

    #[test]
    fn test_synthesize_numeric_truncates_and_dedups() {
        let dir = TempDir::new().unwrap();
        let loader = HierarchyLoader::new(dir.path(), "patients");
        let loaded = loader.build("age", &relation()).unwrap();

        assert_eq!(loaded.source, HierarchySource::Synthesized);
        let raw: Vec<&str> = loaded.hierarchy.raw_values().collect();
        assert_eq!(raw, vec!["30", "41", "?"]);
        assert_eq!(loaded.hierarchy.height(), 2);
    }

    #[test]
    fn test_synthesize_nominal_uses_domain() {
        let dir = TempDir::new().unwrap();
        let loader = HierarchyLoader::new(dir.path(), "patients");
        let loaded = loader.build("sex", &relation()).unwrap();

        let raw: Vec<&str> = loaded.hierarchy.raw_values().collect();
        assert_eq!(raw, vec!["m", "f", "?"]);
        assert_eq!(loaded.hierarchy.generalize("f", 1), Some("*"));
    }

    #[test]
    fn test_string_attribute_yields_empty_hierarchy() {
        let dir = TempDir::new().unwrap();
        let loader = HierarchyLoader::new(dir.path(), "patients");
        let loaded = loader.build("name", &relation()).unwrap();
        assert!(loaded.hierarchy.is_empty());
    }

    #[test]
    fn test_load_file_appends_missing_row() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("patients_hierarchy_age.csv"),
            "30;30-39;*\n41;40-49;*\n",
        )
        .unwrap();

        let loader = HierarchyLoader::new(dir.path(), "patients");
        let loaded = loader.build("age", &relation()).unwrap();

        assert!(matches!(loaded.source, HierarchySource::File { .. }));
        assert_eq!(loaded.hierarchy.len(), 3);
        assert_eq!(loaded.hierarchy.rows()[2], vec!["?", "?", "*"]);
        assert_eq!(loaded.hierarchy.generalize("41", 1), Some("40-49"));
    }

    #[test]
    fn test_custom_delimiter() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("patients_hierarchy_sex.csv"), "m|*\nf|*\n").unwrap();

        let loader = HierarchyLoader::new(dir.path(), "patients").with_delimiter(b'|');
        let loaded = loader.build("sex", &relation()).unwrap();
        assert_eq!(loaded.hierarchy.height(), 2);
    }

    #[test]
    fn test_width_mismatch() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("patients_hierarchy_age.csv"),
            "30;30-39;*\n41;40-49;40+;*\n",
        )
        .unwrap();

        let loader = HierarchyLoader::new(dir.path(), "patients");
        match loader.build("age", &relation()) {
            Err(FlashError::HierarchyWidth {
                attribute,
                expected,
                found,
                line,
                ..
            }) => {
                assert_eq!(attribute, "age");
                assert_eq!(expected, 3);
                assert_eq!(found, 4);
                assert_eq!(line, 2);
            }
            other => panic!("expected HierarchyWidth, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("patients_hierarchy_age.csv"), "").unwrap();

        let loader = HierarchyLoader::new(dir.path(), "patients");
        assert!(matches!(
            loader.build("age", &relation()),
            Err(FlashError::EmptyHierarchy { .. })
        ));
    }

    #[test]
    fn test_unreadable_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patients_hierarchy_age.csv");
        fs::create_dir(&path).unwrap();

        let loader = HierarchyLoader::new(dir.path(), "patients");
        let err = loader.build("age", &relation()).unwrap_err();
        match &err {
            FlashError::Io { path: failed, .. }
            | FlashError::HierarchyParse { path: failed, .. } => assert_eq!(failed, &path),
            other => panic!("expected an I/O error, got {:?}", other),
        }
        assert!(err.to_string().contains("patients_hierarchy_age.csv"));
    }

    #[test]
    fn test_invalid_utf8_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patients_hierarchy_sex.csv");
        fs::write(&path, b"m;*\n\xff\xfe;*\n").unwrap();

        let loader = HierarchyLoader::new(dir.path(), "patients");
        match loader.build("sex", &relation()) {
            Err(FlashError::HierarchyParse { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected HierarchyParse, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_attribute() {
        let dir = TempDir::new().unwrap();
        let loader = HierarchyLoader::new(dir.path(), "patients");
        assert!(matches!(
            loader.build("zip", &relation()),
            Err(FlashError::UnknownAttribute(_))
        ));
    }
}
