//! End-to-end tests for the Flash filter.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use tempfile::TempDir;

use flash::engine::OutputTable;
use flash::{
    AnonymizationEngine, AnonymizationResult, Attribute, EngineConfig, EngineError, EngineInput,
    FixedLevelEngine, Flash, FlashConfig, FlashError, HierarchySource, LDiversityVariant,
    PrivacyCriterion, Relation, RelationReader, RelationWriter, Value,
};

/// Engine that generalizes at preset levels and records what it was given.
struct StubEngine {
    levels: IndexMap<String, usize>,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Option<(usize, Vec<PrivacyCriterion>)>>>,
}

impl StubEngine {
    fn new(levels: &[(&str, usize)]) -> Self {
        Self {
            levels: levels.iter().map(|(n, l)| (n.to_string(), *l)).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(None)),
        }
    }
}

impl AnonymizationEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    fn anonymize(
        &self,
        input: &EngineInput,
        config: &EngineConfig,
    ) -> Result<AnonymizationResult, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().unwrap() = Some((input.line_count(), config.criteria.clone()));

        let mut rows = input.rows.clone();
        let mut generalization = IndexMap::new();
        for (name, hierarchy) in input.quasi_identifiers() {
            let level = self.levels.get(name).copied().unwrap_or(0);
            let col = input.column_index(name).unwrap();
            for row in rows.iter_mut() {
                row[col] = hierarchy.generalize(&row[col], level).unwrap().to_string();
            }
            generalization.insert(name.to_string(), level);
        }

        Ok(AnonymizationResult {
            output: OutputTable {
                header: input.header.clone(),
                rows,
            },
            generalization,
            suppressed_rows: Vec::new(),
        })
    }
}

/// Engine that always fails.
struct FailingEngine;

impl AnonymizationEngine for FailingEngine {
    fn name(&self) -> &str {
        "failing"
    }

    fn anonymize(
        &self,
        _input: &EngineInput,
        _config: &EngineConfig,
    ) -> Result<AnonymizationResult, EngineError> {
        Err("no solution found".into())
    }
}

const PATIENTS: &str = "age,zip,name,disease\n\
                        29,13053,Ann,flu\n\
                        22,13068,Bob,cancer\n\
                        27,13068,Cid,flu\n\
                        43,14853,Dee,heart\n\
                        52,14853,Eve,flu\n\
                        47,14850,Fay,cancer\n\
                        30,13053,Gus,heart\n\
                        36,13053,Hal,flu\n\
                        32,13068,Ivy,cancer\n\
                        29,14850,Jon,heart\n";

fn patients() -> Relation {
    RelationReader::new()
        .read_bytes(PATIENTS.as_bytes(), b',', "patients")
        .expect("Failed to read relation")
}

fn config(dir: &TempDir) -> FlashConfig {
    FlashConfig::new()
        .with_hierarchy_dir(dir.path())
        .with_quasi_identifiers("age,zip")
        .with_sensitive("disease")
        .with_k(Some(2))
}

fn write_zip_hierarchy(dir: &TempDir) {
    fs::write(
        dir.path().join("patients_hierarchy_zip.csv"),
        "13053;1305*;130**;*\n\
         13068;1306*;130**;*\n\
         14850;1485*;148**;*\n\
         14853;1485*;148**;*\n",
    )
    .unwrap();
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_end_to_end_with_synthesized_hierarchies() {
    let dir = TempDir::new().unwrap();
    let relation = patients();

    let engine = StubEngine::new(&[("zip", 1), ("age", 0)]);
    let seen = Arc::clone(&engine.seen);
    let flash = Flash::new(engine).with_config(config(&dir));

    let outcome = flash.process(&relation).expect("Anonymization failed");
    let report = &outcome.report;

    assert_eq!(report.partition.quasi_identifiers, vec!["age", "zip"]);
    assert_eq!(report.partition.sensitive, vec!["disease"]);
    assert_eq!(report.partition.insensitive, vec!["name"]);

    assert_eq!(report.hierarchies["age"].source, HierarchySource::Synthesized);
    assert_eq!(report.hierarchies["zip"].source, HierarchySource::Synthesized);
    // 4 distinct zips plus the missing-value row
    assert_eq!(report.hierarchies["zip"].entries, 5);

    let (lines, criteria) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(lines, 11);
    assert_eq!(criteria, vec![PrivacyCriterion::KAnonymity { k: 2 }]);

    let anonymized = &outcome.relation;
    assert_eq!(anonymized.row_count(), 10);
    assert_eq!(report.rewritten, vec!["zip"]);
    assert_eq!(anonymized.attribute("zip"), Some(&Attribute::nominal("zip", ["*"])));

    let zip = anonymized.attribute_index("zip").unwrap();
    for (idx, attribute) in anonymized.attributes().iter().enumerate() {
        if idx == zip {
            continue;
        }
        assert_eq!(attribute, &relation.attributes()[idx]);
        assert!(anonymized
            .column_values(idx)
            .eq(relation.column_values(idx)));
    }
    assert!(anonymized.column_values(zip).all(|v| v == &Value::text("*")));
}

#[test]
fn test_end_to_end_with_hierarchy_file() {
    let dir = TempDir::new().unwrap();
    write_zip_hierarchy(&dir);

    let relation = patients();
    let flash = Flash::new(FixedLevelEngine::new().with_level("zip", 2).with_level("age", 1))
        .with_config(config(&dir));

    let outcome = flash.process(&relation).expect("Anonymization failed");

    assert!(matches!(
        outcome.report.hierarchies["zip"].source,
        HierarchySource::File { .. }
    ));
    assert_eq!(outcome.report.hierarchies["zip"].levels, 3);
    assert_eq!(outcome.report.levels["zip"], 2);
    assert_eq!(outcome.report.levels["age"], 1);
    assert_eq!(
        outcome.relation.attribute("zip"),
        Some(&Attribute::nominal("zip", ["130**", "148**"]))
    );
    assert_eq!(outcome.relation.get(3, 1), Some(&Value::text("148**")));
    assert_eq!(outcome.report.engine, "fixed-level");
}

#[test]
fn test_round_trip_through_writer() {
    let dir = TempDir::new().unwrap();
    let flash = Flash::new(StubEngine::new(&[("zip", 1)])).with_config(config(&dir));
    let outcome = flash.process(&patients()).unwrap();

    let out = dir.path().join("patients_anon.csv");
    RelationWriter::new(b',').write_file(&outcome.relation, &out).unwrap();

    let (reread, source) = RelationReader::new().read_file(&out).unwrap();
    assert_eq!(source.row_count, 10);
    assert_eq!(reread.name, "patients_anon");
    assert_eq!(reread.attribute_names(), vec!["age", "zip", "name", "disease"]);
    assert_eq!(reread.get(0, 1), Some(&Value::text("*")));
    assert_eq!(reread.get(0, 0), Some(&Value::Numeric(29.0)));
}

#[test]
fn test_leading_zero_codes_match_hierarchy_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("cambridge_hierarchy_zip.csv"),
        "02138;0213*;*\n02139;0213*;*\n",
    )
    .unwrap();

    let data = "zip,disease\n02138,flu\n02139,cancer\n";
    let relation = RelationReader::new()
        .read_bytes(data.as_bytes(), b',', "cambridge")
        .unwrap();
    let config = config(&dir).with_quasi_identifiers("zip");

    let outcome = Flash::new(StubEngine::new(&[("zip", 0)]))
        .with_config(config.clone())
        .process(&relation)
        .unwrap();
    assert_eq!(outcome.relation, relation);

    let mut buffer = Vec::new();
    RelationWriter::default().write(&outcome.relation, &mut buffer).unwrap();
    assert_eq!(String::from_utf8(buffer).unwrap(), data);

    let outcome = Flash::new(StubEngine::new(&[("zip", 1)]))
        .with_config(config)
        .process(&relation)
        .unwrap();
    assert_eq!(
        outcome.relation.attribute("zip"),
        Some(&Attribute::nominal("zip", ["0213*"]))
    );
}

#[test]
fn test_default_quasi_identifiers_are_non_sensitive_attributes() {
    let dir = TempDir::new().unwrap();
    let engine = StubEngine::new(&[("zip", 1)]);
    let seen = Arc::clone(&engine.seen);
    let flash = Flash::new(engine).with_config(
        FlashConfig::new()
            .with_hierarchy_dir(dir.path())
            .with_sensitive("disease"),
    );

    let outcome = flash.process(&patients()).unwrap();
    let partition = &outcome.report.partition;

    assert_eq!(partition.quasi_identifiers, vec!["age", "zip", "name"]);
    assert_eq!(partition.sensitive, vec!["disease"]);
    assert!(partition.insensitive.is_empty());
    assert_eq!(outcome.report.levels.len(), 3);
    assert_eq!(outcome.report.rewritten, vec!["zip"]);
    assert_eq!(seen.lock().unwrap().as_ref().map(|(lines, _)| *lines), Some(11));
}

#[test]
fn test_missing_values_are_generalized() {
    let dir = TempDir::new().unwrap();
    let relation = RelationReader::new()
        .read_bytes(
            b"age,zip,disease\n29,13053,flu\n31,?,flu\n40,13068,cancer\n",
            b',',
            "visits",
        )
        .unwrap();

    let flash = Flash::new(StubEngine::new(&[("zip", 1)])).with_config(config(&dir));
    let outcome = flash.process(&relation).unwrap();

    assert_eq!(outcome.relation.get(1, 1), Some(&Value::text("*")));
    assert_eq!(outcome.report.hierarchies["zip"].entries, 3);
}

// =============================================================================
// Validation and short-circuit
// =============================================================================

#[test]
fn test_parameter_order_fails_before_engine() {
    let dir = TempDir::new().unwrap();
    let engine = StubEngine::new(&[]);
    let calls = Arc::clone(&engine.calls);

    let flash = Flash::new(engine).with_config(
        config(&dir)
            .with_k(Some(5))
            .with_l(Some(8), LDiversityVariant::Distinct),
    );

    let err = flash.process(&patients()).unwrap_err();
    assert!(matches!(err, FlashError::ParameterOrder { l: 8, k: 5 }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unknown_quasi_identifier() {
    let dir = TempDir::new().unwrap();
    let flash = Flash::new(StubEngine::new(&[]))
        .with_config(config(&dir).with_quasi_identifiers("age,postcode"));

    match flash.process(&patients()) {
        Err(FlashError::UnknownAttribute(name)) => assert_eq!(name, "postcode"),
        other => panic!("expected UnknownAttribute, got {:?}", other.map(|o| o.report)),
    }
}

#[test]
fn test_single_row_passes_through() {
    let dir = TempDir::new().unwrap();
    let engine = StubEngine::new(&[("zip", 1)]);
    let calls = Arc::clone(&engine.calls);
    let flash = Flash::new(engine).with_config(config(&dir));

    let relation = RelationReader::new()
        .read_bytes(b"age,zip,disease\n29,13053,flu\n", b',', "one")
        .unwrap();
    let outcome = flash.process(&relation).unwrap();

    assert!(outcome.report.skipped);
    assert_eq!(outcome.relation, relation);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_small_relation_still_validated() {
    let dir = TempDir::new().unwrap();
    let flash = Flash::new(StubEngine::new(&[])).with_config(config(&dir).with_k(None));

    let relation = RelationReader::new()
        .read_bytes(b"age,zip\n29,13053\n", b',', "one")
        .unwrap();
    assert!(matches!(flash.process(&relation), Err(FlashError::NoCriterion)));
}

#[test]
fn test_engine_error_is_propagated() {
    let dir = TempDir::new().unwrap();
    let flash = Flash::new(FailingEngine).with_config(config(&dir));

    match flash.process(&patients()) {
        Err(FlashError::Engine { engine, source }) => {
            assert_eq!(engine, "failing");
            assert_eq!(source.to_string(), "no solution found");
        }
        other => panic!("expected Engine error, got {:?}", other.map(|o| o.report)),
    }
}

#[test]
fn test_fixed_engine_suppresses_within_budget() {
    let dir = TempDir::new().unwrap();
    write_zip_hierarchy(&dir);
    // At level 1 the 1305* and 1306* classes hold three rows each
    let flash = Flash::new(FixedLevelEngine::new().with_level("zip", 1)).with_config(
        config(&dir)
            .with_quasi_identifiers("zip")
            .with_k(Some(4))
            .with_max_outliers(0.65),
    );

    let outcome = flash.process(&patients()).unwrap();
    assert_eq!(outcome.report.suppressed_rows, 6);
    assert_eq!(outcome.report.rewritten, vec!["zip"]);
    assert_eq!(
        outcome.relation.attribute("zip"),
        Some(&Attribute::nominal("zip", ["*", "1485*"]))
    );
    assert_eq!(outcome.relation.get(0, 1), Some(&Value::text("*")));
    assert_eq!(outcome.relation.get(3, 1), Some(&Value::text("1485*")));
    assert_eq!(outcome.relation.get(3, 0), Some(&Value::Numeric(43.0)));
}

#[test]
fn test_fixed_engine_over_budget_fails() {
    let dir = TempDir::new().unwrap();
    write_zip_hierarchy(&dir);
    let flash = Flash::new(FixedLevelEngine::new().with_level("zip", 1)).with_config(
        config(&dir)
            .with_quasi_identifiers("zip")
            .with_k(Some(4))
            .with_max_outliers(0.5),
    );

    assert!(matches!(
        flash.process(&patients()),
        Err(FlashError::Engine { .. })
    ));
}

#[test]
fn test_report_serializes() {
    let dir = TempDir::new().unwrap();
    let flash = Flash::new(StubEngine::new(&[("zip", 1)])).with_config(config(&dir));
    let outcome = flash.process(&patients()).unwrap();

    let json = serde_json::to_value(&outcome.report).unwrap();
    assert_eq!(json["relation"], "patients");
    assert_eq!(json["levels"]["zip"], 1);
    assert_eq!(json["criteria"][0], "2-anonymity");
}
