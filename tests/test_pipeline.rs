//! Integration test: Full pipeline (clean → train → slice scoring → predict)

mod common;

use census_pipeline::artifacts::ArtifactStore;
use census_pipeline::inference::{CensusRecord, Predictor};
use census_pipeline::pipeline::{execute, run_cleaning, run_inference, run_training, Action};
use census_pipeline::schema::{CATEGORICAL_FEATURES, LABEL_COLUMN, MISSING_MARKER, WEAK_COLUMNS};
use census_pipeline::utils::DataLoader;
use census_pipeline::PipelineError;

fn record(value: serde_json::Value) -> CensusRecord {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_cleaning_drops_markers_and_weak_columns() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::seeded_workspace(dir.path());

    let clean = run_cleaning(&config).unwrap();
    assert_eq!(clean.height(), common::N_ROWS);
    for column in WEAK_COLUMNS {
        assert!(clean.column(column).is_err(), "{} should be dropped", column);
    }

    let reloaded = DataLoader::new().load_csv(&config.clean_data).unwrap();
    assert_eq!(reloaded.shape(), clean.shape());
    let workclass = reloaded.column("workclass").unwrap().as_materialized_series().clone();
    assert!(workclass
        .str()
        .unwrap()
        .into_iter()
        .all(|v| v.is_some() && v != Some(MISSING_MARKER)));
    assert!(reloaded.column(LABEL_COLUMN).is_ok());
}

#[test]
fn test_combo_writes_artifacts_and_slice_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::seeded_workspace(dir.path());

    execute(Action::Combo, &config).unwrap();

    assert!(ArtifactStore::new(&config.model_dir).exists());

    let report = std::fs::read_to_string(&config.slice_report).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert!(!lines.is_empty());
    for line in &lines {
        let column = line
            .strip_prefix('[')
            .and_then(|rest| rest.split(" - ").next())
            .unwrap();
        assert!(CATEGORICAL_FEATURES.contains(&column), "bad slice line: {}", line);
        assert!(line.contains("], Accuracy="), "bad slice line: {}", line);
        assert!(line.contains(", Recall="), "bad slice line: {}", line);
        assert!(line.contains(", Precision="), "bad slice line: {}", line);
    }
    assert!(lines.iter().any(|l| l.starts_with("[sex - Male], ")));
    assert!(lines.iter().any(|l| l.starts_with("[sex - Female], ")));

    let predictor = Predictor::from_store(&ArtifactStore::new(&config.model_dir)).unwrap();
    assert_eq!(predictor.model().n_trees(), 200);
    assert_eq!(
        predictor.predict_one(&record(common::high_income_record())).unwrap(),
        ">50K"
    );
    assert_eq!(
        predictor.predict_one(&record(common::low_income_record())).unwrap(),
        "<=50K"
    );
}

#[test]
fn test_retraining_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::seeded_workspace(dir.path()).with_trainer(common::quick_trainer());
    run_cleaning(&config).unwrap();

    let first = run_training(&config).unwrap();
    let first_slices = run_inference(&config).unwrap();
    let second = run_training(&config).unwrap();
    let second_slices = run_inference(&config).unwrap();

    assert_eq!(first.encoder, second.encoder);
    assert_eq!(first.binarizer, second.binarizer);
    assert_eq!(first_slices, second_slices);
}

#[test]
fn test_inference_without_artifacts_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::seeded_workspace(dir.path());
    run_cleaning(&config).unwrap();

    let err = run_inference(&config).unwrap_err();
    assert!(matches!(err, PipelineError::ArtifactLoad { .. }));
}

#[test]
fn test_predict_one_rejects_out_of_vocabulary_value() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::seeded_workspace(dir.path()).with_trainer(common::quick_trainer());
    run_cleaning(&config).unwrap();
    let predictor = Predictor::new(run_training(&config).unwrap());

    let mut value = common::high_income_record();
    value["native_country"] = serde_json::Value::from("Atlantis");

    let err = predictor.predict_one(&record(value)).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::SchemaViolation { ref field, ref value }
            if field == "native_country" && value == "Atlantis"
    ));
}
