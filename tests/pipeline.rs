mod common;

use loyers_ml::data::{write_observations, RawTable, Value};
use loyers_ml::models::metrics::EvaluationRecord;
use loyers_ml::models::selection::train_test_split;
use loyers_ml::models::{CandidateKind, ModelBundle};
use loyers_ml::{pipeline, PipelineError};

use common::{available_candidates, config_in, synthetic_observations};

#[test]
fn training_on_ten_rows_produces_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_observations(&config.paths.clean_file, &synthetic_observations()).unwrap();

    let outcome = pipeline::train(&config).unwrap();

    let mut reader = csv::Reader::from_path(config.paths.results_file()).unwrap();
    let records: Vec<EvaluationRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), available_candidates().len());
    for (record, kind) in records.iter().zip(available_candidates()) {
        assert_eq!(record.model, kind.name());
        assert!(record.r2 <= 1.0);
        assert!(record.mae >= 0.0 && record.rmse >= 0.0);
        assert!(config.paths.model_dir.join(format!("{}.bin", kind.name())).exists());
    }

    let best = ModelBundle::load(&config.paths.best_model_file()).unwrap();
    assert_eq!(best.model.kind(), outcome.best().kind);
    let best_r2 = outcome.best().metrics.r2;
    assert!(records.iter().all(|r| r.r2 <= best_r2));
}

#[test]
fn selection_is_reproducible_for_a_fixed_seed() {
    let observations = synthetic_observations();
    assert_eq!(train_test_split(10, 0.2, 42).unwrap(), train_test_split(10, 0.2, 42).unwrap());

    let run = || {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_observations(&config.paths.clean_file, &observations).unwrap();
        let outcome = pipeline::train(&config).unwrap();
        (outcome.best().kind, outcome.records())
    };

    let (first_best, first_records) = run();
    let (second_best, second_records) = run();
    assert_eq!(first_best, second_best);
    assert_eq!(first_records, second_records);
}

#[test]
fn ties_keep_the_first_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.training.candidates = vec![CandidateKind::LinearRegression, CandidateKind::LinearRegression];
    write_observations(&config.paths.clean_file, &synthetic_observations()).unwrap();

    let outcome = pipeline::train(&config).unwrap();
    assert_eq!(outcome.candidates.len(), 2);
    assert!(std::ptr::eq(outcome.best(), &outcome.candidates[0]));
}

#[test]
fn missing_cleaned_file_aborts_training() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    assert!(matches!(pipeline::train(&config), Err(PipelineError::MissingSourceFile(_))));
    assert!(!config.paths.best_model_file().exists());
}

#[cfg(not(feature = "elasticnet"))]
#[test]
fn unavailable_backend_aborts_before_training() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.training.candidates = CandidateKind::ALL.to_vec();
    write_observations(&config.paths.clean_file, &synthetic_observations()).unwrap();

    let err = pipeline::train(&config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Model(loyers_ml::ModelError::BackendUnavailable { candidate: "lasso", .. })
    ));
    assert!(!config.paths.model_dir.join("linear_regression.bin").exists());
}

#[test]
fn scrub_reads_raw_source_columns() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let mut raw = RawTable::new(
        ["Loyer_Median", " Surface_Moyenne", "nombre_pieces_homogene", "agglomeration", "epoque_construction_homogene"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
    );
    let text = |s: &str| Value::Text(s.to_string());
    raw.push_row(vec![Value::Number(900.0), Value::Number(45.0), text("2P"), text("Paris"), text("1991 à 2005")]);
    raw.push_row(vec![Value::Number(3.0), Value::Number(45.0), text("2P"), text("Paris"), text("Avant 1946")]);
    raw.push_row(vec![Value::Number(700.0), Value::Number(35.0), text("T1"), text("Lyon"), text("Après 2005")]);
    raw.push_row(vec![Value::Number(650.0), Value::Number(40.0), text("1P"), text("Lyon"), text("inconnue")]);
    raw.write_csv(&config.paths.raw_file).unwrap();

    let observations = pipeline::scrub(&config).unwrap();
    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0].price_per_area, 20.0);
    assert_eq!(observations[0].era.map(|e| e.label()), Some("4. Entre 1991-2005"));

    let header = std::fs::read_to_string(&config.paths.clean_file).unwrap();
    assert!(header.starts_with(
        "loyer,surface,nombre_pieces,nombre_observations,nombre_logements,agglomeration,\
         zone_complementaire,type_habitat,epoque_construction_homogene,loyer_m2"
    ));
}
