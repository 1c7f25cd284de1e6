//! Integration tests for training, persisting and serving the price pipeline.
//!
//! Each test writes a synthetic listings CSV into a temporary directory and
//! drives the public API the way the `carprice` binary does.

use carprice_learning::{
    BoostingConfig, LearningError, PipelineStage, PriceInput, Predictor, ProgressUpdate,
    TrainedPipeline, Trainer, TrainingConfig,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Listings with the real dataset's shape: identifiers and high-cardinality
/// columns that get dropped, plus the columns a model trains on.
fn synthetic_listings(n: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let conditions = ["excellent", "good", "fair", "like new"];
    let fuels = ["gas", "diesel", "hybrid"];
    let transmissions = ["automatic", "manual"];
    let drives = ["fwd", "rwd", "4wd"];
    let states = ["ca", "tx", "ny", "fl"];

    let mut id = Vec::with_capacity(n);
    let mut url = Vec::with_capacity(n);
    let mut region = Vec::with_capacity(n);
    let mut price = Vec::with_capacity(n);
    let mut year = Vec::with_capacity(n);
    let mut odometer = Vec::with_capacity(n);
    let mut condition = Vec::with_capacity(n);
    let mut fuel = Vec::with_capacity(n);
    let mut transmission = Vec::with_capacity(n);
    let mut drive = Vec::with_capacity(n);
    let mut state = Vec::with_capacity(n);

    for i in 0..n {
        id.push(7_000_000 + i as i64);
        url.push(format!("https://example.org/listing/{}", i));
        region.push(format!("region-{}", rng.gen_range(0..200)));
        // 1% placeholder prices the capping stage has to absorb.
        if i % 100 == 0 {
            price.push(999_999.0);
        } else {
            price.push(rng.gen_range(5_000.0..50_000.0));
        }
        year.push(rng.gen_range(2000..=2024_i64));
        odometer.push(rng.gen_range(0.0..250_000.0));
        condition.push(conditions[rng.gen_range(0..conditions.len())]);
        fuel.push(fuels[rng.gen_range(0..fuels.len())]);
        transmission.push(transmissions[rng.gen_range(0..transmissions.len())]);
        drive.push(drives[rng.gen_range(0..drives.len())]);
        state.push(states[rng.gen_range(0..states.len())]);
    }

    df![
        "id" => id,
        "url" => url,
        "region" => region,
        "price" => price,
        "year" => year,
        "odometer" => odometer,
        "condition" => condition,
        "fuel" => fuel,
        "transmission" => transmission,
        "drive" => drive,
        "state" => state,
    ]
    .unwrap()
}

/// Raw listings with `vehicle_age` added, the way preparation derives it.
fn query_listings(n: usize, seed: u64) -> DataFrame {
    synthetic_listings(n, seed)
        .lazy()
        .with_column(
            (lit(2024_i64) - col("year"))
                .cast(DataType::Float64)
                .alias("vehicle_age"),
        )
        .collect()
        .unwrap()
}

fn write_csv(dir: &Path, name: &str, mut df: DataFrame) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}

fn config_for(data: &Path, artifact: &Path, n_threads: Option<usize>) -> TrainingConfig {
    TrainingConfig::builder()
        .data_path(data)
        .artifact_path(artifact)
        .boosting(BoostingConfig {
            n_estimators: 30,
            n_threads,
            ..BoostingConfig::default()
        })
        .build()
        .unwrap()
}

fn reference_vehicle() -> PriceInput {
    PriceInput {
        odometer: Some(100_000.0),
        condition: Some("good".to_string()),
        fuel: Some("gas".to_string()),
        transmission: Some("automatic".to_string()),
        drive: Some("fwd".to_string()),
        state: Some("ca".to_string()),
        vehicle_age: Some(10.0),
    }
}

struct Workspace {
    dir: TempDir,
    data: PathBuf,
}

impl Workspace {
    fn new(rows: usize) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data = write_csv(dir.path(), "vehicles.csv", synthetic_listings(rows, 42));
        Self { dir, data }
    }

    fn artifact(&self, name: &str) -> PathBuf {
        self.dir.path().join("saved_pipeline").join(name)
    }
}

// ============================================================================
// End-to-End Training
// ============================================================================

#[test]
fn test_train_save_load_predict() {
    let ws = Workspace::new(1000);
    let artifact = ws.artifact("price_prediction_pipeline.json");

    let result = Trainer::builder()
        .config(config_for(&ws.data, &artifact, None))
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(result.metrics.r2.is_finite());
    assert!(result.metrics.rmse.is_finite() && result.metrics.rmse >= 0.0);
    assert_eq!(result.train_rows + result.test_rows, 1000);
    assert_eq!(result.test_rows, 200);
    assert_eq!(
        result.artifact_path.as_deref(),
        Some(artifact.display().to_string().as_str())
    );
    assert_eq!(
        result.feature_names_in,
        vec![
            "odometer",
            "condition",
            "fuel",
            "transmission",
            "drive",
            "state",
            "vehicle_age"
        ]
    );
    assert!(artifact.is_file());

    let pipeline = TrainedPipeline::load(&artifact).unwrap();
    assert_eq!(pipeline.feature_names_in(), result.feature_names_in.as_slice());
    assert!(!pipeline.expects("year"));
    assert!(!pipeline.expects("price"));
    assert!(!pipeline.expects("region"));

    let predictor = Predictor::from_path(&artifact);
    assert!(predictor.is_available());
    let price = predictor.predict(&reference_vehicle()).unwrap();
    assert!(price.is_finite() && price > 0.0, "got {}", price);

    let via_record = pipeline
        .record()
        .set("odometer", 100_000.0)
        .set("condition", "good")
        .set("fuel", "gas")
        .set("transmission", "automatic")
        .set("drive", "fwd")
        .set("state", "ca")
        .set("vehicle_age", 10.0)
        .predict()
        .unwrap();
    assert_eq!(price, via_record);
}

#[test]
fn test_capping_bounds_predictions_below_placeholder_prices() {
    let ws = Workspace::new(1000);
    let artifact = ws.artifact("pipeline.json");

    let (pipeline, result) = Trainer::builder()
        .config(config_for(&ws.data, &artifact, None))
        .build()
        .unwrap()
        .train(synthetic_listings(1000, 42))
        .unwrap();

    let price_cap = result
        .preparation
        .caps
        .iter()
        .find(|c| c.column == "price")
        .expect("price is capped");
    assert!(price_cap.cap_value < 999_999.0);

    let queries = query_listings(50, 7);
    let predictions = pipeline.predict(&queries).unwrap();
    assert_eq!(predictions.len(), 50);
    assert!(predictions.iter().all(|p| p.is_finite() && *p < 100_000.0));
}

#[test]
fn test_batch_prediction_appends_column() {
    let ws = Workspace::new(400);
    let artifact = ws.artifact("pipeline.json");
    let (pipeline, _) = Trainer::builder()
        .config(config_for(&ws.data, &artifact, None))
        .build()
        .unwrap()
        .train(synthetic_listings(400, 1))
        .unwrap();

    let queries = query_listings(10, 99);
    let out = pipeline.predict_batch(&queries).unwrap();
    assert_eq!(out.height(), 10);
    assert_eq!(out.width(), queries.width() + 1);
    assert!(out.column("prediction").is_ok());
}

#[test]
fn test_progress_reaches_complete() {
    let ws = Workspace::new(300);
    let artifact = ws.artifact("pipeline.json");
    let updates: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);

    Trainer::builder()
        .config(config_for(&ws.data, &artifact, None))
        .on_progress(move |u| sink.lock().unwrap().push(u))
        .build()
        .unwrap()
        .run()
        .unwrap();

    let updates = updates.lock().unwrap();
    assert!(!updates.is_empty());
    assert!(
        updates
            .windows(2)
            .all(|w| w[0].progress <= w[1].progress)
    );
    assert_eq!(updates.last().unwrap().stage, PipelineStage::Complete);
    assert!(updates.iter().any(|u| u.stage == PipelineStage::Training));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_repeat_runs_predict_identically() {
    let ws = Workspace::new(600);
    let first = ws.artifact("first.json");
    let second = ws.artifact("second.json");

    for artifact in [&first, &second] {
        Trainer::builder()
            .config(config_for(&ws.data, artifact, Some(2)))
            .build()
            .unwrap()
            .run()
            .unwrap();
    }

    let first = TrainedPipeline::load(&first).unwrap();
    let second = TrainedPipeline::load(&second).unwrap();
    assert_eq!(first.transformer(), second.transformer());

    let queries = query_listings(100, 3);
    let a = first.predict(&queries).unwrap();
    let b = second.predict(&queries).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_single_thread_run_serves_same_inputs() {
    let ws = Workspace::new(400);
    let artifact = ws.artifact("single.json");
    Trainer::builder()
        .config(config_for(&ws.data, &artifact, Some(1)))
        .build()
        .unwrap()
        .run()
        .unwrap();

    let pipeline = TrainedPipeline::load(&artifact).unwrap();
    assert_eq!(pipeline.metadata().boosting.n_threads, Some(1));
    let price = Predictor::from_pipeline(pipeline)
        .predict(&reference_vehicle())
        .unwrap();
    assert!(price.is_finite() && price > 0.0);
}

// ============================================================================
// Failure Handling
// ============================================================================

#[test]
fn test_missing_data_file_writes_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("saved_pipeline/pipeline.json");

    let err = Trainer::builder()
        .config(config_for(&dir.path().join("absent.csv"), &artifact, None))
        .build()
        .unwrap()
        .run()
        .unwrap_err();

    assert!(matches!(err, LearningError::Preparation(_)));
    assert!(!artifact.exists());
}

#[test]
fn test_missing_target_writes_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let df = synthetic_listings(100, 5).drop("price").unwrap();
    let data = write_csv(dir.path(), "no_price.csv", df);
    let artifact = dir.path().join("pipeline.json");

    let result = Trainer::builder()
        .config(config_for(&data, &artifact, None))
        .build()
        .unwrap()
        .run();

    assert!(result.is_err());
    assert!(!artifact.exists());
}

#[test]
fn test_retraining_failure_keeps_previous_artifact() {
    let ws = Workspace::new(300);
    let artifact = ws.artifact("pipeline.json");
    Trainer::builder()
        .config(config_for(&ws.data, &artifact, None))
        .build()
        .unwrap()
        .run()
        .unwrap();
    let before = std::fs::read(&artifact).unwrap();

    let bad = write_csv(
        ws.dir.path(),
        "bad.csv",
        synthetic_listings(50, 9).drop("price").unwrap(),
    );
    assert!(
        Trainer::builder()
            .config(config_for(&bad, &artifact, None))
            .build()
            .unwrap()
            .run()
            .is_err()
    );

    assert_eq!(std::fs::read(&artifact).unwrap(), before);
    assert!(TrainedPipeline::load(&artifact).is_ok());
}

// ============================================================================
// Artifact Rejection
// ============================================================================

fn trained_artifact_bytes() -> Vec<u8> {
    let ws = Workspace::new(200);
    let artifact = ws.artifact("pipeline.json");
    let (pipeline, _) = Trainer::builder()
        .config(config_for(&ws.data, &artifact, None))
        .build()
        .unwrap()
        .train(synthetic_listings(200, 11))
        .unwrap();
    pipeline.to_bytes().unwrap()
}

#[test]
fn test_truncated_artifact_rejected() {
    let bytes = trained_artifact_bytes();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(matches!(
        TrainedPipeline::load(&path),
        Err(LearningError::Json(_))
    ));

    let predictor = Predictor::from_path(&path);
    assert!(!predictor.is_available());
    assert!(matches!(
        predictor.predict(&reference_vehicle()),
        Err(LearningError::ArtifactUnavailable(_))
    ));
}

#[test]
fn test_artifact_without_expected_columns_rejected() {
    let mut value: serde_json::Value = serde_json::from_slice(&trained_artifact_bytes()).unwrap();
    value["metadata"]["feature_names_in"] = serde_json::json!([]);
    let bytes = serde_json::to_vec(&value).unwrap();

    assert!(matches!(
        TrainedPipeline::from_bytes(&bytes),
        Err(LearningError::Artifact(_))
    ));
}

#[test]
fn test_artifact_with_mismatched_columns_rejected() {
    let mut value: serde_json::Value = serde_json::from_slice(&trained_artifact_bytes()).unwrap();
    value["metadata"]["feature_names_in"][0] = serde_json::json!("mileage");
    let bytes = serde_json::to_vec(&value).unwrap();

    assert!(matches!(
        TrainedPipeline::from_bytes(&bytes),
        Err(LearningError::Artifact(_))
    ));
}

#[test]
fn test_predict_json_ignores_unknown_keys() {
    let pipeline = TrainedPipeline::from_bytes(&trained_artifact_bytes()).unwrap();
    let instance = serde_json::json!({
        "odometer": 100000,
        "condition": "good",
        "fuel": "gas",
        "transmission": "automatic",
        "drive": "fwd",
        "state": "ca",
        "vehicle_age": 10,
    });
    let mut with_extra = instance.clone();
    with_extra["paint_color"] = serde_json::json!("red");

    let plain = pipeline.predict_json(&instance).unwrap();
    let extra = pipeline.predict_json(&with_extra).unwrap();
    assert!(plain.is_finite());
    assert_eq!(plain, extra);
}
