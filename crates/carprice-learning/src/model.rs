//! Trained pipeline artifact for inference and persistence.
//!
//! This module provides [`TrainedPipeline`], the fitted column transformer
//! plus fitted regressor plus [`ArtifactMetadata`], and enables:
//!
//! - **Batch prediction** via [`predict()`](TrainedPipeline::predict) and
//!   [`predict_batch()`](TrainedPipeline::predict_batch)
//! - **Single-record prediction** via [`record()`](TrainedPipeline::record) and
//!   [`predict_json()`](TrainedPipeline::predict_json)
//! - **Serialization** via [`save()`](TrainedPipeline::save), [`load()`](TrainedPipeline::load),
//!   [`to_bytes()`](TrainedPipeline::to_bytes), and [`from_bytes()`](TrainedPipeline::from_bytes)
//! - **Introspection** via [`metadata()`](TrainedPipeline::metadata),
//!   [`feature_names_in()`](TrainedPipeline::feature_names_in) and [`info()`](TrainedPipeline::info)
//!
//! # Lifecycle
//!
//! A `TrainedPipeline` is created in one of two ways:
//!
//! 1. **From training**: [`Trainer::train()`](crate::Trainer::train) returns one
//! 2. **From disk**: [`TrainedPipeline::load()`] reads a previously saved artifact
//!
//! It is immutable afterwards and can serve any number of predictions.
//!
//! # Example
//!
//! ```rust,ignore
//! use carprice_learning::TrainedPipeline;
//!
//! let pipeline = TrainedPipeline::load("saved_pipeline/price_prediction_pipeline.json")?;
//! println!("expects {:?}", pipeline.feature_names_in());
//!
//! let price = pipeline
//!     .record()
//!     .set("odometer", 100_000.0)
//!     .set("condition", "good")
//!     .set("fuel", "gas")
//!     .set("vehicle_age", 10.0)
//!     .predict()?;
//! ```
//!
//! # Thread Safety
//!
//! `TrainedPipeline` is `Send + Sync`; share it behind an `Arc` for concurrent
//! prediction.
//!
//! # Format
//!
//! Artifacts are JSON. Loading validates the format version and checks that
//! the metadata, transformer and regressor agree with each other before the
//! pipeline is handed out.

use crate::config::BoostingConfig;
use crate::error::{LearningError, Result};
use crate::preprocessing::FittedColumnTransformer;
use crate::regressor::FittedGradientBoostedRegressor;
use crate::types::{Metrics, ModelInfo};
use carprice_processing::{ColumnRole, ColumnSchema};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Version of the on-disk artifact layout.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Name of the regressor algorithm recorded in [`ModelInfo`].
pub const MODEL_NAME: &str = "gradient_boosted_trees";

/// Everything needed to rebuild a compatible input record and audit the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub format_version: u32,

    /// Version of this crate that wrote the artifact.
    pub crate_version: String,

    pub trained_at: DateTime<Utc>,

    pub target_column: String,

    /// Year that `age_column` was measured from.
    pub reference_year: i32,

    pub age_column: String,

    /// Raw column the age was derived from; callers supply the age instead.
    pub year_column: String,

    /// Raw input columns in the order the transformer expects.
    pub feature_names_in: Vec<String>,

    /// Roles and exclusions decided after cleaning.
    pub schema: ColumnSchema,

    pub boosting: BoostingConfig,

    pub train_rows: usize,

    pub test_rows: usize,

    /// Held-out metrics.
    pub metrics: Metrics,
}

/// A fitted preprocessing + regression pipeline ready for inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedPipeline {
    metadata: ArtifactMetadata,
    transformer: FittedColumnTransformer,
    regressor: FittedGradientBoostedRegressor,
}

assert_impl_all!(TrainedPipeline: Send, Sync);

impl TrainedPipeline {
    /// Assemble a pipeline from fitted parts.
    ///
    /// # Errors
    ///
    /// [`LearningError::Artifact`] if the parts disagree.
    pub fn new(
        metadata: ArtifactMetadata,
        transformer: FittedColumnTransformer,
        regressor: FittedGradientBoostedRegressor,
    ) -> Result<Self> {
        let pipeline = Self {
            metadata,
            transformer,
            regressor,
        };
        pipeline.validate()?;
        Ok(pipeline)
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn transformer(&self) -> &FittedColumnTransformer {
        &self.transformer
    }

    pub fn regressor(&self) -> &FittedGradientBoostedRegressor {
        &self.regressor
    }

    /// Raw input columns this pipeline expects, in order.
    pub fn feature_names_in(&self) -> &[String] {
        self.transformer.feature_names_in()
    }

    /// Whether `column` is one of the expected input columns.
    pub fn expects(&self, column: &str) -> bool {
        self.transformer.role_of(column).is_some()
    }

    /// Non-zero importances per encoded feature, descending.
    pub fn feature_importance(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .transformer
            .feature_names_out()
            .into_iter()
            .zip(self.regressor.feature_importance().iter().copied())
            .filter(|(_, importance)| *importance > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_name: MODEL_NAME.to_string(),
            target_column: self.metadata.target_column.clone(),
            feature_names_in: self.feature_names_in().to_vec(),
            numeric_columns: self.metadata.schema.numeric_columns(),
            categorical_columns: self.metadata.schema.categorical_columns(),
            n_features_out: self.transformer.n_features_out(),
            n_trees: self.regressor.n_trees(),
            reference_year: self.metadata.reference_year,
            trained_at: self.metadata.trained_at.to_rfc3339(),
            metrics: self.metadata.metrics,
        }
    }

    /// Predict a price for every row of `df`.
    ///
    /// `df` must contain every expected input column; other columns are
    /// ignored. Nulls and unseen categories are tolerated.
    ///
    /// # Errors
    ///
    /// - [`LearningError::MissingColumn`] if an expected column is absent
    /// - [`LearningError::FeatureMismatch`] if the encoded width is wrong
    #[must_use = "returns the predictions; use them or handle the error"]
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<f64>> {
        let x = self.transformer.transform(df)?;
        if x.n_features() != self.regressor.n_features() {
            return Err(LearningError::FeatureMismatch {
                expected: self.regressor.n_features(),
                actual: x.n_features(),
            });
        }
        self.regressor.predict(&x)
    }

    /// Predict and return `df` with a `prediction` column appended.
    #[must_use = "returns DataFrame with predictions; use it or handle the error"]
    pub fn predict_batch(&self, df: &DataFrame) -> Result<DataFrame> {
        let predictions = self.predict(df)?;
        let mut out = df.clone();
        out.with_column(Series::new("prediction".into(), predictions))?;
        Ok(out)
    }

    /// Start a single-row record with every expected column unset (null).
    pub fn record(&self) -> RecordBuilder<'_> {
        RecordBuilder {
            pipeline: self,
            values: HashMap::new(),
            error: None,
        }
    }

    /// Predict one price from a JSON object of raw values.
    ///
    /// Keys the pipeline does not expect are logged at `warn` and ignored;
    /// expected keys that are absent are null.
    ///
    /// # Errors
    ///
    /// [`LearningError::InvalidData`] if `instance` is not an object or holds
    /// a value that is not a number, string, boolean or null.
    #[must_use = "returns the prediction; use it or handle the error"]
    pub fn predict_json(&self, instance: &serde_json::Value) -> Result<f64> {
        let object = instance.as_object().ok_or_else(|| {
            LearningError::InvalidData("prediction input must be a JSON object".to_string())
        })?;

        let mut record = self.record();
        for (key, value) in object {
            if !self.expects(key) {
                warn!("Ignoring input field '{}' that the pipeline does not expect", key);
                continue;
            }
            let value = match value {
                serde_json::Value::Null => RecordValue::Null,
                serde_json::Value::Number(n) => n.as_f64().map_or(RecordValue::Null, RecordValue::Number),
                serde_json::Value::String(s) => RecordValue::Text(s.clone()),
                serde_json::Value::Bool(b) => RecordValue::Text(b.to_string()),
                _ => {
                    return Err(LearningError::InvalidData(format!(
                        "field '{}' must be a number, string or null",
                        key
                    )));
                }
            };
            record = record.set(key.as_str(), value);
        }
        record.predict()
    }

    /// Write the artifact to `path` atomically.
    ///
    /// The JSON is written to a temporary sibling file and renamed over
    /// `path`, so readers never see a partial artifact and a failed save
    /// leaves nothing behind. Parent directories are created as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = temp_path(path);
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
            // Best effort; the write error is the one worth reporting
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!("Saved pipeline to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Load and validate an artifact written by [`save()`](Self::save).
    ///
    /// # Errors
    ///
    /// - [`LearningError::ArtifactNotFound`] if the file does not exist
    /// - [`LearningError::Json`] if the file is not a well-formed artifact
    /// - [`LearningError::Artifact`] if its parts are inconsistent
    #[must_use = "returns the loaded pipeline; use it or handle the error"]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LearningError::ArtifactNotFound {
                path: path.display().to_string(),
            });
        }

        let bytes = fs::read(path)?;
        let pipeline = Self::from_bytes(&bytes)?;
        debug!(
            "Loaded pipeline from {} ({} input columns, {} trees)",
            path.display(),
            pipeline.feature_names_in().len(),
            pipeline.regressor.n_trees()
        );
        Ok(pipeline)
    }

    #[must_use = "returns serialized artifact bytes; use them or handle the error"]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    #[must_use = "returns the decoded pipeline; use it or handle the error"]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let pipeline: Self = serde_json::from_slice(bytes)?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    fn validate(&self) -> Result<()> {
        let meta = &self.metadata;
        if meta.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(LearningError::Artifact(format!(
                "unsupported format version {} (expected {})",
                meta.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if meta.feature_names_in.is_empty() {
            return Err(LearningError::Artifact(
                "metadata lists no expected input columns".to_string(),
            ));
        }

        self.transformer.validate()?;
        if self.transformer.feature_names_in() != meta.feature_names_in.as_slice() {
            return Err(LearningError::Artifact(
                "transformer input columns do not match the metadata".to_string(),
            ));
        }
        if meta.schema.feature_columns() != meta.feature_names_in {
            return Err(LearningError::Artifact(
                "schema feature columns do not match the metadata".to_string(),
            ));
        }
        for column in &meta.feature_names_in {
            if meta.schema.role_of(column) != self.transformer.role_of(column) {
                return Err(LearningError::Artifact(format!(
                    "column '{}' has a different role in the schema and the transformer",
                    column
                )));
            }
        }

        self.regressor.validate()?;
        if self.regressor.n_features() != self.transformer.n_features_out() {
            return Err(LearningError::Artifact(format!(
                "regressor expects {} features but the transformer produces {}",
                self.regressor.n_features(),
                self.transformer.n_features_out()
            )));
        }
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{}.tmp-{}", name, std::process::id()))
}

/// A raw value for one input column.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Number(f64),
    Text(String),
    Null,
}

impl From<f64> for RecordValue {
    fn from(v: f64) -> Self {
        RecordValue::Number(v)
    }
}

impl From<i32> for RecordValue {
    fn from(v: i32) -> Self {
        RecordValue::Number(v as f64)
    }
}

impl From<i64> for RecordValue {
    fn from(v: i64) -> Self {
        RecordValue::Number(v as f64)
    }
}

impl From<&str> for RecordValue {
    fn from(v: &str) -> Self {
        RecordValue::Text(v.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(v: String) -> Self {
        RecordValue::Text(v)
    }
}

impl<T: Into<RecordValue>> From<Option<T>> for RecordValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(RecordValue::Null, Into::into)
    }
}

/// Builds a one-row input table with exactly the expected columns.
///
/// Created by [`TrainedPipeline::record()`]. Columns never set are null.
/// Setting a column the pipeline does not expect fails at
/// [`build()`](Self::build) with [`LearningError::UnexpectedColumn`].
#[derive(Debug)]
pub struct RecordBuilder<'a> {
    pipeline: &'a TrainedPipeline,
    values: HashMap<String, RecordValue>,
    error: Option<LearningError>,
}

impl RecordBuilder<'_> {
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<RecordValue>) -> Self {
        let column = column.into();
        if !self.pipeline.expects(&column) {
            if self.error.is_none() {
                self.error = Some(LearningError::UnexpectedColumn(column));
            }
            return self;
        }
        self.values.insert(column, value.into());
        self
    }

    /// Assemble the record in the pipeline's column order.
    ///
    /// Numeric columns are `Float64` (text that does not parse becomes null);
    /// categorical columns are `String` (numbers are rendered as text).
    pub fn build(self) -> Result<DataFrame> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let transformer = self.pipeline.transformer();
        let mut columns = Vec::with_capacity(transformer.feature_names_in().len());
        for name in transformer.feature_names_in() {
            let value = self.values.get(name).unwrap_or(&RecordValue::Null);
            let series = match transformer.role_of(name) {
                Some(ColumnRole::Numeric) => {
                    let v = match value {
                        RecordValue::Number(n) => Some(*n),
                        RecordValue::Text(s) => s.trim().parse::<f64>().ok(),
                        RecordValue::Null => None,
                    };
                    Series::new(name.as_str().into(), [v])
                }
                Some(ColumnRole::Categorical) => {
                    let v = match value {
                        RecordValue::Number(n) => Some(n.to_string()),
                        RecordValue::Text(s) => Some(s.clone()),
                        RecordValue::Null => None,
                    };
                    Series::new(name.as_str().into(), [v])
                }
                None => return Err(LearningError::MissingColumn(name.clone())),
            };
            columns.push(series.into());
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Build the record and predict its price.
    pub fn predict(self) -> Result<f64> {
        let pipeline = self.pipeline;
        let record = self.build()?;
        pipeline
            .predict(&record)?
            .into_iter()
            .next()
            .ok_or_else(|| LearningError::InvalidData("record produced no prediction".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::ColumnTransformer;
    use crate::regressor::GradientBoostedRegressor;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn training_frame() -> DataFrame {
        df![
            "price" => [9_000.0, 15_000.0, 4_000.0, 22_000.0, 12_000.0, 7_500.0, 18_000.0, 5_000.0],
            "odometer" => [Some(90_000.0), Some(40_000.0), Some(150_000.0), Some(10_000.0), None, Some(110_000.0), Some(30_000.0), Some(160_000.0)],
            "condition" => [Some("good"), Some("excellent"), Some("fair"), Some("like new"), Some("good"), None, Some("excellent"), Some("fair")],
            "fuel" => ["gas", "gas", "diesel", "gas", "hybrid", "gas", "diesel", "gas"],
            "vehicle_age" => [8.0, 4.0, 15.0, 1.0, 6.0, 10.0, 3.0, 18.0],
        ]
        .unwrap()
    }

    fn fitted_pipeline() -> TrainedPipeline {
        let df = training_frame();
        let schema = ColumnSchema::infer(&df, "price").unwrap();
        let features = df.drop("price").unwrap();
        let y: Vec<f64> = df
            .column("price")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();

        let transformer = ColumnTransformer::from_schema(&schema)
            .unwrap()
            .fit(&features)
            .unwrap();
        let x = transformer.transform(&features).unwrap();
        let boosting = BoostingConfig {
            n_estimators: 10,
            ..BoostingConfig::default()
        };
        let regressor = GradientBoostedRegressor::new(boosting.clone())
            .unwrap()
            .fit(&x, &y)
            .unwrap();

        let metadata = ArtifactMetadata {
            format_version: ARTIFACT_FORMAT_VERSION,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            trained_at: Utc::now(),
            target_column: "price".to_string(),
            reference_year: 2024,
            age_column: "vehicle_age".to_string(),
            year_column: "year".to_string(),
            feature_names_in: transformer.feature_names_in().to_vec(),
            schema,
            boosting,
            train_rows: 8,
            test_rows: 0,
            metrics: Metrics::default(),
        };
        TrainedPipeline::new(metadata, transformer, regressor).unwrap()
    }

    // ========================================================================
    // Prediction
    // ========================================================================

    #[test]
    fn test_feature_names_in() {
        let pipeline = fitted_pipeline();
        assert_eq!(
            pipeline.feature_names_in(),
            &["odometer", "condition", "fuel", "vehicle_age"]
        );
    }

    #[test]
    fn test_predict_ignores_extra_columns() {
        let pipeline = fitted_pipeline();
        let df = training_frame();
        let with_target = pipeline.predict(&df).unwrap();
        let without = pipeline.predict(&df.drop("price").unwrap()).unwrap();
        assert_eq!(with_target, without);
        assert_eq!(with_target.len(), 8);
        assert!(with_target.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_predict_batch_appends_column() {
        let pipeline = fitted_pipeline();
        let out = pipeline.predict_batch(&training_frame()).unwrap();
        assert_eq!(out.width(), 6);
        assert!(out.column("prediction").is_ok());
    }

    #[test]
    fn test_predict_missing_column() {
        let pipeline = fitted_pipeline();
        let df = training_frame().drop("fuel").unwrap();
        assert!(matches!(
            pipeline.predict(&df),
            Err(LearningError::MissingColumn(ref c)) if c == "fuel"
        ));
    }

    // ========================================================================
    // Records
    // ========================================================================

    #[test]
    fn test_record_has_all_expected_columns() {
        let pipeline = fitted_pipeline();
        let record = pipeline.record().set("fuel", "gas").build().unwrap();

        assert_eq!(record.height(), 1);
        let names: Vec<String> = record
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, pipeline.feature_names_in());
        assert_eq!(record.column("odometer").unwrap().dtype(), &DataType::Float64);
        assert_eq!(record.column("condition").unwrap().dtype(), &DataType::String);
        assert_eq!(record.column("odometer").unwrap().null_count(), 1);
    }

    #[test]
    fn test_record_unexpected_column() {
        let pipeline = fitted_pipeline();
        let err = pipeline
            .record()
            .set("paint_color", "red")
            .set("fuel", "gas")
            .build()
            .unwrap_err();
        assert!(matches!(err, LearningError::UnexpectedColumn(ref c) if c == "paint_color"));
    }

    #[test]
    fn test_record_tolerates_unseen_and_null() {
        let pipeline = fitted_pipeline();
        let price = pipeline
            .record()
            .set("odometer", 100_000.0)
            .set("condition", "salvage")
            .set("fuel", None::<&str>)
            .set("vehicle_age", 10)
            .predict()
            .unwrap();
        assert!(price.is_finite());
    }

    #[test]
    fn test_predict_json_matches_record() {
        let pipeline = fitted_pipeline();
        let from_json = pipeline
            .predict_json(&json!({
                "odometer": 40000,
                "condition": "excellent",
                "fuel": "gas",
                "vehicle_age": 4,
                "paint_color": "blue"
            }))
            .unwrap();
        let from_record = pipeline
            .record()
            .set("odometer", 40_000.0)
            .set("condition", "excellent")
            .set("fuel", "gas")
            .set("vehicle_age", 4.0)
            .predict()
            .unwrap();
        assert_eq!(from_json, from_record);
    }

    #[test]
    fn test_predict_json_rejects_non_object() {
        let pipeline = fitted_pipeline();
        assert!(matches!(
            pipeline.predict_json(&json!([1, 2])),
            Err(LearningError::InvalidData(_))
        ));
        assert!(pipeline.predict_json(&json!({"fuel": ["gas"]})).is_err());
    }

    #[test]
    fn test_feature_importance_sorted() {
        let pipeline = fitted_pipeline();
        let ranked = pipeline.feature_importance();
        assert!(!ranked.is_empty());
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
        assert!((ranked.iter().map(|(_, v)| v).sum::<f64>() - 1.0).abs() < 1e-9);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pipeline.json");
        let pipeline = fitted_pipeline();

        pipeline.save(&path).unwrap();
        let loaded = TrainedPipeline::load(&path).unwrap();
        assert_eq!(loaded, pipeline);
        assert_eq!(
            loaded.predict(&training_frame()).unwrap(),
            pipeline.predict(&training_frame()).unwrap()
        );

        // Only the artifact remains in the directory
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_save_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();
        let path = blocker.join("pipeline.json");

        assert!(fitted_pipeline().save(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let err = TrainedPipeline::load("/nonexistent/pipeline.json").unwrap_err();
        assert!(matches!(err, LearningError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_from_bytes_rejects_corrupt_json() {
        let err = TrainedPipeline::from_bytes(b"{\"metadata\": 1").unwrap_err();
        assert_eq!(err.kind(), carprice_processing::ErrorKind::Artifact);
    }

    #[test]
    fn test_from_bytes_rejects_empty_expected_columns() {
        let mut value = serde_json::to_value(fitted_pipeline()).unwrap();
        value["metadata"]["feature_names_in"] = json!([]);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            TrainedPipeline::from_bytes(&bytes),
            Err(LearningError::Artifact(_))
        ));
    }

    #[test]
    fn test_from_bytes_rejects_column_mismatch() {
        let mut value = serde_json::to_value(fitted_pipeline()).unwrap();
        value["metadata"]["feature_names_in"][0] = json!("mileage");
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            TrainedPipeline::from_bytes(&bytes),
            Err(LearningError::Artifact(_))
        ));
    }

    #[test]
    fn test_from_bytes_rejects_unknown_version() {
        let mut value = serde_json::to_value(fitted_pipeline()).unwrap();
        value["metadata"]["format_version"] = json!(99);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            TrainedPipeline::from_bytes(&bytes),
            Err(LearningError::Artifact(_))
        ));
    }

    #[test]
    fn test_info() {
        let info = fitted_pipeline().info();
        assert_eq!(info.model_name, MODEL_NAME);
        assert_eq!(info.n_trees, 10);
        assert_eq!(info.numeric_columns, vec!["odometer", "vehicle_age"]);
        assert_eq!(info.categorical_columns, vec!["condition", "fuel"]);
    }
}
