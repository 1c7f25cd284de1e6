//! Configuration types for the training run.
//!
//! This module provides [`TrainingConfig`] and its builder, plus the
//! regressor hyperparameters in [`BoostingConfig`].
//!
//! # Example
//!
//! ```
//! use carprice_learning::TrainingConfig;
//!
//! let config = TrainingConfig::builder()
//!     .data_path("data/vehicles.csv")
//!     .test_size(0.2)
//!     .random_seed(42)
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::LearningError;
use carprice_processing::PreparationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the raw listings file.
pub const DEFAULT_DATA_PATH: &str = "data/vehicles.csv";

/// Default location of the persisted pipeline.
pub const DEFAULT_ARTIFACT_PATH: &str = "saved_pipeline/price_prediction_pipeline.json";

/// Hyperparameters of the gradient-boosted tree regressor.
///
/// The objective is always squared error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    /// Number of boosting rounds (default: 100).
    pub n_estimators: usize,

    /// Shrinkage applied to every leaf value (default: 0.1).
    pub learning_rate: f64,

    /// Maximum tree depth; the root is depth 0 (default: 7).
    pub max_depth: usize,

    /// L2 regularisation on leaf weights (default: 1.0).
    pub lambda: f64,

    /// Minimum hessian sum in each child of a split (default: 1.0).
    pub min_child_weight: f64,

    /// Maximum histogram bins per numeric feature, 2 - 256 (default: 256).
    pub max_bins: usize,

    /// XGBoost training threads. `None` uses all cores.
    pub n_threads: Option<usize>,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 7,
            lambda: 1.0,
            min_child_weight: 1.0,
            max_bins: 256,
            n_threads: None,
        }
    }
}

impl BoostingConfig {
    /// Check hyperparameter ranges.
    pub fn validate(&self) -> Result<(), LearningError> {
        if self.n_estimators == 0 {
            return Err(LearningError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(LearningError::InvalidConfig(
                "learning_rate must be a positive finite number".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(LearningError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if !(self.lambda >= 0.0 && self.lambda.is_finite()) {
            return Err(LearningError::InvalidConfig(
                "lambda must be a non-negative finite number".to_string(),
            ));
        }
        if !(self.min_child_weight >= 0.0 && self.min_child_weight.is_finite()) {
            return Err(LearningError::InvalidConfig(
                "min_child_weight must be a non-negative finite number".to_string(),
            ));
        }
        if !(2..=256).contains(&self.max_bins) {
            return Err(LearningError::InvalidConfig(
                "max_bins must be between 2 and 256".to_string(),
            ));
        }
        if self.n_threads == Some(0) {
            return Err(LearningError::InvalidConfig(
                "n_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a training run.
///
/// Use [`TrainingConfig::builder()`] to construct a configuration with the
/// builder pattern, or [`TrainingConfig::from_json_file()`] to read one from
/// disk. Fields missing from a JSON file keep their defaults.
///
/// # Validation
///
/// - `test_size` must be in range `(0.0, 1.0)` (exclusive)
/// - the preparation and boosting sections must validate
/// - `data_path` and `artifact_path` must not be empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Raw listings CSV (default: `data/vehicles.csv`).
    pub data_path: PathBuf,

    /// Where the trained pipeline is written
    /// (default: `saved_pipeline/price_prediction_pipeline.json`).
    pub artifact_path: PathBuf,

    /// Fraction of rows held out for evaluation (default: 0.2).
    pub test_size: f64,

    /// Seed for the train/test shuffle (default: 42).
    pub random_seed: u64,

    /// Cleaning, capping, derivation and pruning settings.
    pub preparation: PreparationConfig,

    /// Regressor hyperparameters.
    pub boosting: BoostingConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            test_size: 0.2,
            random_seed: 42,
            preparation: PreparationConfig::default(),
            boosting: BoostingConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Create a new builder for `TrainingConfig`.
    #[must_use]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Read a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LearningError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: TrainingConfig = serde_json::from_str(&content)
            .map_err(|e| LearningError::InvalidConfig(format!("config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section of the configuration.
    pub fn validate(&self) -> Result<(), LearningError> {
        if self.test_size <= 0.0 || self.test_size >= 1.0 {
            return Err(LearningError::InvalidConfig(
                "test_size must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(LearningError::InvalidConfig(
                "data_path must not be empty".to_string(),
            ));
        }
        if self.artifact_path.as_os_str().is_empty() {
            return Err(LearningError::InvalidConfig(
                "artifact_path must not be empty".to_string(),
            ));
        }
        self.preparation.validate()?;
        self.boosting.validate()
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    #[must_use]
    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_path = path.into();
        self
    }

    #[must_use]
    pub fn artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.artifact_path = path.into();
        self
    }

    #[must_use]
    pub fn test_size(mut self, size: f64) -> Self {
        self.config.test_size = size;
        self
    }

    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    #[must_use]
    pub fn preparation(mut self, preparation: PreparationConfig) -> Self {
        self.config.preparation = preparation;
        self
    }

    #[must_use]
    pub fn boosting(mut self, boosting: BoostingConfig) -> Self {
        self.config.boosting = boosting;
        self
    }

    #[must_use]
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.config.boosting.n_estimators = n;
        self
    }

    #[must_use]
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.config.boosting.learning_rate = rate;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.boosting.max_depth = depth;
        self
    }

    #[must_use]
    pub fn n_threads(mut self, threads: usize) -> Self {
        self.config.boosting.n_threads = Some(threads);
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if any value is out of range.
    pub fn build(self) -> Result<TrainingConfig, LearningError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.data_path, PathBuf::from("data/vehicles.csv"));
        assert_eq!(
            config.artifact_path,
            PathBuf::from("saved_pipeline/price_prediction_pipeline.json")
        );
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.boosting.n_estimators, 100);
        assert_eq!(config.boosting.learning_rate, 0.1);
        assert_eq!(config.boosting.max_depth, 7);
        assert_eq!(config.preparation.missing_column_threshold, 0.4);
    }

    #[test]
    fn test_builder() {
        let config = TrainingConfig::builder()
            .data_path("listings.csv")
            .n_estimators(20)
            .max_depth(3)
            .n_threads(2)
            .random_seed(7)
            .build()
            .unwrap();

        assert_eq!(config.data_path, PathBuf::from("listings.csv"));
        assert_eq!(config.boosting.n_estimators, 20);
        assert_eq!(config.boosting.max_depth, 3);
        assert_eq!(config.boosting.n_threads, Some(2));
        assert_eq!(config.random_seed, 7);
    }

    #[test]
    fn test_invalid_test_size() {
        for size in [0.0, 1.0, -0.1, 1.5] {
            let result = TrainingConfig::builder().test_size(size).build();
            assert!(result.unwrap_err().to_string().contains("test_size"));
        }
    }

    #[test]
    fn test_invalid_boosting() {
        assert!(TrainingConfig::builder().n_estimators(0).build().is_err());
        assert!(TrainingConfig::builder().learning_rate(0.0).build().is_err());
        assert!(TrainingConfig::builder().max_depth(0).build().is_err());
        assert!(TrainingConfig::builder().n_threads(0).build().is_err());

        let boosting = BoostingConfig {
            max_bins: 1000,
            ..Default::default()
        };
        let err = TrainingConfig::builder().boosting(boosting).build().unwrap_err();
        assert!(err.to_string().contains("max_bins"));
    }

    #[test]
    fn test_invalid_preparation_maps_to_config_error() {
        let mut preparation = PreparationConfig::default();
        preparation.missing_column_threshold = 2.0;
        let err = TrainingConfig::builder()
            .preparation(preparation)
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_from_json_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.json");
        std::fs::write(
            &path,
            r#"{
                "data_path": "other.csv",
                "boosting": { "n_estimators": 50 },
                "preparation": { "reference_year": 2023 }
            }"#,
        )
        .unwrap();

        let config = TrainingConfig::from_json_file(&path).unwrap();
        assert_eq!(config.data_path, PathBuf::from("other.csv"));
        assert_eq!(config.boosting.n_estimators, 50);
        assert_eq!(config.boosting.max_depth, 7);
        assert_eq!(config.preparation.reference_year, 2023);
        assert_eq!(config.test_size, 0.2);
    }

    #[test]
    fn test_from_json_file_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.json");
        std::fs::write(&path, r#"{ "test_size": 3.0 }"#).unwrap();
        assert!(TrainingConfig::from_json_file(&path).is_err());
    }
}
