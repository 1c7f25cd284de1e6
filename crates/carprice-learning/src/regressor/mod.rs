//! Gradient-boosted regression trees backed by XGBoost.
//!
//! [`GradientBoostedRegressor`] fits a squared-error tree ensemble with the
//! `hist` tree method. The transformed features are handed to XGBoost as one
//! CSR matrix, so the one-hot block never becomes dense. The base score is
//! the training target mean.
//!
//! The fitted booster is kept as XGBoost's saved model bytes, which makes
//! [`FittedGradientBoostedRegressor`] plain data: it serializes with the rest
//! of the pipeline artifact and is `Send + Sync`. A booster is loaded from
//! those bytes for each prediction call.
//!
//! # Example
//!
//! ```rust,ignore
//! use carprice_learning::{BoostingConfig, GradientBoostedRegressor};
//!
//! let regressor = GradientBoostedRegressor::new(BoostingConfig::default())?;
//! let fitted = regressor.fit(&x_train, &y_train)?;
//! let predictions = fitted.predict(&x_test)?;
//! ```

use crate::config::BoostingConfig;
use crate::error::{LearningError, Result};
use crate::matrix::FeatureMatrix;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{debug, info};
use xgboost::parameters::learning::{LearningTaskParametersBuilder, Objective};
use xgboost::parameters::tree::{TreeBoosterParametersBuilder, TreeMethod};
use xgboost::parameters::{BoosterParameters, BoosterParametersBuilder, BoosterType};
use xgboost::{Booster, DMatrix, XGBError};

/// Unfitted regressor holding validated hyperparameters.
#[derive(Debug, Clone)]
pub struct GradientBoostedRegressor {
    config: BoostingConfig,
}

impl GradientBoostedRegressor {
    pub fn new(config: BoostingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BoostingConfig {
        &self.config
    }

    pub fn fit(&self, x: &FeatureMatrix, y: &[f64]) -> Result<FittedGradientBoostedRegressor> {
        self.fit_with_progress(x, y, |_, _| {})
    }

    /// Fit, calling `on_tree(done, total)` after every boosting round.
    ///
    /// # Errors
    ///
    /// - [`LearningError::InvalidData`] on zero rows, a length mismatch or a
    ///   non-finite target
    /// - [`LearningError::TrainingFailed`] if XGBoost rejects the data or
    ///   parameters
    pub fn fit_with_progress<F>(
        &self,
        x: &FeatureMatrix,
        y: &[f64],
        mut on_tree: F,
    ) -> Result<FittedGradientBoostedRegressor>
    where
        F: FnMut(usize, usize),
    {
        if x.n_rows() == 0 {
            return Err(LearningError::InvalidData(
                "cannot fit the regressor on zero rows".to_string(),
            ));
        }
        if y.len() != x.n_rows() {
            return Err(LearningError::InvalidData(format!(
                "target has {} values for {} rows",
                y.len(),
                x.n_rows()
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(LearningError::InvalidData(
                "target contains non-finite values".to_string(),
            ));
        }

        let base_score = y.iter().sum::<f64>() / y.len() as f64;
        let labels: Vec<f32> = y.iter().map(|&v| v as f32).collect();

        let mut dtrain = to_dmatrix(x).map_err(training_failed("building training matrix"))?;
        dtrain
            .set_labels(&labels)
            .map_err(training_failed("setting labels"))?;
        debug!(
            "Training matrix: {} rows, {} dense features, {} indicators, {} one-hot entries",
            x.n_rows(),
            x.n_dense(),
            x.n_sparse(),
            x.nnz()
        );

        let params = self.booster_parameters(base_score)?;
        let n_estimators = self.config.n_estimators;
        let mut booster = Booster::new_with_cached_dmats(&params, &[&dtrain])
            .map_err(training_failed("creating booster"))?;
        for round in 0..n_estimators {
            booster
                .update(&dtrain, round as i32)
                .map_err(training_failed("boosting round"))?;
            on_tree(round + 1, n_estimators);
        }

        let dump = booster
            .dump_model(true, None)
            .map_err(training_failed("dumping trees"))?;
        let feature_importance = normalise(split_gains(&dump, x.n_features()));
        let model = saved_model(&booster)?;

        info!(
            "Fitted {} trees (base score {:.2}, {} byte model)",
            n_estimators,
            base_score,
            model.len()
        );

        Ok(FittedGradientBoostedRegressor {
            base_score,
            n_dense: x.n_dense(),
            n_sparse: x.n_sparse(),
            n_trees: n_estimators,
            feature_importance,
            model,
        })
    }

    fn booster_parameters(&self, base_score: f64) -> Result<BoosterParameters> {
        let config = &self.config;
        let tree_params = TreeBoosterParametersBuilder::default()
            .eta(config.learning_rate as f32)
            .max_depth(config.max_depth as u32)
            .lambda(config.lambda as f32)
            .min_child_weight(config.min_child_weight as f32)
            .max_bin(config.max_bins as u32)
            .tree_method(TreeMethod::Hist)
            .build()
            .map_err(LearningError::InvalidConfig)?;
        let learning_params = LearningTaskParametersBuilder::default()
            .objective(Objective::RegLinear)
            .base_score(base_score as f32)
            .build()
            .map_err(LearningError::InvalidConfig)?;

        BoosterParametersBuilder::default()
            .booster_type(BoosterType::Tree(tree_params))
            .learning_params(learning_params)
            .threads(config.n_threads.map(|n| n as u32))
            .verbose(false)
            .build()
            .map_err(LearningError::InvalidConfig)
    }
}

fn training_failed(context: &'static str) -> impl FnOnce(XGBError) -> LearningError {
    move |e| LearningError::TrainingFailed(format!("{}: {}", context, e))
}

/// One CSR matrix: dense features first, then indicators at `n_dense + i`.
fn to_dmatrix(x: &FeatureMatrix) -> std::result::Result<DMatrix, XGBError> {
    let (indptr, indices, data) = x.to_csr();
    DMatrix::from_csr(&indptr, &indices, &data, Some(x.n_features()))
}

/// XGBoost only saves to a path; round-trip through a temp file.
fn saved_model(booster: &Booster) -> Result<Vec<u8>> {
    let file = tempfile::NamedTempFile::new()?;
    booster
        .save(file.path())
        .map_err(training_failed("saving booster"))?;
    Ok(fs::read(file.path())?)
}

/// Total split gain per feature from a dump made `with_statistics`.
///
/// Split lines look like `0:[f12<0.5] yes=1,no=2,missing=1,gain=3.2,cover=40`.
fn split_gains(dump: &str, n_features: usize) -> Vec<f64> {
    let mut gains = vec![0.0; n_features];
    for line in dump.lines() {
        let Some(start) = line.find("[f") else {
            continue;
        };
        let rest = &line[start + 2..];
        let Some(end) = rest.find(|c: char| !c.is_ascii_digit()) else {
            continue;
        };
        let Ok(feature) = rest[..end].parse::<usize>() else {
            continue;
        };
        let gain = line
            .split(',')
            .find_map(|field| field.trim().strip_prefix("gain="))
            .and_then(|v| v.parse::<f64>().ok());
        if let (Some(slot), Some(gain)) = (gains.get_mut(feature), gain) {
            *slot += gain;
        }
    }
    gains
}

fn normalise(mut values: Vec<f64>) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        values.iter_mut().for_each(|v| *v /= total);
    }
    values
}

/// A fitted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedGradientBoostedRegressor {
    base_score: f64,
    n_dense: usize,
    n_sparse: usize,
    n_trees: usize,
    /// Split gain per feature, normalised to sum 1 (all zeros if no splits).
    feature_importance: Vec<f64>,
    /// XGBoost saved model.
    model: Vec<u8>,
}

impl FittedGradientBoostedRegressor {
    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Feature width the ensemble was fitted on.
    pub fn n_features(&self) -> usize {
        self.n_dense + self.n_sparse
    }

    pub fn feature_importance(&self) -> &[f64] {
        &self.feature_importance
    }

    /// Predict every row of `x`.
    ///
    /// # Errors
    ///
    /// - [`LearningError::FeatureMismatch`] if `x` is not laid out like the
    ///   training matrix
    /// - [`LearningError::Artifact`] if the stored model cannot be loaded
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        if x.n_dense() != self.n_dense || x.n_sparse() != self.n_sparse {
            return Err(LearningError::FeatureMismatch {
                expected: self.n_features(),
                actual: x.n_features(),
            });
        }
        if x.n_rows() == 0 {
            return Ok(Vec::new());
        }
        let booster = self.booster()?;
        let dmatrix = to_dmatrix(x)
            .map_err(|e| LearningError::InvalidData(format!("building prediction matrix: {}", e)))?;
        let predictions = booster
            .predict(&dmatrix)
            .map_err(|e| LearningError::InvalidData(format!("prediction failed: {}", e)))?;
        Ok(predictions.into_iter().map(f64::from).collect())
    }

    fn booster(&self) -> Result<Booster> {
        Booster::load_buffer(&self.model)
            .map_err(|e| LearningError::Artifact(format!("regressor model does not load: {}", e)))
    }

    /// Structural check for deserialized ensembles.
    pub fn validate(&self) -> Result<()> {
        if !self.base_score.is_finite() {
            return Err(LearningError::Artifact(
                "regressor base score is not finite".to_string(),
            ));
        }
        if self.n_trees == 0 {
            return Err(LearningError::Artifact("regressor has no trees".to_string()));
        }
        if self.feature_importance.len() != self.n_features() {
            return Err(LearningError::Artifact(format!(
                "regressor has {} importances for {} features",
                self.feature_importance.len(),
                self.n_features()
            )));
        }
        if self.model.is_empty() {
            return Err(LearningError::Artifact(
                "regressor model bytes are empty".to_string(),
            ));
        }
        self.booster().map(|_| ())
    }
}
