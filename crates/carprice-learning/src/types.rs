//! Common types returned by training and inspection.
//!
//! # Overview
//!
//! - [`TrainingResult`]: Complete result from [`Trainer::train()`](crate::Trainer::train)
//!   and [`Trainer::run()`](crate::Trainer::run)
//! - [`Metrics`]: Held-out and training-split evaluation
//! - [`ModelInfo`]: Summary of a persisted pipeline
//!
//! # Example
//!
//! ```ignore
//! let result = trainer.run()?;
//!
//! println!("Test R²: {:.3}", result.metrics.r2);
//! for (feature, importance) in result.feature_importance.iter().take(5) {
//!     println!("  {:<30} {:.3}", feature, importance);
//! }
//! ```

use carprice_processing::PreparationSummary;
use serde::{Deserialize, Serialize};

/// Result of a training run.
///
/// # Fields
///
/// - `metrics`: Evaluation on the held-out split
/// - `feature_importance`: Ranked list of (encoded feature, importance) pairs
/// - `preparation`: What cleaning, capping, derivation and pruning did
/// - `training_time_seconds`: Total wall-clock time
/// - `warnings`: Non-fatal issues worth a look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TrainingResult {
    /// Metrics achieved by the fitted pipeline.
    pub metrics: Metrics,

    /// Split-gain importance per encoded feature (`num__odometer`,
    /// `cat__fuel_gas`, ...).
    ///
    /// Sorted in descending order and normalized to sum to 1.0. Features
    /// never used in a split are omitted.
    pub feature_importance: Vec<(String, f64)>,

    /// Raw input columns the pipeline expects, in order.
    pub feature_names_in: Vec<String>,

    /// Report from data preparation.
    pub preparation: PreparationSummary,

    /// Rows in the training split.
    pub train_rows: usize,

    /// Rows in the held-out split.
    pub test_rows: usize,

    /// Total training time in seconds, including preparation.
    pub training_time_seconds: f64,

    /// Where the artifact was written, `None` if it was not persisted.
    pub artifact_path: Option<String>,

    /// Warnings generated during training.
    ///
    /// E.g. excluded columns or a held-out R² that is negative or not finite.
    pub warnings: Vec<String>,
}

/// Metrics from model evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Metrics {
    /// R-squared on the held-out split.
    ///
    /// Range: (-∞, 1.0], where 1.0 is perfect. Negative values indicate
    /// worse than predicting the mean.
    pub r2: f64,

    /// Root Mean Squared Error on the held-out split, in target units.
    pub rmse: f64,

    /// Mean Absolute Error on the held-out split, in target units.
    pub mae: f64,

    /// R-squared on the training split.
    ///
    /// Used with `r2` to spot overfitting.
    pub train_r2: f64,
}

impl Metrics {
    pub fn new(r2: f64, rmse: f64, mae: f64, train_r2: f64) -> Self {
        Self {
            r2,
            rmse,
            mae,
            train_r2,
        }
    }
}

/// Information about a persisted pipeline.
///
/// Returned by [`TrainedPipeline::info()`](crate::TrainedPipeline::info).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ModelInfo {
    /// Name of the regressor algorithm.
    pub model_name: String,

    /// Name of the target column used during training.
    pub target_column: String,

    /// Raw input columns in the order expected by the pipeline.
    pub feature_names_in: Vec<String>,

    /// Numeric inputs (median imputed, standardised).
    pub numeric_columns: Vec<String>,

    /// Categorical inputs (most-frequent imputed, one-hot encoded).
    pub categorical_columns: Vec<String>,

    /// Width of the encoded feature matrix.
    pub n_features_out: usize,

    /// Number of boosting rounds.
    pub n_trees: usize,

    /// Year that vehicle ages are measured from.
    pub reference_year: i32,

    /// RFC 3339 training timestamp.
    pub trained_at: String,

    /// Metrics achieved during training.
    pub metrics: Metrics,
}
