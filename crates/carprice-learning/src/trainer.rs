//! Training orchestrator.
//!
//! This module provides the [`Trainer`] struct and its builder. A run
//! executes these stages in order, each reported through the optional
//! progress callback:
//!
//! 1. **Loading** - read the listings CSV ([`run()`](Trainer::run) only)
//! 2. **Preparation** - clean, cap price and odometer, derive vehicle age,
//!    prune sparse columns, infer the column schema
//! 3. **Splitting** - seeded shuffle into train and held-out rows
//! 4. **Preprocessing** - fit the column transformer on the training rows
//! 5. **Training** - fit the gradient-boosted regressor, one update per tree
//! 6. **Evaluation** - R², RMSE and MAE on the held-out rows
//! 7. **Persisting** - atomic artifact write ([`run()`](Trainer::run) only)
//!
//! Any failure aborts the run; nothing is written unless every stage
//! before persisting succeeded.
//!
//! # Example
//!
//! ```rust,ignore
//! use carprice_learning::{Trainer, TrainingConfig};
//!
//! let trainer = Trainer::builder()
//!     .config(TrainingConfig::default())
//!     .on_progress(|u| println!("[{:?}] {:.0}% - {}", u.stage, u.progress * 100.0, u.message))
//!     .build()?;
//!
//! let result = trainer.run()?;
//! println!("Test R²: {:.3}", result.metrics.r2);
//! ```

use crate::config::TrainingConfig;
use crate::error::{LearningError, Result};
use crate::metrics::{mean_absolute_error, r2_score, root_mean_squared_error};
use crate::model::{ARTIFACT_FORMAT_VERSION, ArtifactMetadata, TrainedPipeline};
use crate::preprocessing::ColumnTransformer;
use crate::regressor::GradientBoostedRegressor;
use crate::split::train_test_split;
use crate::types::{Metrics, TrainingResult};
use carprice_processing::{
    ClosureProgressReporter, DataPreparation, ExclusionReason, PipelineStage, ProgressReporter,
    ProgressUpdate, load_csv,
};
use chrono::Utc;
use polars::prelude::*;
use static_assertions::assert_impl_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runs the full training pipeline.
///
/// Use [`Trainer::builder()`] to construct one.
///
/// # Lifecycle
///
/// 1. Create a trainer with [`Trainer::builder()`]
/// 2. Call [`run()`](Self::run) to train from the configured CSV and persist,
///    or [`train()`](Self::train) to fit an in-memory table without any I/O
pub struct Trainer {
    config: TrainingConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

assert_impl_all!(Trainer: Send, Sync);

impl std::fmt::Debug for Trainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("config", &self.config)
            .field(
                "progress_reporter",
                &self.progress_reporter.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Trainer {
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::default()
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train from the configured CSV and write the artifact.
    ///
    /// # Errors
    ///
    /// Any stage failure is returned unchanged; a `Failed` progress update
    /// is emitted first. The artifact path is untouched on failure.
    pub fn run(&self) -> Result<TrainingResult> {
        let start = Instant::now();
        let outcome = self.load_train_and_save(start);
        self.finish(outcome)
    }

    /// Fit a pipeline on an in-memory raw table. Nothing is written.
    pub fn train(&self, df: DataFrame) -> Result<(TrainedPipeline, TrainingResult)> {
        let start = Instant::now();
        let outcome = self.fit_pipeline(df, start);
        self.finish(outcome)
    }

    fn finish<T>(&self, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.report(ProgressUpdate::complete("Training complete"));
                Ok(value)
            }
            Err(e) => {
                warn!("Training failed: {}", e);
                self.report(ProgressUpdate::failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn load_train_and_save(&self, start: Instant) -> Result<TrainingResult> {
        let data_path = &self.config.data_path;
        self.report(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Loading {}", data_path.display()),
        ));
        let df = load_csv(data_path)?;
        info!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            data_path.display()
        );
        self.report(ProgressUpdate::new(
            PipelineStage::Loading,
            1.0,
            format!("Loaded {} rows", df.height()),
        ));

        let (pipeline, mut result) = self.fit_pipeline(df, start)?;

        let artifact_path = &self.config.artifact_path;
        self.report(ProgressUpdate::new(
            PipelineStage::Persisting,
            0.0,
            format!("Writing {}", artifact_path.display()),
        ));
        pipeline.save(artifact_path)?;
        self.report(ProgressUpdate::new(
            PipelineStage::Persisting,
            1.0,
            "Artifact written",
        ));

        result.artifact_path = Some(artifact_path.display().to_string());
        result.training_time_seconds = start.elapsed().as_secs_f64();
        Ok(result)
    }

    fn fit_pipeline(&self, df: DataFrame, start: Instant) -> Result<(TrainedPipeline, TrainingResult)> {
        let prep_config = &self.config.preparation;
        let target = prep_config.target_column.as_str();

        let mut preparation = DataPreparation::builder().config(prep_config.clone());
        if let Some(reporter) = &self.progress_reporter {
            preparation = preparation.progress_reporter(Arc::clone(reporter));
        }
        let prepared = preparation.build()?.prepare(df)?;
        let schema = prepared.schema;
        let summary = prepared.summary;

        let mut warnings = Vec::new();
        for dropped in &summary.pruned_columns {
            warnings.push(format!(
                "Column '{}' dropped: {:.1}% missing",
                dropped.name,
                dropped.missing_fraction * 100.0
            ));
        }
        for name in schema.excluded_with(ExclusionReason::Unclassified) {
            warnings.push(format!(
                "Column '{}' excluded: neither numeric nor categorical",
                name
            ));
        }

        // Split
        self.report(ProgressUpdate::new(
            PipelineStage::Splitting,
            0.0,
            "Splitting train and test rows",
        ));
        let (train_df, test_df) =
            train_test_split(&prepared.data, self.config.test_size, self.config.random_seed)?;
        drop(prepared.data);
        info!(
            "Split {} train / {} test rows (seed {})",
            train_df.height(),
            test_df.height(),
            self.config.random_seed
        );
        let y_train = target_values(&train_df, target)?;
        let y_test = target_values(&test_df, target)?;
        let train_features = train_df.drop(target)?;
        let test_features = test_df.drop(target)?;

        // Preprocess
        self.report(ProgressUpdate::new(
            PipelineStage::Preprocessing,
            0.0,
            "Fitting column transformer",
        ));
        let transformer = ColumnTransformer::from_schema(&schema)?.fit(&train_features)?;
        let x_train = transformer.transform(&train_features)?;
        let x_test = transformer.transform(&test_features)?;
        info!(
            "Encoded {} input columns into {} features ({} one-hot entries)",
            transformer.feature_names_in().len(),
            x_train.n_features(),
            x_train.nnz()
        );
        self.report(ProgressUpdate::new(
            PipelineStage::Preprocessing,
            1.0,
            format!("{} encoded features", x_train.n_features()),
        ));

        // Fit
        let boosting = self.config.boosting.clone();
        let regressor = GradientBoostedRegressor::new(boosting.clone())?.fit_with_progress(
            &x_train,
            &y_train,
            |done, total| {
                self.report(ProgressUpdate::with_items(
                    PipelineStage::Training,
                    done,
                    total,
                    format!("Fitted tree {}/{}", done, total),
                ))
            },
        )?;

        // Evaluate
        self.report(ProgressUpdate::new(
            PipelineStage::Evaluation,
            0.0,
            "Scoring held-out rows",
        ));
        let test_pred = regressor.predict(&x_test)?;
        let train_pred = regressor.predict(&x_train)?;
        let metrics = Metrics::new(
            r2_score(&y_test, &test_pred),
            root_mean_squared_error(&y_test, &test_pred),
            mean_absolute_error(&y_test, &test_pred),
            r2_score(&y_train, &train_pred),
        );
        info!(
            "Held-out R² {:.4}, RMSE {:.2}, MAE {:.2} (train R² {:.4})",
            metrics.r2, metrics.rmse, metrics.mae, metrics.train_r2
        );
        if !metrics.r2.is_finite() {
            warnings.push("Held-out R² is not finite".to_string());
        } else if metrics.r2 < 0.0 {
            warnings.push(format!(
                "Held-out R² is negative ({:.4}); the model is worse than predicting the mean",
                metrics.r2
            ));
        }
        for warning in &warnings {
            warn!("{}", warning);
        }
        self.report(ProgressUpdate::new(
            PipelineStage::Evaluation,
            1.0,
            format!("Held-out R² {:.4}", metrics.r2),
        ));

        let metadata = ArtifactMetadata {
            format_version: ARTIFACT_FORMAT_VERSION,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            trained_at: Utc::now(),
            target_column: target.to_string(),
            reference_year: prep_config.reference_year,
            age_column: prep_config.age_column.clone(),
            year_column: prep_config.year_column.clone(),
            feature_names_in: transformer.feature_names_in().to_vec(),
            schema,
            boosting,
            train_rows: x_train.n_rows(),
            test_rows: x_test.n_rows(),
            metrics,
        };
        let pipeline = TrainedPipeline::new(metadata, transformer, regressor)?;

        let result = TrainingResult {
            metrics,
            feature_importance: pipeline.feature_importance(),
            feature_names_in: pipeline.feature_names_in().to_vec(),
            preparation: summary,
            train_rows: x_train.n_rows(),
            test_rows: x_test.n_rows(),
            training_time_seconds: start.elapsed().as_secs_f64(),
            artifact_path: None,
            warnings,
        };
        Ok((pipeline, result))
    }

    fn report(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Target column as floats. Cleaning guarantees there are no nulls.
fn target_values(df: &DataFrame, target: &str) -> Result<Vec<f64>> {
    let values = df
        .column(target)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values = values.f64()?;
    if values.null_count() > 0 {
        return Err(LearningError::InvalidData(format!(
            "target column '{}' has nulls after cleaning",
            target
        )));
    }
    Ok(values.into_no_null_iter().collect())
}

/// Builder for [`Trainer`].
#[derive(Default)]
pub struct TrainerBuilder {
    config: Option<TrainingConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl std::fmt::Debug for TrainerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainerBuilder")
            .field("config", &self.config)
            .field(
                "progress_reporter",
                &self.progress_reporter.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl TrainerBuilder {
    /// Set the training configuration (required).
    #[must_use]
    pub fn config(mut self, config: TrainingConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set the progress callback (optional).
    ///
    /// The callback should execute quickly; it runs on the training thread
    /// once per stage boundary and once per fitted tree.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the trainer.
    ///
    /// # Errors
    ///
    /// [`LearningError::InvalidConfig`] if no configuration was provided or
    /// it fails validation.
    pub fn build(self) -> Result<Trainer> {
        let config = self.config.ok_or_else(|| {
            LearningError::InvalidConfig("Trainer config is required".to_string())
        })?;
        config.validate()?;

        Ok(Trainer {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
