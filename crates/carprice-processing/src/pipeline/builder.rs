//! Data preparation pipeline.
//!
//! This module provides the `DataPreparation` struct and builder for running
//! the preparation stages in their fixed order.

use crate::cleaner::{InitialCleaner, MissingValuePruner};
use crate::config::{ConfigValidationError, PreparationConfig};
use crate::error::{Result, ResultExt};
use crate::features::FeatureDeriver;
use crate::pipeline::outliers::OutlierCapper;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::{ColumnSchema, ExclusionReason};
use crate::types::{PreparationSummary, PreparedDataset};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Runs clean, cap, derive, prune and schema inference on a raw table.
///
/// Use [`DataPreparation::builder()`] to create one with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use carprice_processing::{DataPreparation, PreparationConfig};
///
/// let prepared = DataPreparation::builder()
///     .config(PreparationConfig::builder().missing_column_threshold(0.5).build()?)
///     .build()?
///     .prepare(raw)?;
///
/// println!("numeric: {:?}", prepared.schema.numeric_columns());
/// ```
pub struct DataPreparation {
    config: PreparationConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(DataPreparation: Send, Sync);

impl DataPreparation {
    /// Create a new preparation builder.
    pub fn builder() -> DataPreparationBuilder {
        DataPreparationBuilder::default()
    }

    pub fn config(&self) -> &PreparationConfig {
        &self.config
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Run the preparation stages on `df`.
    ///
    /// Order: clean, cap each configured column, derive age, prune, infer
    /// the column schema. Any failure aborts the run.
    pub fn prepare(&self, df: DataFrame) -> Result<PreparedDataset> {
        let start = Instant::now();
        let config = &self.config;
        let mut summary = PreparationSummary {
            rows_before: df.height(),
            columns_before: df.width(),
            ..Default::default()
        };

        // Stage 1: Initial cleaning
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Dropping configured columns and invalid targets",
        ));
        let (df, cleaning) = InitialCleaner::clean(
            df,
            &config.columns_to_drop,
            &config.target_column,
            config.min_target_value,
        )
        .context("During initial cleaning")?;
        summary.cleaning = cleaning;

        // Stage 2: Outlier capping
        self.report_progress(ProgressUpdate::new(
            PipelineStage::OutlierCapping,
            0.0,
            format!(
                "Capping {:?} at the {}th percentile",
                config.capped_columns,
                config.cap_percentile * 100.0
            ),
        ));
        let mut df = df;
        summary.caps =
            OutlierCapper::cap_columns(&mut df, &config.capped_columns, config.cap_percentile)
                .context("During outlier capping")?;

        // Stage 3: Feature derivation
        self.report_progress(ProgressUpdate::new(
            PipelineStage::FeatureDerivation,
            0.0,
            format!("Deriving '{}'", config.age_column),
        ));
        let (df, derivation) = FeatureDeriver::derive_age(
            df,
            &config.year_column,
            &config.age_column,
            config.reference_year,
        )
        .context("During feature derivation")?;
        summary.derivation = Some(derivation);

        // Stage 4: Missing-value pruning
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Pruning,
            0.0,
            "Dropping columns with too many missing values",
        ));
        let (df, pruned) = MissingValuePruner::prune(df, config.missing_column_threshold)
            .context("During missing-value pruning")?;
        summary.pruned_columns = pruned;

        // Stage 5: Schema inference
        self.report_progress(ProgressUpdate::new(
            PipelineStage::SchemaInference,
            0.0,
            "Classifying feature columns",
        ));
        let schema = ColumnSchema::infer(&df, &config.target_column)
            .context("During schema inference")?
            .with_exclusions(
                summary.cleaning.columns_dropped.iter().cloned(),
                ExclusionReason::ExplicitlyDropped,
            )
            .with_exclusions(
                summary.pruned_columns.iter().map(|c| c.name.clone()),
                ExclusionReason::HighMissingFraction,
            );

        summary.rows_after = df.height();
        summary.columns_after = df.width();
        summary.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Preparation complete: {} x {} -> {} x {} ({} numeric, {} categorical features)",
            summary.rows_before,
            summary.columns_before,
            summary.rows_after,
            summary.columns_after,
            schema.numeric_columns().len(),
            schema.categorical_columns().len()
        );

        Ok(PreparedDataset {
            data: df,
            schema,
            summary,
        })
    }
}

/// Builder for creating a [`DataPreparation`] with fluent API.
#[derive(Default)]
pub struct DataPreparationBuilder {
    config: Option<PreparationConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl DataPreparationBuilder {
    /// Set the preparation configuration.
    pub fn config(mut self, config: PreparationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the preparation pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<DataPreparation, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(DataPreparation {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
