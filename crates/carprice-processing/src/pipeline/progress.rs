//! Progress reporting for the training run.
//!
//! Stages cover the whole run, from loading the CSV to persisting the
//! artifact. The preparation stages are reported from this crate; the
//! learning crate reports the rest through the same reporter.
//!
//! # Example
//!
//! ```rust,ignore
//! use carprice_processing::DataPreparation;
//!
//! let prepared = DataPreparation::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .prepare(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Loading,
    Cleaning,
    OutlierCapping,
    FeatureDerivation,
    Pruning,
    SchemaInference,
    Splitting,
    Preprocessing,
    Training,
    Evaluation,
    Persisting,
    Complete,
    Failed,
}

impl PipelineStage {
    /// Get a human-readable display name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Cleaning => "Cleaning Data",
            Self::OutlierCapping => "Capping Outliers",
            Self::FeatureDerivation => "Deriving Features",
            Self::Pruning => "Pruning Columns",
            Self::SchemaInference => "Classifying Columns",
            Self::Splitting => "Splitting Rows",
            Self::Preprocessing => "Fitting Preprocessor",
            Self::Training => "Training Model",
            Self::Evaluation => "Evaluating Model",
            Self::Persisting => "Saving Pipeline",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run spent in this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.05,
            Self::Cleaning => 0.05,
            Self::OutlierCapping => 0.05,
            Self::FeatureDerivation => 0.03,
            Self::Pruning => 0.03,
            Self::SchemaInference => 0.02,
            Self::Splitting => 0.02,
            Self::Preprocessing => 0.10,
            Self::Training => 0.50,
            Self::Evaluation => 0.05,
            Self::Persisting => 0.10,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Overall progress when the stage starts.
    ///
    /// The running sum of the weights of every earlier stage, accumulated in
    /// the same `f32` order [`ProgressUpdate::new`] uses, so a stage starts
    /// exactly where the previous one ends.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Complete => 1.0,
            Self::Failed => 0.0,
            stage => RUN_ORDER
                .iter()
                .take_while(|s| *s != stage)
                .fold(0.0, |acc, s| acc + s.weight()),
        }
    }
}

/// Stages of a successful run, in order.
const RUN_ORDER: [PipelineStage; 11] = [
    PipelineStage::Loading,
    PipelineStage::Cleaning,
    PipelineStage::OutlierCapping,
    PipelineStage::FeatureDerivation,
    PipelineStage::Pruning,
    PipelineStage::SchemaInference,
    PipelineStage::Splitting,
    PipelineStage::Preprocessing,
    PipelineStage::Training,
    PipelineStage::Evaluation,
    PipelineStage::Persisting,
];

/// A progress update emitted during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0).
    pub progress: f32,

    /// Progress within the current stage (0.0 - 1.0).
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Progress from an item count within a stage, e.g. trees fitted.
    pub fn with_items(
        stage: PipelineStage,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        Self::new(stage, stage_progress, message)
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates. Must be thread-safe.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// A progress reporter backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_stage_ends_where_next_begins() {
        for pair in RUN_ORDER.windows(2) {
            let end = ProgressUpdate::new(pair[0], 1.0, "end").progress;
            let start = ProgressUpdate::new(pair[1], 0.0, "start").progress;
            assert_eq!(end, start, "{:?}", pair);
        }
        let last = ProgressUpdate::new(PipelineStage::Persisting, 1.0, "written");
        assert!(last.progress <= ProgressUpdate::complete("done").progress);
    }

    #[test]
    fn test_full_run_sequence_never_decreases() {
        let mut updates = Vec::new();
        for stage in RUN_ORDER {
            if stage == PipelineStage::Training {
                for tree in 0..=100 {
                    updates.push(ProgressUpdate::with_items(stage, tree, 100, "tree"));
                }
            } else {
                for p in [0.0, 0.25, 0.5, 0.75, 1.0] {
                    updates.push(ProgressUpdate::new(stage, p, "step"));
                }
            }
        }
        updates.push(ProgressUpdate::complete("done"));

        for (i, w) in updates.windows(2).enumerate() {
            assert!(
                w[0].progress <= w[1].progress,
                "update {} ({:?} {}) -> {:?} {}",
                i,
                w[0].stage,
                w[0].progress,
                w[1].stage,
                w[1].progress
            );
        }
        assert_eq!(updates.first().unwrap().progress, 0.0);
        assert_eq!(updates.last().unwrap().progress, 1.0);
    }

    #[test]
    fn test_progress_update_clamped() {
        let update = ProgressUpdate::new(PipelineStage::Training, 2.0, "overshoot");
        assert_eq!(update.stage_progress, 1.0);
        assert!(update.progress <= 1.0);
    }

    #[test]
    fn test_with_items() {
        let update = ProgressUpdate::with_items(PipelineStage::Training, 50, 100, "trees");
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.60).abs() < 1e-6);
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ClosureProgressReporter::new(move |u: ProgressUpdate| {
            sink.lock().unwrap().push(u.stage);
        });
        reporter.report(ProgressUpdate::complete("done"));
        assert_eq!(*seen.lock().unwrap(), vec![PipelineStage::Complete]);
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&PipelineStage::OutlierCapping).unwrap();
        assert_eq!(json, "\"outlier_capping\"");
    }
}
