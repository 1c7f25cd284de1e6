//! Pipeline module.
//!
//! This module provides the preparation pipeline and its stages.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{DataPreparation, DataPreparationBuilder};
pub use outliers::OutlierCapper;
pub use progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
