//! Error types for the carprice-learning crate.
//!
//! This module defines [`LearningError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, LearningError>`.
//!
//! # Error Handling
//!
//! Errors fall into the kinds of [`ErrorKind`]:
//! - **Data**: preparation failures and degenerate training data
//! - **Schema**: a record does not match the columns a fitted pipeline expects
//! - **Artifact**: a persisted pipeline is missing, inconsistent or corrupt
//! - **Config**: invalid configuration values
//! - **Io**: file system failures
//!
//! # Example
//!
//! ```rust,ignore
//! use carprice_learning::{LearningError, TrainedPipeline};
//!
//! match TrainedPipeline::load("saved_pipeline/price_prediction_pipeline.json") {
//!     Ok(pipeline) => println!("expects {:?}", pipeline.feature_names_in()),
//!     Err(e) if e.kind() == ErrorKind::Artifact => eprintln!("retrain: {}", e),
//!     Err(e) => return Err(e),
//! }
//! ```

use carprice_processing::{ErrorKind, PreparationError};
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for carprice-learning operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the trainer.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A preparation stage failed (cleaning, capping, derivation, pruning).
    #[error(transparent)]
    Preparation(#[from] PreparationError),

    /// Training data is unusable after preparation, e.g. too few rows to split.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// An expected input column is absent and cannot be defaulted to null.
    #[error("Expected column '{0}' is missing from the input")]
    MissingColumn(String),

    /// The input carries a column the fitted pipeline does not expect.
    #[error("Unexpected column '{0}' for this pipeline")]
    UnexpectedColumn(String),

    /// Transformed feature width differs from what the regressor was fitted on.
    #[error("Feature mismatch: expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// Fitting the regressor failed.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// A persisted artifact is missing required metadata or is inconsistent.
    #[error("Invalid artifact: {0}")]
    Artifact(String),

    /// The artifact file does not exist.
    #[error("Artifact not found: {path}")]
    ArtifactNotFound {
        /// The path that was not found.
        path: String,
    },

    /// No artifact is loaded; the predictor refuses input.
    #[error("Prediction model is unavailable: {0}")]
    ArtifactUnavailable(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl LearningError {
    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Preparation(e) => e.error_code(),
            Self::InvalidData(_) => "INVALID_DATA",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::UnexpectedColumn(_) => "UNEXPECTED_COLUMN",
            Self::FeatureMismatch { .. } => "FEATURE_MISMATCH",
            Self::TrainingFailed(_) => "TRAINING_FAILED",
            Self::Artifact(_) => "INVALID_ARTIFACT",
            Self::ArtifactNotFound { .. } => "ARTIFACT_NOT_FOUND",
            Self::ArtifactUnavailable(_) => "ARTIFACT_UNAVAILABLE",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig(_) => ErrorKind::Config,
            Self::Preparation(e) => e.kind(),
            Self::InvalidData(_) | Self::TrainingFailed(_) | Self::Polars(_) => ErrorKind::Data,
            Self::MissingColumn(_) | Self::UnexpectedColumn(_) | Self::FeatureMismatch { .. } => {
                ErrorKind::Schema
            }
            Self::Artifact(_)
            | Self::ArtifactNotFound { .. }
            | Self::ArtifactUnavailable(_)
            | Self::Json(_) => ErrorKind::Artifact,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<carprice_processing::ConfigValidationError> for LearningError {
    fn from(err: carprice_processing::ConfigValidationError) -> Self {
        LearningError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for LearningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("LearningError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
