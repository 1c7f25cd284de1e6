//! Custom error types for the data preparation stages.
//!
//! This module provides the error hierarchy using `thiserror` for the
//! cleaning, capping, derivation and pruning steps. Every variant here is a
//! data error: preparation fails fast rather than handing an empty or
//! malformed table to the trainer.
//!
//! Errors are serializable as `{code, message}` so a front end can display
//! them without matching on variants.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Broad classification of a failure, shared with the learning crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Malformed, empty or degenerate input data.
    Data,
    /// A record does not match the columns a fitted pipeline expects.
    Schema,
    /// A persisted artifact is missing metadata or is corrupt.
    Artifact,
    /// Invalid configuration values.
    Config,
    /// File system failure.
    Io,
}

/// The main error type for data preparation.
#[derive(Error, Debug)]
pub enum PreparationError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A column that must be numeric has a non-numeric dtype.
    #[error("Column '{column}' must be numeric, found {dtype}")]
    NonNumericColumn { column: String, dtype: String },

    /// No non-null values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// The table has no rows left to work with.
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreparationError>,
    },
}

impl PreparationError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreparationError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NonNumericColumn { .. } => "NON_NUMERIC_COLUMN",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::WithContext { source, .. } => source.kind(),
            _ => ErrorKind::Data,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreparationError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreparationError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preparation operations.
pub type Result<T> = std::result::Result<T, PreparationError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreparationError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PreparationError::ColumnNotFound("price".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            PreparationError::EmptyDataset("no rows".to_string()).error_code(),
            "EMPTY_DATASET"
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(
            PreparationError::NoValidValues("odometer".to_string()).kind(),
            ErrorKind::Data
        );
        assert_eq!(
            PreparationError::InvalidConfig("bad".to_string()).kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = PreparationError::NonNumericColumn {
            column: "price".to_string(),
            dtype: "str".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("NON_NUMERIC_COLUMN"));
        assert!(json.contains("price"));
    }

    #[test]
    fn test_with_context() {
        let error = PreparationError::ColumnNotFound("year".to_string())
            .with_context("During feature derivation");
        assert!(error.to_string().contains("During feature derivation"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
        assert_eq!(error.kind(), ErrorKind::Data);
    }
}
