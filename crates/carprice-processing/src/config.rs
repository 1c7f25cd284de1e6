//! Configuration types for the data preparation stages.
//!
//! This module provides configuration options using the builder pattern.
//! Defaults reproduce the vehicle listings setup: the listed identifier,
//! free-text and high-cardinality columns are dropped, `price` and
//! `odometer` are capped at the 99th percentile, `year` becomes
//! `vehicle_age` relative to 2024 and columns more than 40% empty are pruned.

use serde::{Deserialize, Serialize};

/// Columns dropped before anything else.
///
/// Identifiers, URLs and free text carry no signal; `region`, `model`,
/// `type`, `paint_color` and `manufacturer` have enough distinct values to
/// make one-hot encoding memory-prohibitive.
pub const DEFAULT_COLUMNS_TO_DROP: [&str; 15] = [
    "id",
    "vin",
    "url",
    "region_url",
    "image_url",
    "description",
    "title_status",
    "lat",
    "long",
    "posting_date",
    "region",
    "model",
    "type",
    "paint_color",
    "manufacturer",
];

/// Default target column.
pub const DEFAULT_TARGET_COLUMN: &str = "price";

/// Rows whose target is not strictly above this are placeholder prices.
pub const DEFAULT_MIN_TARGET_VALUE: f64 = 100.0;

/// Reference year for `vehicle_age`. Fixed, not read from the clock.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2024;

/// Configuration for data preparation.
///
/// Use [`PreparationConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use carprice_processing::PreparationConfig;
///
/// let config = PreparationConfig::builder()
///     .missing_column_threshold(0.5)
///     .cap_percentile(0.95)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreparationConfig {
    /// Columns removed unconditionally. Names absent from the data are ignored.
    pub columns_to_drop: Vec<String>,

    /// Name of the column to predict.
    /// Default: "price"
    pub target_column: String,

    /// Rows with a target at or below this value are removed.
    /// Default: 100.0
    pub min_target_value: f64,

    /// Numeric columns capped at `cap_percentile`, in order.
    /// Default: ["price", "odometer"]
    pub capped_columns: Vec<String>,

    /// Upper percentile used for capping (exclusive range 0.0 - 1.0).
    /// Default: 0.99
    pub cap_percentile: f64,

    /// Model-year column that `vehicle_age` is derived from.
    /// Default: "year"
    pub year_column: String,

    /// Name of the derived age column.
    /// Default: "vehicle_age"
    pub age_column: String,

    /// Year that ages are measured against.
    /// Default: 2024
    pub reference_year: i32,

    /// Columns with a missing fraction strictly above this are dropped
    /// (exclusive range 0.0 - 1.0).
    /// Default: 0.4 (40%)
    pub missing_column_threshold: f64,
}

impl Default for PreparationConfig {
    fn default() -> Self {
        Self {
            columns_to_drop: DEFAULT_COLUMNS_TO_DROP
                .iter()
                .map(|s| s.to_string())
                .collect(),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            min_target_value: DEFAULT_MIN_TARGET_VALUE,
            capped_columns: vec!["price".to_string(), "odometer".to_string()],
            cap_percentile: 0.99,
            year_column: "year".to_string(),
            age_column: "vehicle_age".to_string(),
            reference_year: DEFAULT_REFERENCE_YEAR,
            missing_column_threshold: 0.4,
        }
    }
}

impl PreparationConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreparationConfigBuilder {
        PreparationConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.cap_percentile > 0.0 && self.cap_percentile < 1.0) {
            return Err(ConfigValidationError::InvalidFraction {
                field: "cap_percentile".to_string(),
                value: self.cap_percentile,
            });
        }

        if !(self.missing_column_threshold > 0.0 && self.missing_column_threshold < 1.0) {
            return Err(ConfigValidationError::InvalidFraction {
                field: "missing_column_threshold".to_string(),
                value: self.missing_column_threshold,
            });
        }

        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyName("target_column".to_string()));
        }
        if self.year_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyName("year_column".to_string()));
        }
        if self.age_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyName("age_column".to_string()));
        }

        if self.columns_to_drop.contains(&self.target_column) {
            return Err(ConfigValidationError::TargetDropped(
                self.target_column.clone(),
            ));
        }

        if !self.min_target_value.is_finite() {
            return Err(ConfigValidationError::NonFiniteValue {
                field: "min_target_value".to_string(),
                value: self.min_target_value,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid fraction for '{field}': {value} (must be strictly between 0.0 and 1.0)")]
    InvalidFraction { field: String, value: f64 },

    #[error("Column name for '{0}' must not be empty")]
    EmptyName(String),

    #[error("Target column '{0}' is listed in columns_to_drop")]
    TargetDropped(String),

    #[error("Value for '{field}' must be finite, got {value}")]
    NonFiniteValue { field: String, value: f64 },
}

/// Builder for [`PreparationConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PreparationConfigBuilder {
    columns_to_drop: Option<Vec<String>>,
    target_column: Option<String>,
    min_target_value: Option<f64>,
    capped_columns: Option<Vec<String>>,
    cap_percentile: Option<f64>,
    year_column: Option<String>,
    age_column: Option<String>,
    reference_year: Option<i32>,
    missing_column_threshold: Option<f64>,
}

impl PreparationConfigBuilder {
    /// Replace the list of columns dropped before cleaning.
    pub fn columns_to_drop<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_drop = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the target column.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the lower-bound sentinel for valid target values.
    pub fn min_target_value(mut self, value: f64) -> Self {
        self.min_target_value = Some(value);
        self
    }

    /// Replace the list of capped columns.
    pub fn capped_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capped_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the capping percentile.
    ///
    /// # Arguments
    /// * `percentile` - Value strictly between 0.0 and 1.0 (e.g., 0.99)
    pub fn cap_percentile(mut self, percentile: f64) -> Self {
        self.cap_percentile = Some(percentile);
        self
    }

    /// Set the model-year column.
    pub fn year_column(mut self, column: impl Into<String>) -> Self {
        self.year_column = Some(column.into());
        self
    }

    /// Set the derived age column name.
    pub fn age_column(mut self, column: impl Into<String>) -> Self {
        self.age_column = Some(column.into());
        self
    }

    /// Set the reference year for age derivation.
    pub fn reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    /// Set the threshold for dropping columns with missing values.
    ///
    /// # Arguments
    /// * `threshold` - Value strictly between 0.0 and 1.0 (e.g., 0.4 = 40%)
    pub fn missing_column_threshold(mut self, threshold: f64) -> Self {
        self.missing_column_threshold = Some(threshold);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PreparationConfig` or an error if validation fails.
    pub fn build(self) -> Result<PreparationConfig, ConfigValidationError> {
        let defaults = PreparationConfig::default();
        let config = PreparationConfig {
            columns_to_drop: self.columns_to_drop.unwrap_or(defaults.columns_to_drop),
            target_column: self.target_column.unwrap_or(defaults.target_column),
            min_target_value: self.min_target_value.unwrap_or(defaults.min_target_value),
            capped_columns: self.capped_columns.unwrap_or(defaults.capped_columns),
            cap_percentile: self.cap_percentile.unwrap_or(defaults.cap_percentile),
            year_column: self.year_column.unwrap_or(defaults.year_column),
            age_column: self.age_column.unwrap_or(defaults.age_column),
            reference_year: self.reference_year.unwrap_or(defaults.reference_year),
            missing_column_threshold: self
                .missing_column_threshold
                .unwrap_or(defaults.missing_column_threshold),
        };

        config.validate()?;
        Ok(config)
    }
}
