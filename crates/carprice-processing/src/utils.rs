//! Shared utilities for the data preparation stages.
//!
//! Helpers used across the cleaner, capper, deriver and schema modules, and
//! re-exported for the learning crate so both sides agree on what counts as
//! a numeric column.

use crate::error::{PreparationError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preparation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/categorical text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time | DataType::Duration(_)
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Column Access Utilities
// =============================================================================

/// Names of all columns in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Check whether a column exists.
#[inline]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Fetch a column as a materialized series, failing if absent.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| PreparationError::ColumnNotFound(name.to_string()))
}

/// Fetch a numeric column cast to `Float64`.
///
/// Fails with [`PreparationError::NonNumericColumn`] when the column dtype is
/// not an integer or float type. String columns are rejected rather than
/// parsed: a textual price column means the input file is malformed.
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let series = require_column(df, name)?;
    if !is_numeric_dtype(series.dtype()) {
        return Err(PreparationError::NonNumericColumn {
            column: name.to_string(),
            dtype: series.dtype().to_string(),
        });
    }
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast.f64()?.clone())
}

/// Missing values in a column: nulls, plus NaN for float columns.
pub fn missing_count(column: &Column) -> usize {
    let nulls = column.null_count();
    if !column.dtype().is_float() {
        return nulls;
    }
    let nans = column
        .as_materialized_series()
        .is_nan()
        .ok()
        .and_then(|mask| mask.sum())
        .unwrap_or(0);
    nulls + nans as usize
}

/// Fraction of missing values in a column (see [`missing_count`]).
/// Returns 0.0 for an empty column.
pub fn missing_fraction(column: &Column) -> f64 {
    let len = column.len();
    if len == 0 {
        return 0.0;
    }
    missing_count(column) as f64 / len as f64
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Linear-interpolated quantile of the non-null values.
///
/// Uses the position `q * (n - 1)` in the ascending sorted values and
/// interpolates between its neighbours. Returns `None` when there are no
/// non-null values.
pub fn linear_quantile(values: &Float64Chunked, q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().flatten().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}
