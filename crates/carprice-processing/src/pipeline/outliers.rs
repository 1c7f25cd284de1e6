//! Outlier handling module.
//!
//! Caps a numeric column from above at one of its own percentiles. Rows are
//! never removed; only values beyond the cap change.

use crate::error::{PreparationError, Result};
use crate::types::CapReport;
use crate::utils::{linear_quantile, numeric_column};
use polars::prelude::*;
use tracing::{debug, info};

/// Handles outlier treatment.
pub struct OutlierCapper;

impl OutlierCapper {
    /// Cap `column` at its `percentile`-th linear-interpolated quantile.
    ///
    /// Every non-null value strictly greater than the quantile is replaced by
    /// it; values at or below are left untouched and nulls stay null. The
    /// column is rewritten as `Float64`.
    ///
    /// # Errors
    ///
    /// - [`PreparationError::InvalidConfig`] if `percentile` is not in (0, 1)
    /// - [`PreparationError::ColumnNotFound`] if the column is absent
    /// - [`PreparationError::NonNumericColumn`] if the column is not numeric
    /// - [`PreparationError::NoValidValues`] if the column has no non-null values
    pub fn cap_upper(
        df: &mut DataFrame,
        column: &str,
        percentile: f64,
    ) -> Result<CapReport> {
        if !(percentile > 0.0 && percentile < 1.0) {
            return Err(PreparationError::InvalidConfig(format!(
                "cap percentile must be in (0, 1), got {}",
                percentile
            )));
        }

        let values = numeric_column(df, column)?;
        let cap_value = linear_quantile(&values, percentile)
            .ok_or_else(|| PreparationError::NoValidValues(column.to_string()))?;

        let values_capped = values
            .into_iter()
            .filter(|v| v.is_some_and(|val| val > cap_value))
            .count();

        let capped = values.apply(|v| v.map(|val| if val > cap_value { cap_value } else { val }));
        df.replace(column, capped.into_series())?;

        info!(
            "Outliers in '{}' capped at {:.2} ({}th percentile), {} values changed",
            column,
            cap_value,
            percentile * 100.0,
            values_capped
        );

        Ok(CapReport {
            column: column.to_string(),
            percentile,
            cap_value,
            values_capped,
        })
    }

    /// Cap several columns in order, each at the same percentile.
    ///
    /// Percentiles are computed per column on the table as it stands when
    /// that column is reached.
    pub fn cap_columns(
        df: &mut DataFrame,
        columns: &[String],
        percentile: f64,
    ) -> Result<Vec<CapReport>> {
        let mut reports = Vec::with_capacity(columns.len());
        for column in columns {
            let report = Self::cap_upper(df, column, percentile)?;
            debug!("Cap report: {:?}", report);
            reports.push(report);
        }
        Ok(reports)
    }
}
