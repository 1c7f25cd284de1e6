//! Feature derivation.
//!
//! Replaces the model-year column with the vehicle's age in years relative to
//! a fixed reference year. The reference year is configuration, never the
//! clock, so the same table always derives the same ages.

use crate::error::{PreparationError, Result};
use crate::types::DerivationReport;
use crate::utils::{has_column, numeric_column};
use polars::prelude::*;
use tracing::{info, warn};

/// Derives engineered features from raw listing columns.
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Replace `year_column` with `age_column = reference_year - year`.
    ///
    /// The age column is appended as `Float64` and the year column removed.
    /// Null years give null ages. If the year column is absent but the age
    /// column already exists the table is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`PreparationError::ColumnNotFound`] if neither column is present
    /// - [`PreparationError::NonNumericColumn`] if the year column is not numeric
    pub fn derive_age(
        df: DataFrame,
        year_column: &str,
        age_column: &str,
        reference_year: i32,
    ) -> Result<(DataFrame, DerivationReport)> {
        if !has_column(&df, year_column) {
            if has_column(&df, age_column) {
                info!(
                    "'{}' absent and '{}' already present, skipping age derivation",
                    year_column, age_column
                );
                let null_count = df.column(age_column)?.null_count();
                return Ok((
                    df,
                    DerivationReport {
                        source_column: year_column.to_string(),
                        derived_column: age_column.to_string(),
                        reference_year,
                        applied: false,
                        null_count,
                    },
                ));
            }
            return Err(PreparationError::ColumnNotFound(year_column.to_string()));
        }

        let years = numeric_column(&df, year_column)?;
        let reference = f64::from(reference_year);
        let ages: Vec<Option<f64>> = years
            .into_iter()
            .map(|y| y.map(|year| reference - year))
            .collect();

        let negative = ages.iter().flatten().filter(|a| **a < 0.0).count();
        if negative > 0 {
            warn!(
                "{} rows have a '{}' later than {}, ages are negative",
                negative, year_column, reference_year
            );
        }

        let age_series = Series::new(age_column.into(), ages);
        let null_count = age_series.null_count();

        let mut df = df.drop(year_column)?;
        if has_column(&df, age_column) {
            df.replace(age_column, age_series)?;
        } else {
            df.with_column(age_series)?;
        }

        info!(
            "Derived '{}' from '{}' relative to {}",
            age_column, year_column, reference_year
        );

        Ok((
            df,
            DerivationReport {
                source_column: year_column.to_string(),
                derived_column: age_column.to_string(),
                reference_year,
                applied: true,
                null_count,
            },
        ))
    }
}
