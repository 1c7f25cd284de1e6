//! Data cleaning module for vehicle listings.
//!
//! This module provides functionality for:
//! - Dropping configured identifier and free-text columns
//! - Removing rows with a missing target
//! - Removing rows whose target is a placeholder value
//! - Pruning columns with too many missing values (see [`MissingValuePruner`])

mod pruner;

pub use pruner::MissingValuePruner;

use crate::error::{PreparationError, Result};
use crate::types::CleaningReport;
use crate::utils::{has_column, numeric_column};
use polars::prelude::*;
use tracing::{debug, info};

/// Initial cleaning pass run before any statistics are computed.
pub struct InitialCleaner;

impl InitialCleaner {
    /// Drop configured columns and remove rows without a usable target.
    ///
    /// The steps run in this order:
    /// 1. Remove every column in `columns_to_drop` that exists; absent names are ignored
    /// 2. Remove rows where `target` is null
    /// 3. Remove rows where `target <= min_target`
    ///
    /// Surviving rows keep their relative order.
    ///
    /// # Errors
    ///
    /// - [`PreparationError::ColumnNotFound`] if `target` is absent
    /// - [`PreparationError::NonNumericColumn`] if `target` is not numeric
    /// - [`PreparationError::EmptyDataset`] if no rows survive
    pub fn clean(
        df: DataFrame,
        columns_to_drop: &[String],
        target: &str,
        min_target: f64,
    ) -> Result<(DataFrame, CleaningReport)> {
        let mut df = df;
        let mut report = CleaningReport {
            rows_before: df.height(),
            ..Default::default()
        };

        info!("Performing initial data cleaning...");

        // 1. Drop configured columns
        let present: Vec<String> = columns_to_drop
            .iter()
            .filter(|name| has_column(&df, name))
            .cloned()
            .collect();

        if !present.is_empty() {
            let cols_ref: Vec<PlSmallStr> = present.iter().map(|s| s.as_str().into()).collect();
            df = df.drop_many(cols_ref);
            debug!("Dropped {} configured columns: {:?}", present.len(), present);
        }
        report.columns_dropped = present;

        // 2 + 3. Missing and placeholder targets
        let values = numeric_column(&df, target)?;
        let mut null_target = 0usize;
        let mut below_min = 0usize;
        let keep: Vec<bool> = values
            .into_iter()
            .map(|v| match v {
                Some(val) if val.is_nan() => {
                    null_target += 1;
                    false
                }
                Some(val) if val <= min_target => {
                    below_min += 1;
                    false
                }
                Some(_) => true,
                None => {
                    null_target += 1;
                    false
                }
            })
            .collect();

        if null_target + below_min > 0 {
            let mask = BooleanChunked::from_slice("mask".into(), &keep);
            df = df.filter(&mask)?;
        }

        report.rows_with_null_target = null_target;
        report.rows_below_min_target = below_min;
        report.rows_after = df.height();

        if df.height() == 0 {
            return Err(PreparationError::EmptyDataset(format!(
                "no rows with '{}' greater than {} remain after cleaning",
                target, min_target
            )));
        }

        info!(
            "Initial cleaning removed {} rows ({} missing target, {} at or below {}), {} remain",
            report.rows_removed(),
            null_target,
            below_min,
            min_target,
            report.rows_after
        );

        Ok((df, report))
    }
}
