//! Missing-value imputation from training-split statistics.

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fill value used when a categorical column has no observed values.
pub const MISSING_CATEGORY: &str = "missing";

/// Median imputer for numeric columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianImputer;

impl MedianImputer {
    /// Learn the median of the non-missing, finite values.
    ///
    /// An even count averages the two middle values. A column with no
    /// observed values imputes 0.0.
    pub fn fit(&self, values: &Series) -> Result<FittedMedianImputer> {
        let values = values.cast(&DataType::Float64)?;
        let observed: Float64Chunked = values
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();

        Ok(match observed.median() {
            Some(statistic) => FittedMedianImputer {
                statistic,
                all_missing: false,
            },
            None => FittedMedianImputer {
                statistic: 0.0,
                all_missing: true,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedMedianImputer {
    pub statistic: f64,
    /// True when the training split had no observed values.
    #[serde(default)]
    pub all_missing: bool,
}

impl FittedMedianImputer {
    #[inline]
    pub fn transform(&self, value: Option<f64>) -> f64 {
        match value {
            Some(v) if v.is_finite() => v,
            _ => self.statistic,
        }
    }
}

/// Most-frequent imputer for categorical columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct MostFrequentImputer;

impl MostFrequentImputer {
    /// Learn the most frequent non-missing value.
    ///
    /// Ties go to the lexicographically smallest value.
    pub fn fit(&self, values: &Series) -> Result<FittedMostFrequentImputer> {
        let observed = values
            .cast(&DataType::String)?
            .drop_nulls()
            .with_name("value".into());
        let counts = observed.value_counts(false, false, "count".into(), false)?;
        let levels = counts.column("value")?.as_materialized_series().str()?;
        let tallies = counts.column("count")?.cast(&DataType::UInt64)?;
        let tallies = tallies.as_materialized_series().u64()?;

        let mut best: Option<(&str, u64)> = None;
        for (level, count) in levels.into_iter().zip(tallies) {
            let (Some(level), Some(count)) = (level, count) else {
                continue;
            };
            if best.is_none_or(|(l, c)| count > c || (count == c && level < l)) {
                best = Some((level, count));
            }
        }

        Ok(FittedMostFrequentImputer {
            statistic: best
                .map(|(level, _)| level.to_string())
                .unwrap_or_else(|| MISSING_CATEGORY.to_string()),
            all_missing: best.is_none(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedMostFrequentImputer {
    pub statistic: String,
    #[serde(default)]
    pub all_missing: bool,
}

impl FittedMostFrequentImputer {
    #[inline]
    pub fn transform<'a>(&'a self, value: Option<&'a str>) -> &'a str {
        value.unwrap_or(&self.statistic)
    }
}
