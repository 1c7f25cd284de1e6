//! Standardisation to zero mean and unit variance.

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

impl StandardScaler {
    /// Learn mean and population standard deviation.
    ///
    /// Nulls are skipped. A zero or non-finite spread uses scale 1.0 so
    /// constant columns map to 0.
    pub fn fit(&self, values: &Series) -> Result<FittedStandardScaler> {
        let values = values.cast(&DataType::Float64)?;
        let values = values.f64()?;

        let mean = values.mean().filter(|m| m.is_finite()).unwrap_or(0.0);
        let scale = values
            .std(0)
            .filter(|s| *s > 0.0 && s.is_finite())
            .unwrap_or(1.0);

        Ok(FittedStandardScaler { mean, scale })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedStandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl FittedStandardScaler {
    #[inline]
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}
