use crate::profiler::ColumnSchema;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Outcome of capping one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapReport {
    pub column: String,
    pub percentile: f64,
    pub cap_value: f64,
    pub values_capped: usize,
}

/// Outcome of the initial cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Configured drop-columns that were actually present.
    pub columns_dropped: Vec<String>,
    pub rows_before: usize,
    pub rows_with_null_target: usize,
    pub rows_below_min_target: usize,
    pub rows_after: usize,
}

impl CleaningReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_with_null_target + self.rows_below_min_target
    }
}

/// A column removed by the missing-value pruner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedColumn {
    pub name: String,
    pub missing_fraction: f64,
}

/// Outcome of the feature derivation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationReport {
    pub source_column: String,
    pub derived_column: String,
    pub reference_year: i32,
    /// False when the table already carried the derived column.
    pub applied: bool,
    pub null_count: usize,
}

/// Everything the preparation run did, for logs and reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparationSummary {
    pub rows_before: usize,
    pub columns_before: usize,
    pub rows_after: usize,
    pub columns_after: usize,
    pub cleaning: CleaningReport,
    pub caps: Vec<CapReport>,
    pub derivation: Option<DerivationReport>,
    pub pruned_columns: Vec<DroppedColumn>,
    pub duration_ms: u64,
}

/// A cleaned table together with the schema inferred from it.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub data: DataFrame,
    pub schema: ColumnSchema,
    pub summary: PreparationSummary,
}
