//! Missing-value column pruning.

use crate::error::{PreparationError, Result};
use crate::types::DroppedColumn;
use crate::utils::missing_fraction;
use polars::prelude::*;
use tracing::{debug, info};

/// Removes columns whose missing fraction exceeds a threshold.
pub struct MissingValuePruner;

impl MissingValuePruner {
    /// Drop every column with a missing fraction strictly greater than
    /// `threshold`. Nulls are missing, and so is NaN in float columns.
    ///
    /// A column sitting exactly at the threshold is kept. Remaining columns
    /// keep their relative order. The dropped columns are returned in table
    /// order together with their missing fraction.
    pub fn prune(df: DataFrame, threshold: f64) -> Result<(DataFrame, Vec<DroppedColumn>)> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(PreparationError::InvalidConfig(format!(
                "missing column threshold must be in (0, 1), got {}",
                threshold
            )));
        }
        if df.height() == 0 {
            return Err(PreparationError::EmptyDataset(
                "cannot compute missing fractions of a table with no rows".to_string(),
            ));
        }

        let dropped: Vec<DroppedColumn> = df
            .get_columns()
            .iter()
            .filter_map(|col| {
                let fraction = missing_fraction(col);
                (fraction > threshold).then(|| DroppedColumn {
                    name: col.name().to_string(),
                    missing_fraction: fraction,
                })
            })
            .collect();

        if dropped.is_empty() {
            debug!("No columns above {:.0}% missing", threshold * 100.0);
            return Ok((df, dropped));
        }

        for col in &dropped {
            debug!(
                "Dropping '{}' ({:.1}% missing)",
                col.name,
                col.missing_fraction * 100.0
            );
        }

        let cols_ref: Vec<PlSmallStr> = dropped.iter().map(|c| c.name.as_str().into()).collect();
        let df = df.drop_many(cols_ref);

        info!(
            "Removed {} columns with >{:.0}% missing values: {:?}",
            dropped.len(),
            threshold * 100.0,
            dropped.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
        );

        Ok((df, dropped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_names;

    #[test]
    fn test_prune_drops_above_threshold() {
        let df = df![
            "full" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
            "mostly_empty" => [Some(1.0), None, None, None, Some(5.0)],
            "cylinders" => [Some("4"), None, Some("6"), Some("8"), Some("4")],
        ]
        .unwrap();

        let (df, dropped) = MissingValuePruner::prune(df, 0.4).unwrap();

        assert_eq!(column_names(&df), vec!["full", "cylinders"]);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].name, "mostly_empty");
        assert!((dropped[0].missing_fraction - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_prune_counts_nan_as_missing() {
        let df = df![
            "odometer" => [f64::NAN, f64::NAN, f64::NAN, 1.0, 2.0],
            "price" => [1.0, 2.0, 3.0, 4.0, 5.0],
        ]
        .unwrap();

        let (df, dropped) = MissingValuePruner::prune(df, 0.4).unwrap();

        assert_eq!(column_names(&df), vec!["price"]);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].name, "odometer");
        assert!((dropped[0].missing_fraction - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_prune_keeps_column_exactly_at_threshold() {
        // 2 of 5 missing = 0.4
        let df = df![
            "size" => [Some("full"), None, None, Some("mid"), Some("compact")],
        ]
        .unwrap();

        let (df, dropped) = MissingValuePruner::prune(df, 0.4).unwrap();
        assert!(dropped.is_empty());
        assert_eq!(df.width(), 1);
    }

    #[test]
    fn test_prune_is_noop_on_complete_table() {
        let df = df!["a" => [1, 2], "b" => ["x", "y"]].unwrap();
        let (pruned, dropped) = MissingValuePruner::prune(df.clone(), 0.4).unwrap();
        assert!(dropped.is_empty());
        assert!(pruned.equals(&df));
    }

    #[test]
    fn test_prune_empty_table() {
        let df = DataFrame::new(vec![Column::new("a".into(), Vec::<f64>::new())]).unwrap();
        let err = MissingValuePruner::prune(df, 0.4).unwrap_err();
        assert!(matches!(err, PreparationError::EmptyDataset(_)));
    }
}
