//! Column role inference.
//!
//! After cleaning, every remaining column is either a numeric feature, a
//! categorical feature, the target or excluded. The schema records the
//! decision for each one so the fitted pipeline never has to re-derive it.

use crate::error::{PreparationError, Result};
use crate::utils::{DtypeCategory, get_dtype_category, has_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Role of a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Numeric,
    Categorical,
}

impl ColumnRole {
    /// Classify a dtype. Returns `None` for dtypes that are neither.
    pub fn from_dtype(dtype: &DataType) -> Option<Self> {
        match get_dtype_category(dtype) {
            DtypeCategory::Numeric => Some(Self::Numeric),
            DtypeCategory::String => Some(Self::Categorical),
            _ => None,
        }
    }
}

/// A classified feature column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub role: ColumnRole,
    /// Polars dtype at inference time, for reporting.
    pub dtype: String,
}

/// Why a column is not a model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Listed in the configured drop-columns.
    ExplicitlyDropped,
    /// Missing fraction above the pruning threshold.
    HighMissingFraction,
    /// Dtype is neither numeric nor text.
    Unclassified,
    /// The prediction target.
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedColumn {
    pub name: String,
    pub reason: ExclusionReason,
}

/// Role mapping for a prepared table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub target: String,
    /// Feature columns in table order.
    pub columns: Vec<ColumnSpec>,
    pub excluded: Vec<ExcludedColumn>,
}

impl ColumnSchema {
    /// Classify every column of `df` by dtype.
    ///
    /// The target is excluded with [`ExclusionReason::Target`]; boolean,
    /// temporal and other dtypes are excluded as unclassified and logged.
    pub fn infer(df: &DataFrame, target: &str) -> Result<Self> {
        if !has_column(df, target) {
            return Err(PreparationError::ColumnNotFound(target.to_string()));
        }

        let mut columns = Vec::new();
        let mut excluded = Vec::new();

        for col in df.get_columns() {
            let name = col.name().to_string();
            if name == target {
                excluded.push(ExcludedColumn {
                    name,
                    reason: ExclusionReason::Target,
                });
                continue;
            }

            match ColumnRole::from_dtype(col.dtype()) {
                Some(role) => {
                    debug!("Column '{}' ({}) classified as {:?}", name, col.dtype(), role);
                    columns.push(ColumnSpec {
                        name,
                        role,
                        dtype: col.dtype().to_string(),
                    });
                }
                None => {
                    warn!(
                        "Column '{}' has dtype {} and will not be used as a feature",
                        name,
                        col.dtype()
                    );
                    excluded.push(ExcludedColumn {
                        name,
                        reason: ExclusionReason::Unclassified,
                    });
                }
            }
        }

        if columns.is_empty() {
            return Err(PreparationError::EmptyDataset(
                "no numeric or categorical feature columns remain".to_string(),
            ));
        }

        Ok(Self {
            target: target.to_string(),
            columns,
            excluded,
        })
    }

    /// Record columns removed before inference.
    pub fn with_exclusions<I, S>(mut self, names: I, reason: ExclusionReason) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(|name| ExcludedColumn {
            name: name.into(),
            reason,
        }));
        self
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_with_role(ColumnRole::Numeric)
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_with_role(ColumnRole::Categorical)
    }

    /// All feature columns in table order.
    pub fn feature_columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn role_of(&self, name: &str) -> Option<ColumnRole> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.role)
    }

    pub fn excluded_with(&self, reason: ExclusionReason) -> Vec<String> {
        self.excluded
            .iter()
            .filter(|c| c.reason == reason)
            .map(|c| c.name.clone())
            .collect()
    }

    fn columns_with_role(&self, role: ColumnRole) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.role == role)
            .map(|c| c.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prepared() -> DataFrame {
        df![
            "price" => [5000.0, 6000.0],
            "odometer" => [Some(1000.0), None],
            "condition" => [Some("good"), None],
            "fuel" => ["gas", "diesel"],
            "is_dealer" => [true, false],
            "vehicle_age" => [3.0, 10.0],
        ]
        .unwrap()
    }

    #[test]
    fn test_infer_roles_by_dtype() {
        let schema = ColumnSchema::infer(&prepared(), "price").unwrap();

        assert_eq!(schema.numeric_columns(), vec!["odometer", "vehicle_age"]);
        assert_eq!(schema.categorical_columns(), vec!["condition", "fuel"]);
        assert_eq!(
            schema.feature_columns(),
            vec!["odometer", "condition", "fuel", "vehicle_age"]
        );
        assert_eq!(schema.role_of("fuel"), Some(ColumnRole::Categorical));
        assert_eq!(schema.role_of("price"), None);
    }

    #[test]
    fn test_infer_excludes_target_and_unclassified() {
        let schema = ColumnSchema::infer(&prepared(), "price").unwrap();
        assert_eq!(schema.excluded_with(ExclusionReason::Target), vec!["price"]);
        assert_eq!(
            schema.excluded_with(ExclusionReason::Unclassified),
            vec!["is_dealer"]
        );
    }

    #[test]
    fn test_with_exclusions() {
        let schema = ColumnSchema::infer(&prepared(), "price")
            .unwrap()
            .with_exclusions(["id", "vin"], ExclusionReason::ExplicitlyDropped)
            .with_exclusions(["size"], ExclusionReason::HighMissingFraction);

        assert_eq!(
            schema.excluded_with(ExclusionReason::ExplicitlyDropped),
            vec!["id", "vin"]
        );
        assert_eq!(
            schema.excluded_with(ExclusionReason::HighMissingFraction),
            vec!["size"]
        );
    }

    #[test]
    fn test_infer_missing_target() {
        let err = ColumnSchema::infer(&prepared(), "msrp").unwrap_err();
        assert!(matches!(err, PreparationError::ColumnNotFound(_)));
    }

    #[test]
    fn test_infer_no_features() {
        let df = df!["price" => [1.0, 2.0]].unwrap();
        let err = ColumnSchema::infer(&df, "price").unwrap_err();
        assert!(matches!(err, PreparationError::EmptyDataset(_)));
    }

    #[test]
    fn test_schema_serde() {
        let schema = ColumnSchema::infer(&prepared(), "price").unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("\"categorical\""));
        assert!(json.contains("\"unclassified\""));
        let back: ColumnSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
