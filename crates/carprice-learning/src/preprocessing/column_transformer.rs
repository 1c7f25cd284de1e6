//! ColumnTransformer implementation.
//!
//! Applies a numeric branch (median imputation, then standardisation) and a
//! categorical branch (most-frequent imputation, then one-hot encoding) to
//! their column lists and concatenates the results into a [`FeatureMatrix`].
//! Columns in neither list are dropped.

use crate::error::{LearningError, Result};
use crate::matrix::FeatureMatrix;
use crate::preprocessing::imputer::{
    FittedMedianImputer, FittedMostFrequentImputer, MedianImputer, MostFrequentImputer,
};
use crate::preprocessing::one_hot::{FittedOneHotEncoder, OneHotEncoder};
use crate::preprocessing::scaler::{FittedStandardScaler, StandardScaler};
use carprice_processing::{ColumnRole, ColumnSchema};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Unfitted transformer: which columns go through which branch.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTransformer {
    numeric: Vec<String>,
    categorical: Vec<String>,
}

impl ColumnTransformer {
    /// Create a transformer from two disjoint column lists.
    ///
    /// # Errors
    ///
    /// [`LearningError::InvalidConfig`] if a column appears twice, in either
    /// or both lists, or if both lists are empty.
    pub fn new(numeric: Vec<String>, categorical: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in numeric.iter().chain(categorical.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(LearningError::InvalidConfig(format!(
                    "column '{}' is assigned to more than one branch",
                    name
                )));
            }
        }
        if seen.is_empty() {
            return Err(LearningError::InvalidConfig(
                "column transformer needs at least one feature column".to_string(),
            ));
        }
        Ok(Self {
            numeric,
            categorical,
        })
    }

    /// Branch lists taken from an inferred schema.
    pub fn from_schema(schema: &ColumnSchema) -> Result<Self> {
        Self::new(schema.numeric_columns(), schema.categorical_columns())
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical
    }

    /// Fit every branch on `df`, the training split without its target.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedColumnTransformer> {
        if df.height() == 0 {
            return Err(LearningError::InvalidData(
                "cannot fit the column transformer on an empty table".to_string(),
            ));
        }

        let listed: HashSet<&str> = self
            .numeric
            .iter()
            .chain(self.categorical.iter())
            .map(String::as_str)
            .collect();

        for name in df.get_column_names() {
            if !listed.contains(name.as_str()) {
                warn!(
                    "Column '{}' is in neither the numeric nor the categorical list and is dropped",
                    name
                );
            }
        }

        let feature_names_in: Vec<String> = df
            .get_column_names()
            .iter()
            .filter(|name| listed.contains(name.as_str()))
            .map(|name| name.to_string())
            .collect();

        let mut numeric = Vec::with_capacity(self.numeric.len());
        for column in &self.numeric {
            let values = input_series(df, column)?;
            let imputer = MedianImputer.fit(values)?;
            if imputer.all_missing {
                warn!("Numeric column '{}' has no observed values, imputing 0", column);
            }
            let imputed: Float64Chunked = numeric_values(df, column)?
                .into_iter()
                .map(|v| Some(imputer.transform(v)))
                .collect();
            let scaler = StandardScaler.fit(&imputed.into_series())?;
            debug!(
                "Numeric '{}': median {:.3}, mean {:.3}, scale {:.3}",
                column, imputer.statistic, scaler.mean, scaler.scale
            );
            numeric.push(NumericBranch {
                column: column.clone(),
                imputer,
                scaler,
            });
        }

        let mut categorical = Vec::with_capacity(self.categorical.len());
        for column in &self.categorical {
            let values = categorical_values(df, column)?;
            let imputer = MostFrequentImputer.fit(input_series(df, column)?)?;
            if imputer.all_missing {
                warn!(
                    "Categorical column '{}' has no observed values, imputing '{}'",
                    column, imputer.statistic
                );
            }
            let imputed: Vec<&str> = values
                .iter()
                .map(|v| imputer.transform(v.as_deref()))
                .collect();
            let encoder = OneHotEncoder.fit(&imputed);
            debug!(
                "Categorical '{}': most frequent '{}', {} categories",
                column,
                imputer.statistic,
                encoder.n_features_out()
            );
            categorical.push(CategoricalBranch {
                column: column.clone(),
                imputer,
                encoder,
            });
        }

        Ok(FittedColumnTransformer {
            feature_names_in,
            numeric,
            categorical,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericBranch {
    pub column: String,
    pub imputer: FittedMedianImputer,
    pub scaler: FittedStandardScaler,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalBranch {
    pub column: String,
    pub imputer: FittedMostFrequentImputer,
    pub encoder: FittedOneHotEncoder,
}

/// Fitted transformer with frozen input columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedColumnTransformer {
    feature_names_in: Vec<String>,
    numeric: Vec<NumericBranch>,
    categorical: Vec<CategoricalBranch>,
}

impl FittedColumnTransformer {
    /// Raw input columns in the order seen at fit time.
    pub fn feature_names_in(&self) -> &[String] {
        &self.feature_names_in
    }

    /// Encoded output names: `num__<col>` then `cat__<col>_<category>`.
    pub fn feature_names_out(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .numeric
            .iter()
            .map(|b| format!("num__{}", b.column))
            .collect();
        for branch in &self.categorical {
            for category in &branch.encoder.categories {
                names.push(format!("cat__{}_{}", branch.column, category));
            }
        }
        names
    }

    pub fn numeric_branches(&self) -> &[NumericBranch] {
        &self.numeric
    }

    pub fn categorical_branches(&self) -> &[CategoricalBranch] {
        &self.categorical
    }

    pub fn role_of(&self, column: &str) -> Option<ColumnRole> {
        if self.numeric.iter().any(|b| b.column == column) {
            Some(ColumnRole::Numeric)
        } else if self.categorical.iter().any(|b| b.column == column) {
            Some(ColumnRole::Categorical)
        } else {
            None
        }
    }

    pub fn n_dense(&self) -> usize {
        self.numeric.len()
    }

    pub fn n_sparse(&self) -> usize {
        self.categorical
            .iter()
            .map(|b| b.encoder.n_features_out())
            .sum()
    }

    pub fn n_features_out(&self) -> usize {
        self.n_dense() + self.n_sparse()
    }

    /// Transform a table into a feature matrix.
    ///
    /// Every expected input column must be present; other columns are
    /// ignored. Nulls are imputed, unseen categories encode as zeros.
    pub fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let n_rows = df.height();
        let n_dense = self.n_dense();

        for name in &self.feature_names_in {
            if df.column(name).is_err() {
                return Err(LearningError::MissingColumn(name.clone()));
            }
        }

        let mut dense = vec![0.0; n_rows * n_dense];
        for (j, branch) in self.numeric.iter().enumerate() {
            let values = numeric_values(df, &branch.column)?;
            for (row, value) in values.into_iter().enumerate() {
                dense[row * n_dense + j] = branch.scaler.transform(branch.imputer.transform(value));
            }
        }

        // Column-wise category lookups, then assembled row by row
        let mut offset = 0u32;
        let mut codes: Vec<Vec<Option<u32>>> = Vec::with_capacity(self.categorical.len());
        for branch in &self.categorical {
            let values = categorical_values(df, &branch.column)?;
            let column_codes: Vec<Option<u32>> = values
                .iter()
                .map(|v| {
                    branch
                        .encoder
                        .index_of(branch.imputer.transform(v.as_deref()))
                        .map(|i| offset + i as u32)
                })
                .collect();
            codes.push(column_codes);
            offset += branch.encoder.n_features_out() as u32;
        }

        let mut indptr = Vec::with_capacity(n_rows + 1);
        let mut indices = Vec::with_capacity(n_rows * self.categorical.len());
        indptr.push(0);
        for row in 0..n_rows {
            indices.extend(codes.iter().filter_map(|column| column[row]));
            indptr.push(indices.len());
        }

        FeatureMatrix::from_parts(n_rows, n_dense, dense, self.n_sparse(), indptr, indices)
    }

    /// Check internal consistency after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.feature_names_in.is_empty() {
            return Err(LearningError::Artifact(
                "transformer has no expected input columns".to_string(),
            ));
        }

        let expected: HashSet<&str> = self.feature_names_in.iter().map(String::as_str).collect();
        let mut branch_columns = HashSet::new();
        for column in self
            .numeric
            .iter()
            .map(|b| b.column.as_str())
            .chain(self.categorical.iter().map(|b| b.column.as_str()))
        {
            if !branch_columns.insert(column) {
                return Err(LearningError::Artifact(format!(
                    "column '{}' appears in more than one branch",
                    column
                )));
            }
        }
        if expected != branch_columns || expected.len() != self.feature_names_in.len() {
            return Err(LearningError::Artifact(
                "transformer branches do not match its expected input columns".to_string(),
            ));
        }

        for branch in &self.numeric {
            let s = &branch.scaler;
            if !(s.mean.is_finite() && s.scale.is_finite() && s.scale > 0.0)
                || !branch.imputer.statistic.is_finite()
            {
                return Err(LearningError::Artifact(format!(
                    "numeric branch '{}' has invalid statistics",
                    branch.column
                )));
            }
        }
        for branch in &self.categorical {
            if !branch.encoder.is_well_formed() {
                return Err(LearningError::Artifact(format!(
                    "categorical branch '{}' has unsorted or duplicate categories",
                    branch.column
                )));
            }
        }
        Ok(())
    }
}

fn input_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| LearningError::MissingColumn(name.to_string()))
}

/// Column values as floats. Unparsable and non-finite values become `None`.
fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let cast = input_series(df, name)?.cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

/// Column values rendered as strings.
fn categorical_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let cast = input_series(df, name)?.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}
