//! Feature preprocessing fitted on the training split.
//!
//! Numeric columns are median-imputed and standardised; categorical columns
//! are most-frequent-imputed and one-hot encoded. [`ColumnTransformer`]
//! combines both branches into a single [`FeatureMatrix`](crate::FeatureMatrix).

mod column_transformer;
pub mod imputer;
pub mod one_hot;
pub mod scaler;

pub use column_transformer::{
    CategoricalBranch, ColumnTransformer, FittedColumnTransformer, NumericBranch,
};
pub use imputer::{
    FittedMedianImputer, FittedMostFrequentImputer, MISSING_CATEGORY, MedianImputer,
    MostFrequentImputer,
};
pub use one_hot::{FittedOneHotEncoder, OneHotEncoder};
pub use scaler::{FittedStandardScaler, StandardScaler};
