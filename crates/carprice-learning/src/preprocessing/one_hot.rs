//! One-hot encoding for categorical features.
//!
//! Categories are learned from the training split and sorted
//! lexicographically. Values never seen during fit encode as an all-zero
//! indicator block instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct OneHotEncoder;

impl OneHotEncoder {
    pub fn fit<S: AsRef<str>>(&self, values: &[S]) -> FittedOneHotEncoder {
        let categories: BTreeSet<&str> = values.iter().map(|v| v.as_ref()).collect();
        FittedOneHotEncoder {
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    /// Sorted, unique.
    pub categories: Vec<String>,
}

impl FittedOneHotEncoder {
    /// Width of this encoder's indicator block.
    pub fn n_features_out(&self) -> usize {
        self.categories.len()
    }

    /// Position of `value` in the indicator block, `None` if unseen.
    #[inline]
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }

    /// Check the sorted-unique invariant after deserialization.
    pub fn is_well_formed(&self) -> bool {
        self.categories.windows(2).all(|w| w[0] < w[1])
    }
}
