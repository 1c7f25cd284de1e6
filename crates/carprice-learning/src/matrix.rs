//! Transformed feature matrix.
//!
//! Scaled numeric features are stored dense and row-major. One-hot indicators
//! are stored in compressed sparse row form: each row lists the indices of
//! its active indicators, every stored value is implicitly 1.0. Feature `j`
//! is dense for `j < n_dense` and indicator `j - n_dense` otherwise.

use crate::error::{LearningError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_dense: usize,
    n_sparse: usize,
    dense: Vec<f64>,
    indptr: Vec<usize>,
    indices: Vec<u32>,
}

impl FeatureMatrix {
    /// Assemble a matrix from its parts.
    ///
    /// `dense` holds `n_rows * n_dense` values row-major; `indptr` has
    /// `n_rows + 1` entries delimiting each row's slice of `indices`.
    pub fn from_parts(
        n_rows: usize,
        n_dense: usize,
        dense: Vec<f64>,
        n_sparse: usize,
        indptr: Vec<usize>,
        indices: Vec<u32>,
    ) -> Result<Self> {
        if dense.len() != n_rows * n_dense {
            return Err(LearningError::InvalidData(format!(
                "dense block has {} values, expected {} x {}",
                dense.len(),
                n_rows,
                n_dense
            )));
        }
        if indptr.len() != n_rows + 1 || indptr.last().copied() != Some(indices.len()) {
            return Err(LearningError::InvalidData(
                "sparse row pointers do not match the index array".to_string(),
            ));
        }
        if indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(LearningError::InvalidData(
                "sparse row pointers must be non-decreasing".to_string(),
            ));
        }
        if indices.iter().any(|&i| i as usize >= n_sparse) {
            return Err(LearningError::InvalidData(format!(
                "sparse index out of range for {} indicators",
                n_sparse
            )));
        }
        Ok(Self {
            n_rows,
            n_dense,
            n_sparse,
            dense,
            indptr,
            indices,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_dense(&self) -> usize {
        self.n_dense
    }

    pub fn n_sparse(&self) -> usize {
        self.n_sparse
    }

    /// Total feature width.
    pub fn n_features(&self) -> usize {
        self.n_dense + self.n_sparse
    }

    /// Stored one-hot entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn dense_row(&self, row: usize) -> &[f64] {
        let start = row * self.n_dense;
        &self.dense[start..start + self.n_dense]
    }

    #[inline]
    pub fn dense_value(&self, row: usize, col: usize) -> f64 {
        self.dense[row * self.n_dense + col]
    }

    /// Active indicator indices of a row, ascending.
    #[inline]
    pub fn sparse_row(&self, row: usize) -> &[u32] {
        &self.indices[self.indptr[row]..self.indptr[row + 1]]
    }

    /// Materialize row `row` as a dense vector of all features.
    pub fn to_dense_row(&self, row: usize) -> Vec<f64> {
        let mut out = vec![0.0; self.n_features()];
        out[..self.n_dense].copy_from_slice(self.dense_row(row));
        for &idx in self.sparse_row(row) {
            out[self.n_dense + idx as usize] = 1.0;
        }
        out
    }

    /// The whole matrix as one CSR triple `(indptr, indices, values)`.
    ///
    /// Each row stores every dense value, then its active indicators as
    /// columns `n_dense + i` with value 1.0. Inactive indicators are absent.
    pub fn to_csr(&self) -> (Vec<usize>, Vec<usize>, Vec<f32>) {
        let nnz = self.n_rows * self.n_dense + self.indices.len();
        let mut indptr = Vec::with_capacity(self.n_rows + 1);
        let mut indices = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);
        indptr.push(0);
        for row in 0..self.n_rows {
            for (col, &v) in self.dense_row(row).iter().enumerate() {
                indices.push(col);
                values.push(v as f32);
            }
            for &idx in self.sparse_row(row) {
                indices.push(self.n_dense + idx as usize);
                values.push(1.0);
            }
            indptr.push(indices.len());
        }
        (indptr, indices, values)
    }
}
