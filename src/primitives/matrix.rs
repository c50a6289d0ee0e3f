//! Matrix type for 2D numeric data.

use super::Vector;
use crate::error::{AgruparError, Result};
use serde::{Deserialize, Serialize};

/// A 2D matrix of floating-point values (row-major storage).
///
/// Sample matrices are `(n_instances, n_features)`; centroid matrices are
/// `(n_clusters, n_features)`.
///
/// # Examples
///
/// ```
/// use agrupar::primitives::Matrix;
///
/// let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("data length matches rows * cols");
/// assert_eq!(m.shape(), (2, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy> Matrix<T> {
    /// Creates a new matrix from a vector of data.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(AgruparError::DimensionMismatch {
                expected: format!("{rows}x{cols}={} elements", rows * cols),
                actual: format!("{} elements", data.len()),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// Returns true if the matrix holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Sets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    /// Returns a row as a Vector.
    #[must_use]
    pub fn row(&self, row_idx: usize) -> Vector<T> {
        Vector::from_slice(self.row_slice(row_idx))
    }

    /// Borrows a row without copying.
    ///
    /// # Panics
    ///
    /// Panics if `row_idx >= n_rows()`.
    #[must_use]
    pub fn row_slice(&self, row_idx: usize) -> &[T] {
        let start = row_idx * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Iterates over rows as slices.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |i| self.row_slice(i))
    }

    /// Gathers the given rows into a new matrix, in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if any index is out of bounds.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &idx in indices {
            if idx >= self.rows {
                return Err(AgruparError::invalid_argument(format!(
                    "row index {idx} out of bounds (rows={})",
                    self.rows
                )));
            }
            data.extend_from_slice(self.row_slice(idx));
        }
        Ok(Self {
            data,
            rows: indices.len(),
            cols: self.cols,
        })
    }

    /// Stacks matrices vertically.
    ///
    /// # Errors
    ///
    /// Returns an error if the column counts differ.
    pub fn vstack(parts: &[&Self]) -> Result<Self> {
        let cols = parts.first().map_or(0, |m| m.cols);
        let mut data = Vec::with_capacity(parts.iter().map(|m| m.data.len()).sum());
        let mut rows = 0;
        for part in parts {
            if part.cols != cols {
                return Err(AgruparError::dimension_mismatch("cols", cols, part.cols));
            }
            data.extend_from_slice(&part.data);
            rows += part.rows;
        }
        Ok(Self { data, rows, cols })
    }

    /// Returns the underlying data as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consumes the matrix and returns its row-major data.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl Matrix<f32> {
    /// Creates a matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Creates a matrix filled with `value`.
    #[must_use]
    pub fn full(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Matrix-vector multiplication.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match.
    pub fn matvec(&self, vec: &Vector<f32>) -> Result<Vector<f32>> {
        if self.cols != vec.len() {
            return Err(AgruparError::dimension_mismatch(
                "vector length",
                self.cols,
                vec.len(),
            ));
        }

        let result: Vec<f32> = self
            .rows_iter()
            .map(|row| row.iter().zip(vec.as_slice()).map(|(a, b)| a * b).sum())
            .collect();

        Ok(Vector::from_vec(result))
    }

    /// Returns a copy with every row scaled to unit L2 norm.
    ///
    /// All-zero rows stay zero.
    #[must_use]
    pub fn normalize_rows(&self) -> Self {
        let mut data = self.data.clone();
        if self.cols > 0 {
            for row in data.chunks_mut(self.cols) {
                let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    row.iter_mut().for_each(|x| *x /= norm);
                }
            }
        }
        Self {
            data,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Returns true if every element is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Squared Euclidean distance between row `i` of `self` and row `j` of
    /// `other`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds or the column counts differ.
    #[must_use]
    pub fn row_distance_squared(&self, i: usize, other: &Self, j: usize) -> f32 {
        debug_assert_eq!(self.cols, other.cols);
        self.row_slice(i)
            .iter()
            .zip(other.row_slice(j))
            .map(|(a, b)| {
                let diff = a - b;
                diff * diff
            })
            .sum()
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
