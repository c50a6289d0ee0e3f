//! Nearest-centroid assignment.

use crate::error::{AgruparError, Result};
use crate::primitives::Matrix;

/// Assigns each sample to the centroid with the smallest squared Euclidean
/// distance.
///
/// The scan is exhaustive, O(n·k·d). Ties go to the lowest centroid index.
/// Neither input is modified, and the result depends only on the inputs.
///
/// # Errors
///
/// Returns `InvalidArgument` if `centroids` has no rows, or
/// `DimensionMismatch` if the feature counts differ.
///
/// # Examples
///
/// ```
/// use agrupar::cluster::assign::assign_to_nearest;
/// use agrupar::primitives::Matrix;
///
/// let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 9.0, 10.0]).expect("4x1");
/// let c = Matrix::from_vec(2, 1, vec![0.0, 10.0]).expect("2x1");
/// assert_eq!(assign_to_nearest(&x, &c).expect("compatible"), vec![0, 0, 1, 1]);
/// ```
pub fn assign_to_nearest(x: &Matrix<f32>, centroids: &Matrix<f32>) -> Result<Vec<usize>> {
    check_compatible(x, centroids)?;
    Ok(x.rows_iter()
        .map(|point| nearest_centroid(point, centroids).0)
        .collect())
}

/// Full `(n_samples, n_clusters)` matrix of squared distances.
///
/// # Errors
///
/// Same conditions as [`assign_to_nearest`].
pub fn squared_distances(x: &Matrix<f32>, centroids: &Matrix<f32>) -> Result<Matrix<f32>> {
    check_compatible(x, centroids)?;
    let k = centroids.n_rows();
    let mut data = Vec::with_capacity(x.n_rows() * k);
    for i in 0..x.n_rows() {
        for c in 0..k {
            data.push(x.row_distance_squared(i, centroids, c));
        }
    }
    Matrix::from_vec(x.n_rows(), k, data)
}

/// Returns `(index, squared distance)` of the centroid nearest to `point`.
///
/// A centroid whose distance is NaN never wins; if every distance is NaN the
/// result is `(0, f32::INFINITY)`.
pub(crate) fn nearest_centroid(point: &[f32], centroids: &Matrix<f32>) -> (usize, f32) {
    let mut min_dist = f32::INFINITY;
    let mut min_cluster = 0;

    for (c, centroid) in centroids.rows_iter().enumerate() {
        let dist: f32 = point
            .iter()
            .zip(centroid)
            .map(|(a, b)| {
                let diff = a - b;
                diff * diff
            })
            .sum();

        if dist < min_dist {
            min_dist = dist;
            min_cluster = c;
        }
    }

    (min_cluster, min_dist)
}

fn check_compatible(x: &Matrix<f32>, centroids: &Matrix<f32>) -> Result<()> {
    if centroids.n_rows() == 0 {
        return Err(AgruparError::invalid_argument(
            "centroid matrix has no rows",
        ));
    }
    if x.n_cols() != centroids.n_cols() {
        return Err(AgruparError::dimension_mismatch(
            "n_features",
            centroids.n_cols(),
            x.n_cols(),
        ));
    }
    Ok(())
}
