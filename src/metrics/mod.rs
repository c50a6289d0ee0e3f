//! Evaluation metrics for clustering and classification.

use crate::primitives::Matrix;

/// Computes the within-cluster sum of squared distances (inertia).
///
/// # Examples
///
/// ```
/// use agrupar::metrics::inertia;
/// use agrupar::primitives::Matrix;
///
/// let x = Matrix::from_vec(2, 1, vec![0.0, 2.0]).expect("2x1");
/// let c = Matrix::from_vec(1, 1, vec![1.0]).expect("1x1");
/// assert!((inertia(&x, &c, &[0, 0]) - 2.0).abs() < 1e-6);
/// ```
///
/// # Panics
///
/// Panics if a label is not a valid centroid row.
#[must_use]
pub fn inertia(data: &Matrix<f32>, centroids: &Matrix<f32>, labels: &[usize]) -> f32 {
    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| data.row_distance_squared(i, centroids, label))
        .sum()
}

/// Number of samples assigned to each of `n_clusters` clusters.
///
/// Labels `>= n_clusters` are ignored.
#[must_use]
pub fn cluster_sizes(labels: &[usize], n_clusters: usize) -> Vec<usize> {
    let mut sizes = vec![0; n_clusters];
    for &label in labels {
        if let Some(size) = sizes.get_mut(label) {
            *size += 1;
        }
    }
    sizes
}

/// Compute classification accuracy.
///
/// accuracy = `correct_predictions` / `total_predictions`
///
/// # Panics
///
/// Panics if the slices have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use agrupar::metrics::accuracy;
///
/// let y_true = vec![0, 1, 2, 0, 1, 2];
/// let y_pred = vec![0, 2, 1, 0, 0, 1];
/// let acc = accuracy(&y_pred, &y_true);
/// assert!((acc - 0.333333).abs() < 0.001);
/// ```
#[must_use]
pub fn accuracy<T: PartialEq>(y_pred: &[T], y_true: &[T]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    correct as f32 / y_true.len() as f32
}
