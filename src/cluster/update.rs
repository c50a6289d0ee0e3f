//! Centroid update step.
//!
//! A cluster with no members has no mean. [`update_centroids`] reports it as
//! [`AgruparError::NumericDegeneracy`] and never returns NaN rows;
//! [`update_centroids_reseeding`] moves the empty centroid onto a far-away
//! sample instead.

use crate::error::{AgruparError, Result};
use crate::primitives::Matrix;

/// Per-cluster feature sums and member counts.
///
/// Sums are kept in `f64` so that large finite samples cannot overflow
/// before the division.
struct ClusterSums {
    sums: Vec<f64>,
    counts: Vec<usize>,
    n_features: usize,
}

impl ClusterSums {
    fn accumulate(x: &Matrix<f32>, labels: &[usize], n_clusters: usize) -> Result<Self> {
        let (n_samples, n_features) = x.shape();
        if labels.len() != n_samples {
            return Err(AgruparError::dimension_mismatch(
                "labels",
                n_samples,
                labels.len(),
            ));
        }
        if n_clusters == 0 {
            return Err(AgruparError::invalid_argument(
                "number of clusters must be at least 1",
            ));
        }

        let mut sums = vec![0.0_f64; n_clusters * n_features];
        let mut counts = vec![0usize; n_clusters];

        for (point, &label) in x.rows_iter().zip(labels) {
            if label >= n_clusters {
                return Err(AgruparError::invalid_argument(format!(
                    "label {label} out of range for {n_clusters} clusters"
                )));
            }
            counts[label] += 1;
            let row = &mut sums[label * n_features..(label + 1) * n_features];
            for (acc, &v) in row.iter_mut().zip(point) {
                *acc += f64::from(v);
            }
        }

        Ok(Self {
            sums,
            counts,
            n_features,
        })
    }

    fn empty_clusters(&self) -> Vec<usize> {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == 0)
            .map(|(k, _)| k)
            .collect()
    }

    /// Divides each non-empty row by its count. Empty rows stay zero.
    fn into_means(self) -> Result<Matrix<f32>> {
        let n_clusters = self.counts.len();
        let mut means = Vec::with_capacity(self.sums.len());
        if self.n_features > 0 {
            for (row, &count) in self.sums.chunks(self.n_features).zip(&self.counts) {
                let divisor = count.max(1) as f64;
                means.extend(row.iter().map(|&v| (v / divisor) as f32));
            }
        }
        Matrix::from_vec(n_clusters, self.n_features, means)
    }
}

/// Recomputes each centroid as the mean of the samples assigned to it.
///
/// # Errors
///
/// * `DimensionMismatch` if `labels.len() != x.n_rows()`
/// * `InvalidArgument` if `n_clusters == 0` or a label is `>= n_clusters`
/// * `NumericDegeneracy { cluster }` for the lowest-indexed cluster that has
///   no members
///
/// # Examples
///
/// ```
/// use agrupar::cluster::update::update_centroids;
/// use agrupar::primitives::Matrix;
///
/// let x = Matrix::from_vec(4, 1, vec![1.0, 3.0, 10.0, 20.0]).expect("4x1");
/// let c = update_centroids(&x, &[0, 0, 1, 1], 2).expect("both clusters populated");
/// assert_eq!(c.as_slice(), &[2.0, 15.0]);
/// ```
pub fn update_centroids(x: &Matrix<f32>, labels: &[usize], n_clusters: usize) -> Result<Matrix<f32>> {
    let sums = ClusterSums::accumulate(x, labels, n_clusters)?;
    if let Some(&cluster) = sums.empty_clusters().first() {
        return Err(AgruparError::NumericDegeneracy { cluster });
    }
    sums.into_means()
}

/// Like [`update_centroids`], but re-seeds empty clusters instead of failing.
///
/// Each empty cluster takes the sample that is currently farthest from its
/// assigned centroid in `previous`. Donors are taken from clusters that keep
/// at least one other member when possible, and no sample is used twice.
///
/// Returns the new centroids and the ids of the re-seeded clusters.
///
/// # Errors
///
/// * `DimensionMismatch` if `labels` or `previous` don't match `x`
/// * `InvalidArgument` if a label is out of range
/// * `NumericDegeneracy` if there are fewer samples than empty clusters
pub fn update_centroids_reseeding(
    x: &Matrix<f32>,
    labels: &[usize],
    previous: &Matrix<f32>,
) -> Result<(Matrix<f32>, Vec<usize>)> {
    if previous.n_cols() != x.n_cols() {
        return Err(AgruparError::dimension_mismatch(
            "n_features",
            previous.n_cols(),
            x.n_cols(),
        ));
    }
    let n_clusters = previous.n_rows();
    let sums = ClusterSums::accumulate(x, labels, n_clusters)?;
    let empty = sums.empty_clusters();
    if empty.is_empty() {
        return Ok((sums.into_means()?, Vec::new()));
    }

    let mut remaining = sums.counts.clone();
    let mut centroids = sums.into_means()?;

    // Farthest first; ties by lower sample index
    let mut candidates: Vec<(f32, usize)> = labels
        .iter()
        .enumerate()
        .map(|(i, &label)| (x.row_distance_squared(i, previous, label), i))
        .collect();
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut used = vec![false; x.n_rows()];
    for &cluster in &empty {
        let donor = candidates
            .iter()
            .find(|&&(_, i)| !used[i] && remaining[labels[i]] > 1)
            .or_else(|| candidates.iter().find(|&&(_, i)| !used[i]))
            .map(|&(_, i)| i)
            .ok_or(AgruparError::NumericDegeneracy { cluster })?;

        used[donor] = true;
        remaining[labels[donor]] = remaining[labels[donor]].saturating_sub(1);
        remaining[cluster] += 1;
        for j in 0..x.n_cols() {
            centroids.set(cluster, j, x.get(donor, j));
        }

        tracing::debug!(cluster, donor, "re-seeded empty cluster");
    }

    Ok((centroids, empty))
}

#[cfg(test)]
#[path = "tests/core_centroid_update.rs"]
mod tests;
