//! Centroid initialization.
//!
//! The default initializer draws `k` distinct rows uniformly at random with a
//! partial Fisher-Yates shuffle. k-means++ seeding is available as an
//! alternative through [`InitMethod::KMeansPlusPlus`].

use super::config::InitMethod;
use crate::error::{AgruparError, Result};
use crate::primitives::Matrix;
use rand::Rng;

/// Selects `k` distinct indices from `0..n` uniformly without replacement.
///
/// Each slot `i` swaps in an index drawn from the not-yet-selected tail
/// `i..n`, so every size-`k` subset is equally likely.
///
/// # Errors
///
/// Returns `InvalidArgument` if `k == 0` or `k > n`.
///
/// # Examples
///
/// ```
/// use agrupar::cluster::init::sample_indices;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let picked = sample_indices(10, 3, &mut rng).expect("3 <= 10");
/// assert_eq!(picked.len(), 3);
/// ```
pub fn sample_indices<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Result<Vec<usize>> {
    check_selection(n, k)?;

    let mut indices: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = rng.gen_range(i..n);
        indices.swap(i, j);
    }
    indices.truncate(k);
    Ok(indices)
}

/// Builds a `(k, n_features)` centroid matrix from `k` distinct random rows
/// of `x`.
///
/// # Errors
///
/// Returns `InvalidArgument` if `k == 0` or `k > x.n_rows()`.
pub fn init_centroids<R: Rng + ?Sized>(x: &Matrix<f32>, k: usize, rng: &mut R) -> Result<Matrix<f32>> {
    let indices = sample_indices(x.n_rows(), k, rng)?;
    x.select_rows(&indices)
}

/// k-means++ seeding.
///
/// The first centroid is a uniformly random row; each further centroid is a
/// row drawn with probability proportional to its squared distance to the
/// nearest centroid chosen so far. When every remaining row coincides with a
/// chosen centroid the draw falls back to a uniform pick among unchosen rows.
///
/// # Errors
///
/// Returns `InvalidArgument` if `k == 0` or `k > x.n_rows()`.
pub fn kmeans_plusplus<R: Rng + ?Sized>(x: &Matrix<f32>, k: usize, rng: &mut R) -> Result<Matrix<f32>> {
    let n_samples = x.n_rows();
    check_selection(n_samples, k)?;

    let mut chosen = vec![false; n_samples];
    let mut selected = Vec::with_capacity(k);

    let first = rng.gen_range(0..n_samples);
    chosen[first] = true;
    selected.push(first);

    let mut min_distances: Vec<f32> = (0..n_samples)
        .map(|i| x.row_distance_squared(i, x, first))
        .collect();

    while selected.len() < k {
        let total: f32 = min_distances
            .iter()
            .zip(&chosen)
            .filter(|&(_, &c)| !c)
            .map(|(&d, _)| d)
            .sum();

        let next = if total > 0.0 && total.is_finite() {
            weighted_pick(&min_distances, &chosen, total, rng)
        } else {
            let remaining: Vec<usize> = (0..n_samples).filter(|&i| !chosen[i]).collect();
            remaining[rng.gen_range(0..remaining.len())]
        };

        chosen[next] = true;
        selected.push(next);

        for (i, min_dist) in min_distances.iter_mut().enumerate() {
            let dist = x.row_distance_squared(i, x, next);
            if dist < *min_dist {
                *min_dist = dist;
            }
        }
    }

    x.select_rows(&selected)
}

fn check_selection(n: usize, k: usize) -> Result<()> {
    if k == 0 {
        return Err(AgruparError::invalid_argument(
            "number of clusters must be at least 1",
        ));
    }
    if k > n {
        return Err(AgruparError::invalid_argument(format!(
            "cannot select {k} distinct initial centroids from {n} samples"
        )));
    }
    Ok(())
}

/// Draws an unchosen index with probability proportional to its weight.
fn weighted_pick<R: Rng + ?Sized>(weights: &[f32], chosen: &[bool], total: f32, rng: &mut R) -> usize {
    let target = rng.gen::<f32>() * total;
    let mut cumulative = 0.0;
    let mut last_candidate = None;

    for (i, (&w, &c)) in weights.iter().zip(chosen).enumerate() {
        if c || w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_candidate = Some(i);
        if cumulative > target {
            return i;
        }
    }

    // Rounding can leave `target` just above the accumulated sum
    last_candidate.unwrap_or_else(|| chosen.iter().position(|&c| !c).unwrap_or(0))
}

/// Runs the configured initializer.
pub(crate) fn initialize<R: Rng + ?Sized>(
    method: InitMethod,
    x: &Matrix<f32>,
    k: usize,
    rng: &mut R,
) -> Result<Matrix<f32>> {
    let centroids = match method {
        InitMethod::Random => init_centroids(x, k, rng)?,
        InitMethod::KMeansPlusPlus => kmeans_plusplus(x, k, rng)?,
    };
    tracing::debug!(
        method = ?method,
        n_clusters = k,
        n_samples = x.n_rows(),
        "initialized centroids"
    );
    Ok(centroids)
}

/// Index of the row of `x` that is nearest to centroid `c`, used by tests to
/// confirm that initial centroids are copies of sample rows.
#[cfg(test)]
pub(crate) fn matching_row(x: &Matrix<f32>, centroids: &Matrix<f32>, c: usize) -> Option<usize> {
    let (row, dist) = super::assign::nearest_centroid(centroids.row_slice(c), x);
    (dist == 0.0).then_some(row)
}
