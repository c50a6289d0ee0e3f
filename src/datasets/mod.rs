//! Sample generators for tests, benches and demos.
//!
//! All generators take an optional seed; `None` draws from entropy.

use crate::error::{AgruparError, Result};
use crate::primitives::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for [`make_blobs`].
#[derive(Debug, Clone, PartialEq)]
pub struct BlobsConfig {
    /// Total number of samples, split round-robin across centers.
    pub n_samples: usize,
    /// Number of features (ignored when `centers` is given).
    pub n_features: usize,
    /// Number of centers to draw when `centers` is `None`.
    pub n_centers: usize,
    /// Explicit centers, `(n_centers, n_features)`.
    pub centers: Option<Matrix<f32>>,
    /// Standard deviation of each blob.
    pub cluster_std: f32,
    /// Range that random centers are drawn from.
    pub center_box: (f32, f32),
    /// Seed for reproducibility.
    pub random_state: Option<u64>,
}

impl Default for BlobsConfig {
    fn default() -> Self {
        Self {
            n_samples: 100,
            n_features: 2,
            n_centers: 3,
            centers: None,
            cluster_std: 1.0,
            center_box: (-10.0, 10.0),
            random_state: None,
        }
    }
}

impl BlobsConfig {
    /// `n_samples` samples around `n_centers` random centers.
    #[must_use]
    pub fn new(n_samples: usize, n_centers: usize) -> Self {
        Self {
            n_samples,
            n_centers,
            ..Self::default()
        }
    }

    /// Sets the number of features.
    #[must_use]
    pub fn with_features(mut self, n_features: usize) -> Self {
        self.n_features = n_features;
        self
    }

    /// Uses the given centers instead of random ones.
    #[must_use]
    pub fn with_centers(mut self, centers: Matrix<f32>) -> Self {
        self.n_centers = centers.n_rows();
        self.n_features = centers.n_cols();
        self.centers = Some(centers);
        self
    }

    /// Sets the blob standard deviation.
    #[must_use]
    pub fn with_std(mut self, cluster_std: f32) -> Self {
        self.cluster_std = cluster_std;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Standard normal sample (Box-Muller).
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let u1: f32 = rng.gen_range(0.0001_f32..1.0_f32);
    let u2: f32 = rng.gen_range(0.0_f32..1.0_f32);
    (-2.0_f32 * u1.ln()).sqrt() * (2.0_f32 * std::f32::consts::PI * u2).cos()
}

/// Generates isotropic Gaussian blobs with their true labels.
///
/// Sample `i` belongs to blob `i % n_centers`.
///
/// # Errors
///
/// Returns `InvalidArgument` for zero samples, features or centers, a
/// negative or non-finite `cluster_std`, or an empty `center_box`.
///
/// # Examples
///
/// ```
/// use agrupar::datasets::{make_blobs, BlobsConfig};
///
/// let (x, y) = make_blobs(&BlobsConfig::new(30, 3).with_random_state(1)).expect("valid config");
/// assert_eq!(x.shape(), (30, 2));
/// assert_eq!(y.len(), 30);
/// ```
pub fn make_blobs(config: &BlobsConfig) -> Result<(Matrix<f32>, Vec<usize>)> {
    if config.n_samples == 0 {
        return Err(AgruparError::invalid_argument("n_samples must be at least 1"));
    }
    if !config.cluster_std.is_finite() || config.cluster_std < 0.0 {
        return Err(AgruparError::invalid_argument(format!(
            "cluster_std must be finite and >= 0, got {}",
            config.cluster_std
        )));
    }

    let mut rng = rng_from(config.random_state);
    let centers = match &config.centers {
        Some(c) => c.clone(),
        None => {
            let (low, high) = config.center_box;
            uniform_with(&mut rng, config.n_centers, config.n_features, low, high)?
        }
    };
    let (n_centers, n_features) = centers.shape();
    if n_centers == 0 || n_features == 0 {
        return Err(AgruparError::invalid_argument(
            "blobs need at least one center and one feature",
        ));
    }

    let mut data = Vec::with_capacity(config.n_samples * n_features);
    let mut labels = Vec::with_capacity(config.n_samples);
    for i in 0..config.n_samples {
        let blob = i % n_centers;
        for &c in centers.row_slice(blob) {
            data.push(c + config.cluster_std * standard_normal(&mut rng));
        }
        labels.push(blob);
    }

    Ok((Matrix::from_vec(config.n_samples, n_features, data)?, labels))
}

/// Uniform samples in `[low, high)`.
///
/// # Errors
///
/// Returns `InvalidArgument` for zero samples or features, or if
/// `low >= high`.
pub fn uniform(
    n_samples: usize,
    n_features: usize,
    low: f32,
    high: f32,
    seed: Option<u64>,
) -> Result<Matrix<f32>> {
    let mut rng = rng_from(seed);
    uniform_with(&mut rng, n_samples, n_features, low, high)
}

fn uniform_with<R: Rng + ?Sized>(
    rng: &mut R,
    n_samples: usize,
    n_features: usize,
    low: f32,
    high: f32,
) -> Result<Matrix<f32>> {
    if n_samples == 0 || n_features == 0 {
        return Err(AgruparError::invalid_argument(
            "n_samples and n_features must be at least 1",
        ));
    }
    if !low.is_finite() || !high.is_finite() || low >= high {
        return Err(AgruparError::invalid_argument(format!(
            "uniform range [{low}, {high}) is empty"
        )));
    }
    let data: Vec<f32> = (0..n_samples * n_features)
        .map(|_| rng.gen_range(low..high))
        .collect();
    Matrix::from_vec(n_samples, n_features, data)
}

/// The column `[[1], [2], ..., [n]]`.
#[must_use]
pub fn line(n: usize) -> Matrix<f32> {
    let data: Vec<f32> = (1..=n).map(|v| v as f32).collect();
    Matrix::from_vec(n, 1, data).unwrap_or_else(|_| Matrix::zeros(0, 1))
}
