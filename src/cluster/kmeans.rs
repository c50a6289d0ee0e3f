//! K-Means clustering orchestrator.
//!
//! Owns the fit/predict lifecycle around the initializer, the assignment
//! engine and the centroid updater.

use super::assign::assign_to_nearest;
use super::config::{EmptyClusterPolicy, KMeansConfig};
use super::init::initialize;
use super::update::{update_centroids, update_centroids_reseeding};
use crate::error::{AgruparError, Result};
use crate::metrics::inertia;
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

const FIT_ONGOING: &str = "Cannot start training because another fit() call is ongoing";
const PREDICT_DURING_FIT: &str = "Cannot start prediction because fit() call is ongoing";
const RESET_DURING_FIT: &str = "Cannot reset because fit() call is ongoing";
const NO_CLUSTERS: &str = "no clusters available: call fit() or fit_one_cycle() first";

/// Lifecycle of a [`KMeansClustering`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitState {
    /// No centroids yet.
    Uninitialized,
    /// Centroids exist but no full `fit()` has completed.
    Initialized,
    /// A `fit()` or `fit_one_cycle()` call is in flight.
    Fitting,
    /// A full `fit()` has completed.
    Fitted,
}

#[derive(Debug, Default)]
struct ClusterState {
    centroids: Option<Matrix<f32>>,
    labels: Option<Vec<usize>>,
    inertia: f32,
    n_iter: usize,
    fitted: bool,
}

/// Clears the training flag when dropped, on success and error paths alike.
struct TrainingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> TrainingGuard<'a> {
    /// Sets the flag, or fails with `ConcurrentOperation { message }` if it
    /// is already set.
    fn acquire(flag: &'a AtomicBool, message: &str) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self { flag })
            .map_err(|_| AgruparError::ConcurrentOperation {
                message: message.to_string(),
            })
    }
}

impl Drop for TrainingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// K-Means clustering (Lloyd's algorithm).
///
/// All operations take `&self`, so one instance can be shared across
/// threads. At most one `fit()`/`fit_one_cycle()` runs at a time per
/// instance; a second call, or a `predict()`, made while one is in flight is
/// rejected with `ConcurrentOperation` instead of waiting.
///
/// # Algorithm
///
/// 1. Initialize centroids (random distinct rows, or k-means++)
/// 2. Assign each sample to nearest centroid
/// 3. Update centroids as mean of assigned samples
/// 4. Repeat until the largest centroid shift is `<= tol` or `max_iter`
///    rounds have run
///
/// # Examples
///
/// ```
/// use agrupar::prelude::*;
///
/// let data = Matrix::from_vec(6, 2, vec![
///     1.0, 2.0,
///     1.5, 1.8,
///     5.0, 8.0,
///     8.0, 8.0,
///     1.0, 0.6,
///     9.0, 11.0,
/// ]).expect("Valid matrix dimensions and data length");
///
/// let kmeans = KMeansClustering::new(KMeansConfig::new(2).with_random_state(42))
///     .expect("valid config");
/// let labels = kmeans.fit(&data).expect("Fit succeeds with valid data");
/// assert_eq!(labels.len(), 6);
/// assert_eq!(kmeans.predict(&data).expect("fitted"), labels);
/// ```
///
/// # Performance
///
/// - Time complexity: O(nkdi) where n=samples, k=clusters, d=features, i=iterations
/// - Space complexity: O(n + kd)
#[derive(Debug)]
pub struct KMeansClustering {
    config: KMeansConfig,
    state: Mutex<ClusterState>,
    training: AtomicBool,
    rng: Mutex<StdRng>,
}

impl Default for KMeansClustering {
    fn default() -> Self {
        Self::from_valid_config(KMeansConfig::default())
    }
}

impl KMeansClustering {
    /// Creates an unfitted instance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` if the config fails validation.
    pub fn new(config: KMeansConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Creates an instance with `n_clusters` clusters and default settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` if `n_clusters == 0`.
    pub fn with_clusters(n_clusters: usize) -> Result<Self> {
        Self::new(KMeansConfig::new(n_clusters))
    }

    fn from_valid_config(config: KMeansConfig) -> Self {
        let rng = match config.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            state: Mutex::new(ClusterState::default()),
            training: AtomicBool::new(false),
            rng: Mutex::new(rng),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Returns the number of clusters.
    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.config.n_clusters
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> FitState {
        if self.training.load(Ordering::Acquire) {
            return FitState::Fitting;
        }
        let state = self.lock_state();
        match (&state.centroids, state.fitted) {
            (None, _) => FitState::Uninitialized,
            (Some(_), false) => FitState::Initialized,
            (Some(_), true) => FitState::Fitted,
        }
    }

    /// Returns true once a full `fit()` has completed.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.lock_state().fitted
    }

    /// Returns a copy of the current centroids, if any.
    #[must_use]
    pub fn cluster_centers(&self) -> Option<Matrix<f32>> {
        self.lock_state().centroids.clone()
    }

    /// Returns the assignment from the most recent fit call.
    #[must_use]
    pub fn labels(&self) -> Option<Vec<usize>> {
        self.lock_state().labels.clone()
    }

    /// Returns the inertia (within-cluster sum of squares) of the most recent
    /// fit call.
    #[must_use]
    pub fn inertia(&self) -> f32 {
        self.lock_state().inertia
    }

    /// Returns the number of iterations run by the most recent `fit()`, or
    /// the number of `fit_one_cycle()` steps taken since then.
    #[must_use]
    pub fn n_iter(&self) -> usize {
        self.lock_state().n_iter
    }

    /// Drops centroids and labels, returning to `Uninitialized`.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentOperation` if a fit is in flight.
    pub fn reset(&self) -> Result<()> {
        let _guard = TrainingGuard::acquire(&self.training, RESET_DURING_FIT)?;
        *self.lock_state() = ClusterState::default();
        Ok(())
    }

    /// Fits the model and returns the final assignment.
    ///
    /// Initializes centroids unless they already exist, then runs
    /// assign+update rounds until the largest centroid shift is `<= tol` or
    /// `max_iter` rounds have run. The returned labels are the assignment
    /// against the final centroids.
    ///
    /// Nothing is stored if the call fails.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` if `x` is empty, has no features, holds non-finite
    ///   values, or has fewer rows than `n_clusters` when initializing
    /// * `DimensionMismatch` if existing centroids have a different width
    /// * `ConcurrentOperation` if another fit is in flight
    /// * `NumericDegeneracy` if a cluster empties under
    ///   [`EmptyClusterPolicy::Fail`]
    pub fn fit(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        validate_samples(x)?;
        let _guard = TrainingGuard::acquire(&self.training, FIT_ONGOING)?;

        let mut centroids = self.starting_centroids(x)?;
        let mut n_iter = 0;
        let mut converged = false;

        for iter in 0..self.config.max_iter {
            let (_, new_centroids) = self.step(x, &centroids)?;
            n_iter = iter + 1;
            let shift = max_centroid_shift(&centroids, &new_centroids);
            converged = centroids_converged(&centroids, &new_centroids, self.config.tol);
            centroids = new_centroids;

            tracing::trace!(iteration = n_iter, shift, "k-means iteration");
            if converged {
                break;
            }
        }

        let labels = assign_to_nearest(x, &centroids)?;
        let total_inertia = inertia(x, &centroids, &labels);

        tracing::debug!(
            n_clusters = self.config.n_clusters,
            n_samples = x.n_rows(),
            n_iter,
            converged,
            inertia = total_inertia,
            "k-means fit finished"
        );

        let mut state = self.lock_state();
        state.centroids = Some(centroids);
        state.labels = Some(labels.clone());
        state.inertia = total_inertia;
        state.n_iter = n_iter;
        state.fitted = true;

        Ok(labels)
    }

    /// Runs exactly one assign+update round, initializing first if needed.
    ///
    /// Returns the assignment computed in this round, i.e. against the
    /// centroids as they were before the update.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::fit`].
    pub fn fit_one_cycle(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        validate_samples(x)?;
        let _guard = TrainingGuard::acquire(&self.training, FIT_ONGOING)?;

        let centroids = self.starting_centroids(x)?;
        let (labels, new_centroids) = self.step(x, &centroids)?;
        let total_inertia = inertia(x, &new_centroids, &labels);

        let mut state = self.lock_state();
        state.centroids = Some(new_centroids);
        state.labels = Some(labels.clone());
        state.inertia = total_inertia;
        state.n_iter += 1;

        tracing::debug!(step = state.n_iter, inertia = total_inertia, "k-means single cycle");
        Ok(labels)
    }

    /// Assigns each sample to its nearest current centroid.
    ///
    /// Never modifies the centroids.
    ///
    /// # Errors
    ///
    /// * `ConcurrentOperation` while a fit is in flight
    /// * `InvalidState` before any fit call
    /// * `DimensionMismatch` if `x` has a different number of features
    /// * `InvalidArgument` if `x` holds non-finite values
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        if self.training.load(Ordering::Acquire) {
            return Err(AgruparError::ConcurrentOperation {
                message: PREDICT_DURING_FIT.to_string(),
            });
        }
        let centroids = self
            .lock_state()
            .centroids
            .clone()
            .ok_or_else(|| AgruparError::invalid_state(NO_CLUSTERS))?;

        if !x.is_finite() {
            return Err(AgruparError::invalid_argument(
                "samples contain non-finite values",
            ));
        }
        assign_to_nearest(x, &centroids)
    }

    /// Fits the model and returns the final assignment.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::fit`].
    pub fn fit_predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        self.fit(x)
    }

    /// Existing centroids, or freshly initialized ones.
    fn starting_centroids(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        if let Some(existing) = self.lock_state().centroids.clone() {
            if existing.n_cols() != x.n_cols() {
                return Err(AgruparError::dimension_mismatch(
                    "n_features",
                    existing.n_cols(),
                    x.n_cols(),
                ));
            }
            return Ok(existing);
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        initialize(self.config.init, x, self.config.n_clusters, &mut *rng)
    }

    /// One assign+update round: returns the assignment and the new centroids.
    fn step(&self, x: &Matrix<f32>, centroids: &Matrix<f32>) -> Result<(Vec<usize>, Matrix<f32>)> {
        let labels = assign_to_nearest(x, centroids)?;
        let new_centroids = match self.config.empty_cluster {
            EmptyClusterPolicy::Reseed => update_centroids_reseeding(x, &labels, centroids)?.0,
            EmptyClusterPolicy::Fail => {
                update_centroids(x, &labels, centroids.n_rows()).map_err(|e| {
                    tracing::warn!(error = %e, "empty cluster during k-means update");
                    e
                })?
            }
        };
        Ok((labels, new_centroids))
    }

    fn lock_state(&self) -> MutexGuard<'_, ClusterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Holds the training flag as if a fit were running.
    #[cfg(test)]
    fn hold_training_flag(&self) -> TrainingGuard<'_> {
        match TrainingGuard::acquire(&self.training, FIT_ONGOING) {
            Ok(guard) => guard,
            Err(e) => panic!("training flag already held: {e}"),
        }
    }
}

impl UnsupervisedEstimator for KMeansClustering {
    type Labels = Vec<usize>;

    fn fit(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        KMeansClustering::fit(self, x)
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        KMeansClustering::predict(self, x)
    }
}

/// Rejects inputs that can't be clustered.
fn validate_samples(x: &Matrix<f32>) -> Result<()> {
    if x.n_rows() == 0 {
        return Err(AgruparError::empty_input("samples"));
    }
    if x.n_cols() == 0 {
        return Err(AgruparError::invalid_argument(
            "Input must be a matrix: samples have no features",
        ));
    }
    if !x.is_finite() {
        return Err(AgruparError::invalid_argument(
            "samples contain non-finite values",
        ));
    }
    Ok(())
}

/// Largest Euclidean distance any centroid moved.
fn max_centroid_shift(old: &Matrix<f32>, new: &Matrix<f32>) -> f32 {
    (0..old.n_rows())
        .map(|k| old.row_distance_squared(k, new, k))
        .fold(0.0_f32, f32::max)
        .sqrt()
}

/// True when every centroid moved by at most `tol`.
fn centroids_converged(old: &Matrix<f32>, new: &Matrix<f32>, tol: f32) -> bool {
    (0..old.n_rows()).all(|k| old.row_distance_squared(k, new, k) <= tol * tol)
}

#[cfg(test)]
#[path = "tests/core.rs"]
mod tests;
