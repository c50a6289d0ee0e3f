//! K-Means hyperparameters.

use crate::error::{AgruparError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How initial centroids are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InitMethod {
    /// `k` distinct sample rows drawn uniformly (partial Fisher-Yates).
    #[default]
    #[serde(rename = "random")]
    Random,
    /// D²-weighted k-means++ seeding.
    #[serde(rename = "kmeans++", alias = "k-means++")]
    KMeansPlusPlus,
}

/// What to do when a cluster ends an assignment step with no members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyClusterPolicy {
    /// Move the empty centroid onto the sample farthest from its centroid.
    #[default]
    Reseed,
    /// Abort the fit with `NumericDegeneracy`.
    Fail,
}

/// Configuration for [`KMeansClustering`](super::KMeansClustering).
///
/// Fields missing from a JSON document take their defaults. The camelCase
/// names `nClusters`, `maxIter`, `randomState` and `emptyCluster` are
/// accepted as aliases.
///
/// # Examples
///
/// ```
/// use agrupar::cluster::KMeansConfig;
///
/// let config = KMeansConfig::from_json(r#"{"nClusters": 3}"#).expect("valid json");
/// assert_eq!(config.n_clusters, 3);
/// assert_eq!(config.max_iter, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    /// Number of clusters.
    #[serde(alias = "nClusters")]
    pub n_clusters: usize,
    /// Upper bound on assign+update rounds per `fit()`.
    #[serde(alias = "maxIter")]
    pub max_iter: usize,
    /// Early-stop threshold on the largest centroid shift (Euclidean).
    pub tol: f32,
    /// Seed for centroid initialization; `None` draws from entropy. Empty
    /// cluster re-seeding is deterministic and does not use it.
    #[serde(alias = "randomState")]
    pub random_state: Option<u64>,
    /// Initialization strategy.
    pub init: InitMethod,
    /// Empty-cluster handling.
    #[serde(alias = "emptyCluster")]
    pub empty_cluster: EmptyClusterPolicy,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: 8,
            max_iter: 300,
            tol: 1e-4,
            random_state: None,
            init: InitMethod::Random,
            empty_cluster: EmptyClusterPolicy::Reseed,
        }
    }
}

impl KMeansConfig {
    /// Default configuration with `n_clusters` clusters.
    #[must_use]
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Self::default()
        }
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Sets the random seed for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Sets the initialization strategy.
    #[must_use]
    pub fn with_init(mut self, init: InitMethod) -> Self {
        self.init = init;
        self
    }

    /// Sets the empty-cluster policy.
    #[must_use]
    pub fn with_empty_cluster(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    /// Checks hyperparameter ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` if `n_clusters` or `max_iter` is zero,
    /// or `tol` is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(AgruparError::InvalidHyperparameter {
                param: "n_clusters".to_string(),
                value: self.n_clusters.to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        if self.max_iter == 0 {
            return Err(AgruparError::InvalidHyperparameter {
                param: "max_iter".to_string(),
                value: self.max_iter.to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(AgruparError::InvalidHyperparameter {
                param: "tol".to_string(),
                value: self.tol.to_string(),
                constraint: "finite and >= 0".to_string(),
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON or
    /// `InvalidHyperparameter` for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file can't be read, otherwise as [`Self::from_json`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Writes the configuration as JSON.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file can't be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
