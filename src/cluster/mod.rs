//! Clustering algorithms.
//!
//! K-Means built from three pure steps plus an orchestrator:
//!
//! - [`init`]: initial centroid selection (Fisher-Yates sampling, k-means++)
//! - [`assign`]: nearest-centroid assignment
//! - [`update`]: centroid recomputation and empty-cluster repair
//! - [`KMeansClustering`]: fit / fit_one_cycle / predict lifecycle

pub mod assign;
mod config;
pub mod init;
mod kmeans;
pub mod update;

pub use config::{EmptyClusterPolicy, InitMethod, KMeansConfig};
pub use kmeans::{FitState, KMeansClustering};

#[cfg(test)]
#[path = "tests_kmeans_contract.rs"]
mod tests_kmeans_contract;
