//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use agrupar::prelude::*;
//! ```

pub use crate::classification::{KnnClassifier, KnnPrediction};
pub use crate::cluster::{EmptyClusterPolicy, FitState, InitMethod, KMeansClustering, KMeansConfig};
pub use crate::datasets::{make_blobs, BlobsConfig};
pub use crate::error::AgruparError;
pub use crate::metrics::{accuracy, inertia};
pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::UnsupervisedEstimator;
