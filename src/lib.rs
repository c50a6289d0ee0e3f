//! Agrupar: K-Means clustering and nearest-neighbour classification in
//! pure Rust.
//!
//! Agrupar implements Lloyd's algorithm as three separately testable
//! kernels (initialization, assignment, centroid update) driven by a
//! thread-safe orchestrator, plus a cosine-similarity KNN classifier and
//! seeded sample generators.
//!
//! # Quick Start
//!
//! ```
//! use agrupar::prelude::*;
//!
//! // Two well separated groups
//! let x = Matrix::from_vec(6, 2, vec![
//!     0.0, 0.0,
//!     0.2, 0.1,
//!     0.1, 0.3,
//!     9.0, 9.0,
//!     9.2, 8.9,
//!     8.8, 9.1,
//! ]).unwrap();
//!
//! let kmeans = KMeansClustering::new(KMeansConfig::new(2).with_random_state(42)).unwrap();
//! let labels = kmeans.fit(&x).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[3]);
//!
//! let new_points = Matrix::from_vec(1, 2, vec![8.5, 9.5]).unwrap();
//! assert_eq!(kmeans.predict(&new_points).unwrap(), vec![labels[3]]);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`cluster`]: K-Means kernels and the [`cluster::KMeansClustering`] orchestrator
//! - [`classification`]: K-nearest-neighbours classifier
//! - [`datasets`]: Seeded sample generators (Gaussian blobs, uniform)
//! - [`metrics`]: Inertia, cluster sizes and accuracy
//! - [`error`]: Error type shared by every module

pub mod classification;
pub mod cluster;
pub mod datasets;
pub mod error;
pub mod metrics;
pub mod prelude;
pub mod primitives;
pub mod traits;

pub use error::{AgruparError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::UnsupervisedEstimator;
