//! Core traits for estimators.
//!
//! These traits define the API contracts shared by the algorithms.

use crate::error::Result;
use crate::primitives::Matrix;

/// Trait for unsupervised learning models.
///
/// Methods take `&self`: implementations keep fitted state behind interior
/// mutability so a model can be shared between threads.
///
/// # Examples
///
/// ```
/// use agrupar::prelude::*;
///
/// // Create data with 2 clear clusters
/// let data = Matrix::from_vec(6, 2, vec![
///     0.0, 0.0, 0.1, 0.1, 0.2, 0.0,  // Cluster 1
///     10.0, 10.0, 10.1, 10.1, 10.0, 10.2,  // Cluster 2
/// ]).unwrap();
///
/// let kmeans = KMeansClustering::new(KMeansConfig::new(2).with_random_state(42)).unwrap();
/// let labels = UnsupervisedEstimator::fit_predict(&kmeans, &data).unwrap();
/// assert_eq!(labels.len(), 6);
/// ```
pub trait UnsupervisedEstimator {
    /// The type of labels/clusters produced.
    type Labels;

    /// Fits the model to data and returns the training labels.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (empty data, invalid parameters, etc.).
    fn fit(&self, x: &Matrix<f32>) -> Result<Self::Labels>;

    /// Predicts cluster assignments for new data.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or `x` is incompatible.
    fn predict(&self, x: &Matrix<f32>) -> Result<Self::Labels>;

    /// Fits and returns the labels of the fitted data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_predict(&self, x: &Matrix<f32>) -> Result<Self::Labels> {
        self.fit(x)
    }
}
