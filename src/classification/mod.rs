//! Instance-based classification.
//!
//! [`KnnClassifier`] keeps labelled example vectors grouped by class and
//! classifies new vectors by a vote among the `k` most cosine-similar
//! examples.
//!
//! # Example
//!
//! ```
//! use agrupar::classification::KnnClassifier;
//!
//! let mut knn = KnnClassifier::new();
//! knn.add_example(&[1.0, 0.0], "east").expect("first example");
//! knn.add_example(&[0.9, 0.1], "east").expect("same width");
//! knn.add_example(&[0.0, 1.0], "north").expect("same width");
//!
//! let prediction = knn.predict_class(&[1.0, 0.05], 2).expect("has examples");
//! assert_eq!(prediction.label, "east");
//! assert_eq!(prediction.class_index, 0);
//! ```

use crate::error::{AgruparError, Result};
use crate::primitives::{Matrix, Vector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Examples recorded for one class.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClassExamples {
    label: String,
    /// Row-major, `count * n_features` values.
    data: Vec<f32>,
    count: usize,
}

impl ClassExamples {
    fn to_matrix(&self, n_features: usize) -> Result<Matrix<f32>> {
        Matrix::from_vec(self.count, n_features, self.data.clone())
    }
}

/// Serialized form of a [`KnnClassifier`], checked before use.
#[derive(Debug, Deserialize)]
struct StoredClassifier {
    classes: Vec<ClassExamples>,
    n_features: Option<usize>,
}

/// Concatenated, unit-normalized training matrix.
#[derive(Debug, Clone)]
struct SimilarityCache {
    normalized: Matrix<f32>,
    /// Class index of each cached row.
    row_class: Vec<usize>,
}

/// Outcome of [`KnnClassifier::predict_class`].
#[derive(Debug, Clone, PartialEq)]
pub struct KnnPrediction {
    /// Winning class label.
    pub label: String,
    /// Insertion-order index of the winning class.
    pub class_index: usize,
    /// Share of the `k` nearest neighbours voting for each class.
    pub confidences: BTreeMap<String, f32>,
}

/// K-nearest-neighbours classifier over cosine similarity.
///
/// Classes are indexed in the order their first example was added. The
/// normalized training matrix is built lazily on the first prediction and
/// reused until the example set changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "StoredClassifier")]
pub struct KnnClassifier {
    classes: Vec<ClassExamples>,
    n_features: Option<usize>,
    #[serde(skip)]
    cache: Option<SimilarityCache>,
}

impl KnnClassifier {
    /// Creates an empty classifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one example for `label`.
    ///
    /// The first example fixes the feature count.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty or non-finite example, and
    /// `DimensionMismatch` if its width differs from earlier examples.
    pub fn add_example(&mut self, example: &[f32], label: impl Into<String>) -> Result<()> {
        if example.is_empty() {
            return Err(AgruparError::invalid_argument("example must not be empty"));
        }
        if example.iter().any(|v| !v.is_finite()) {
            return Err(AgruparError::invalid_argument(
                "example contains NaN or infinite values",
            ));
        }
        match self.n_features {
            Some(d) if d != example.len() => {
                return Err(AgruparError::dimension_mismatch(
                    "example width",
                    d,
                    example.len(),
                ));
            }
            Some(_) => {}
            None => self.n_features = Some(example.len()),
        }

        let label = label.into();
        let idx = match self.class_position(&label) {
            Some(idx) => idx,
            None => {
                self.classes.push(ClassExamples {
                    label,
                    data: Vec::new(),
                    count: 0,
                });
                self.classes.len() - 1
            }
        };
        let class = &mut self.classes[idx];
        class.data.extend_from_slice(example);
        class.count += 1;
        self.cache = None;
        Ok(())
    }

    /// Classifies `input` by majority vote among the `k` most similar
    /// examples.
    ///
    /// If fewer than `k` examples exist, all of them vote. Similarity ties
    /// prefer the earlier example; vote ties prefer the earlier class.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no examples were added, `InvalidArgument`
    /// if `k == 0` or `input` is non-finite, and `DimensionMismatch` if the
    /// width of `input` is wrong.
    pub fn predict_class(&mut self, input: &[f32], k: usize) -> Result<KnnPrediction> {
        let n_features = match self.n_features {
            Some(d) if self.num_examples() > 0 => d,
            _ => {
                return Err(AgruparError::invalid_state(
                    "no examples: call add_example() before predict_class()",
                ))
            }
        };
        if k == 0 {
            return Err(AgruparError::invalid_argument("k must be at least 1"));
        }
        if input.len() != n_features {
            return Err(AgruparError::dimension_mismatch(
                "input width",
                n_features,
                input.len(),
            ));
        }
        if input.iter().any(|v| !v.is_finite()) {
            return Err(AgruparError::invalid_argument(
                "input contains NaN or infinite values",
            ));
        }

        self.ensure_cache()?;
        let cache = self
            .cache
            .as_ref()
            .ok_or_else(|| AgruparError::invalid_state("similarity cache unavailable"))?;
        let query = Vector::from_slice(input).normalized();
        let similarities = cache.normalized.matvec(&query)?;

        let mut order: Vec<usize> = (0..similarities.len()).collect();
        // Stable sort keeps lower rows first among equal similarities
        order.sort_by(|&a, &b| similarities[b].total_cmp(&similarities[a]));
        let k_eff = k.min(order.len());

        let mut votes = vec![0usize; self.classes.len()];
        for &row in &order[..k_eff] {
            votes[cache.row_class[row]] += 1;
        }

        let mut class_index = 0;
        for (idx, &v) in votes.iter().enumerate() {
            if v > votes[class_index] {
                class_index = idx;
            }
        }

        let confidences = self
            .classes
            .iter()
            .zip(&votes)
            .map(|(class, &v)| (class.label.clone(), v as f32 / k_eff as f32))
            .collect();

        tracing::trace!(k_eff, class_index, "knn prediction");
        Ok(KnnPrediction {
            label: self.classes[class_index].label.clone(),
            class_index,
            confidences,
        })
    }

    /// Removes every example of `label`. Returns whether the class existed.
    ///
    /// Later classes shift down one index. Removing the last class also
    /// forgets the feature count.
    pub fn clear_class(&mut self, label: &str) -> bool {
        match self.class_position(label) {
            Some(idx) => {
                self.classes.remove(idx);
                if self.classes.is_empty() {
                    self.n_features = None;
                }
                self.cache = None;
                true
            }
            None => false,
        }
    }

    /// Removes all examples and forgets the feature count.
    pub fn clear_all_classes(&mut self) {
        self.classes.clear();
        self.n_features = None;
        self.cache = None;
    }

    /// Number of classes with at least one example.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Examples per class label.
    #[must_use]
    pub fn class_example_count(&self) -> BTreeMap<String, usize> {
        self.classes
            .iter()
            .map(|c| (c.label.clone(), c.count))
            .collect()
    }

    /// Total number of examples.
    #[must_use]
    pub fn num_examples(&self) -> usize {
        self.classes.iter().map(|c| c.count).sum()
    }

    /// Feature count fixed by the first example, if any.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    /// Examples per class as `(label, examples)` in class-index order.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if a class holds a partial row.
    pub fn classifier_dataset(&self) -> Result<Vec<(String, Matrix<f32>)>> {
        let n_features = self.n_features.unwrap_or(0);
        self.classes
            .iter()
            .map(|c| Ok((c.label.clone(), c.to_matrix(n_features)?)))
            .collect()
    }

    /// Replaces all examples with `dataset`.
    ///
    /// Classes with no rows are skipped. On error the classifier is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the matrices disagree on width, and
    /// `InvalidArgument` for a repeated label, zero-width examples or
    /// non-finite values.
    pub fn set_classifier_dataset(&mut self, dataset: Vec<(String, Matrix<f32>)>) -> Result<()> {
        let mut n_features = None;
        let mut classes: Vec<ClassExamples> = Vec::with_capacity(dataset.len());
        for (label, examples) in dataset {
            if examples.n_rows() == 0 {
                continue;
            }
            if examples.n_cols() == 0 {
                return Err(AgruparError::invalid_argument(format!(
                    "examples of class '{label}' have no features"
                )));
            }
            match n_features {
                Some(d) if d != examples.n_cols() => {
                    return Err(AgruparError::dimension_mismatch(
                        &format!("examples of class '{label}'"),
                        d,
                        examples.n_cols(),
                    ));
                }
                _ => n_features = Some(examples.n_cols()),
            }
            if !examples.is_finite() {
                return Err(AgruparError::invalid_argument(format!(
                    "examples of class '{label}' contain NaN or infinite values"
                )));
            }
            if classes.iter().any(|c| c.label == label) {
                return Err(AgruparError::invalid_argument(format!(
                    "duplicate class label '{label}'"
                )));
            }
            let count = examples.n_rows();
            classes.push(ClassExamples {
                label,
                data: examples.into_vec(),
                count,
            });
        }

        self.classes = classes;
        self.n_features = n_features;
        self.cache = None;
        Ok(())
    }

    /// Saves the examples as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads examples saved by [`KnnClassifier::save`].
    ///
    /// The stored classes go through the same checks as
    /// [`KnnClassifier::set_classifier_dataset`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed,
    /// `DimensionMismatch` if a class's data does not hold `count` full
    /// rows, and `InvalidArgument` for repeated labels or non-finite values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let stored: StoredClassifier = serde_json::from_str(&json)?;
        Self::try_from(stored)
    }

    fn class_position(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.label == label)
    }

    fn ensure_cache(&mut self) -> Result<()> {
        if self.cache.is_none() {
            let n_features = self.n_features.unwrap_or(0);
            let parts = self
                .classes
                .iter()
                .map(|class| class.to_matrix(n_features))
                .collect::<Result<Vec<_>>>()?;
            let stacked = Matrix::vstack(&parts.iter().collect::<Vec<_>>())?;
            let row_class: Vec<usize> = self
                .classes
                .iter()
                .enumerate()
                .flat_map(|(idx, class)| std::iter::repeat(idx).take(class.count))
                .collect();
            tracing::debug!(
                n_examples = row_class.len(),
                n_classes = self.classes.len(),
                "rebuilt knn similarity cache"
            );
            self.cache = Some(SimilarityCache {
                normalized: stacked.normalize_rows(),
                row_class,
            });
        }
        Ok(())
    }

    #[cfg(test)]
    fn is_cached(&self) -> bool {
        self.cache.is_some()
    }
}

impl TryFrom<StoredClassifier> for KnnClassifier {
    type Error = AgruparError;

    fn try_from(stored: StoredClassifier) -> Result<Self> {
        let n_features = stored.n_features.unwrap_or(0);
        let dataset = stored
            .classes
            .into_iter()
            .map(|class| {
                let examples = class.to_matrix(n_features)?;
                Ok((class.label, examples))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut knn = Self::new();
        knn.set_classifier_dataset(dataset)?;
        Ok(knn)
    }
}

#[cfg(test)]
#[path = "tests_knn_contract.rs"]
mod tests_knn_contract;
