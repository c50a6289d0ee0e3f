//! Error types for agrupar operations.
//!
//! Every fallible operation in the crate returns [`Result`], so argument and
//! state checks surface to the caller before any work is done.

use thiserror::Error;

/// Main error type for agrupar operations.
///
/// # Examples
///
/// ```
/// use agrupar::error::AgruparError;
///
/// let err = AgruparError::DimensionMismatch {
///     expected: "n_features=2".to_string(),
///     actual: "3".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Error, Debug)]
pub enum AgruparError {
    /// Input data is malformed or violates an operation's preconditions.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the input
        message: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// The model is not in a state that allows the operation.
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the violated state requirement
        message: String,
    },

    /// Another `fit()` call is in flight on the same instance.
    #[error("Concurrent operation rejected: {message}")]
    ConcurrentOperation {
        /// Which operation was rejected
        message: String,
    },

    /// A cluster received no members, so its mean is undefined.
    #[error("Numeric degeneracy: cluster {cluster} has no assigned samples")]
    NumericDegeneracy {
        /// Index of the empty cluster
        cluster: usize,
    },

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// I/O error while reading or writing configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AgruparError {
    fn from(err: serde_json::Error) -> Self {
        AgruparError::Serialization(err.to_string())
    }
}

impl AgruparError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::invalid_argument(format!("empty input: {context}"))
    }

    /// Returns true for errors caused by the model's state rather than its
    /// input: `InvalidState` and `ConcurrentOperation`.
    #[must_use]
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidState { .. } | Self::ConcurrentOperation { .. }
        )
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, AgruparError>;
