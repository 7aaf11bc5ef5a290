//! Error types for network construction, training and inference.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors raised by the network and its configuration helpers.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Invalid construction or hyperparameters. Nothing is built when this is returned.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Malformed input data. Raised before any parameter is touched, so the
    /// caller can fix the data and retry.
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NetworkError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        NetworkError::Config(message.into())
    }

    /// Returns true when the error came from input validation.
    pub fn is_input_error(&self) -> bool {
        matches!(self, NetworkError::Input(_))
    }

    /// Returns true when the error came from network or training configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(self, NetworkError::Config(_))
    }
}

/// Input validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Row {row} has no features")]
    EmptyRow { row: usize },

    #[error("Row {row}: expected {expected} features, got {actual}")]
    FeatureCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid value at row {row}, column {column}: {value}")]
    NonFinite { row: usize, column: usize, value: f64 },

    #[error("Invalid label at index {index}: {label} (expected < {num_classes})")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        num_classes: usize,
    },

    #[error("Number of inputs ({inputs}) doesn't match number of labels ({labels})")]
    LengthMismatch { inputs: usize, labels: usize },

    #[error("Invalid target value at column {column}: {value}")]
    NonFiniteTarget { column: usize, value: f64 },

    #[error("Target vector has length {actual}, expected {expected}")]
    TargetLengthMismatch { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_converts() {
        let err: NetworkError = InputError::EmptyDataset.into();
        assert!(err.is_input_error());
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_error_messages() {
        let err = NetworkError::from(InputError::FeatureCountMismatch {
            row: 3,
            expected: 4,
            actual: 2,
        });
        assert_eq!(
            err.to_string(),
            "Invalid input: Row 3: expected 4 features, got 2"
        );

        let err = NetworkError::config("need at least 2 layer sizes");
        assert!(err.is_config_error());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: need at least 2 layer sizes"
        );
    }
}
