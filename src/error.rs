//! Error types for the QoS prediction pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, QosError>;

/// Main error type for the QoS prediction pipeline
#[derive(Error, Debug)]
pub enum QosError {
    /// External dataset could not be read or parsed
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// Label column absent from the dataset
    #[error("Target column '{0}' not found in the data")]
    MissingTarget(String),

    /// Transformer used before fitting
    #[error("Transformer not fitted")]
    NotFitted,

    /// Expected feature column absent at transform time
    #[error("Feature column not found: {0}")]
    ColumnNotFound(String),

    /// Category outside the fitted vocabulary seen at transform time
    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// Classifier fit failure
    #[error("Training error: {0}")]
    Training(String),

    /// The model cannot produce calibrated probability estimates
    #[error("Model does not support probability estimates")]
    ProbabilityUnsupported,

    /// Predictions and ground truth disagree on shape
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for QosError {
    fn from(err: polars::error::PolarsError) -> Self {
        QosError::DataLoad(err.to_string())
    }
}
