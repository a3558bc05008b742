//! Error types for the heart disease pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, HeartError>;

/// Main error type shared by training, persistence and inference
#[derive(Error, Debug)]
pub enum HeartError {
    /// Bad or missing training data; aborts the training run
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Feature dimensionality disagrees with the fitted scaler or model
    #[error("Schema mismatch: expected {expected} features, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// A persisted artifact is absent at startup
    #[error("Artifact missing: {0}")]
    ArtifactMissing(String),

    /// Internal failure while scoring a record; detail is logged, never returned
    #[error("Prediction could not be completed")]
    PredictionFailure,

    #[error("Training error: {0}")]
    Training(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for HeartError {
    fn from(err: polars::error::PolarsError) -> Self {
        HeartError::DataFormat(err.to_string())
    }
}

impl From<serde_json::Error> for HeartError {
    fn from(err: serde_json::Error) -> Self {
        HeartError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for HeartError {
    fn from(err: bincode::Error) -> Self {
        HeartError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for HeartError {
    fn from(err: ndarray::ShapeError) -> Self {
        HeartError::DataFormat(format!("invalid array shape: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HeartError::DataFormat("missing target column 'num'".to_string());
        assert_eq!(err.to_string(), "Data format error: missing target column 'num'");

        let err = HeartError::SchemaMismatch { expected: 13, actual: 12 };
        assert_eq!(err.to_string(), "Schema mismatch: expected 13 features, got 12");
    }

    #[test]
    fn test_prediction_failure_hides_detail() {
        assert_eq!(
            HeartError::PredictionFailure.to_string(),
            "Prediction could not be completed"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HeartError = io_err.into();
        assert!(matches!(err, HeartError::Io(_)));
    }
}
