//! Error types for the inference layer.

use thiserror::Error;

/// Errors that can occur while fitting, loading or running a classifier.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Failed to load a persisted model.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Training data or prediction input is unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Input width does not match the model's feature schema.
    #[error("shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The classifier has no fitted trees.
    #[error("model is not fitted")]
    NotFitted,

    /// Model (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error when reading or writing model files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
