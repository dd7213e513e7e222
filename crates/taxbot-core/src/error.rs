//! Error types for the taxbot-core library.

use thiserror::Error;

/// Main error type for the taxbot library.
#[derive(Error, Debug)]
pub enum TaxbotError {
    /// Document field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Deduction recommendation error.
    #[error("recommendation error: {0}")]
    Recommendation(#[from] RecommendError),

    /// Inference error from the classifier layer.
    #[error("inference error: {0}")]
    Inference(#[from] taxbot_inference::InferenceError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to document field extraction.
///
/// Text that simply matches no rule is not an error; the field is left out
/// of the result instead.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No rule set exists for the document type (strict mode only).
    #[error("unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    /// Input text exceeds the configured size limit.
    #[error("text is {len} bytes, limit is {max}")]
    TextTooLong { len: usize, max: usize },

    /// A rule matched but the matched text could not be converted.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// The OCR text source failed to produce text.
    #[error("text source failed: {0}")]
    Source(String),
}

/// Errors related to deduction recommendation and training.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// The trained model expects a different feature layout.
    #[error("feature schema mismatch: model expects {expected:?}, profile produces {actual:?}")]
    FeatureSchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// The trained model predicts a different set of categories.
    #[error("class schema mismatch: model predicts {actual:?}, expected {expected:?}")]
    ClassSchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// The scorer returned the wrong number of probabilities.
    #[error("scorer returned {actual} probabilities, expected {expected}")]
    ProbabilityShape { expected: usize, actual: usize },

    /// The profile cannot be turned into features.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// The training set is inconsistent.
    #[error("invalid training set: {0}")]
    InvalidTrainingSet(String),

    /// Classifier failure.
    #[error(transparent)]
    Inference(#[from] taxbot_inference::InferenceError),
}

/// Result type for the taxbot library.
pub type Result<T> = std::result::Result<T, TaxbotError>;
