//! Probabilistic classifier layer for taxbot.
//!
//! This crate provides:
//! - the [`Classifier`] trait the deduction scorer is written against
//! - a pure-Rust random forest with `fit` / `predict_proba`
//! - feature-matrix helpers over `ndarray`
//! - the model persistence boundary ([`ModelStore`], [`FileModelStore`])

mod backend;
mod error;
mod store;
mod tensor;

pub use backend::forest::{ForestParams, RandomForest};
pub use backend::tree::DecisionTree;
pub use backend::Classifier;
pub use error::InferenceError;
pub use store::{FileModelStore, MemoryModelStore, ModelStore};
pub use tensor::FeatureMatrix;

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
