//! Classifier implementations.

pub mod forest;
pub mod tree;

use crate::Result;

/// Trait for fitted probabilistic classifiers.
///
/// The schema accessors let callers verify that the feature layout they
/// build matches the one the model was trained on before asking for a
/// prediction. A mismatch would otherwise produce meaningless
/// probabilities without any error.
pub trait Classifier: Send + Sync {
    /// Predict class probabilities for a single sample.
    ///
    /// # Arguments
    /// * `features` - One row in the order given by [`Classifier::feature_names`]
    ///
    /// # Returns
    /// One probability per class, in the order given by
    /// [`Classifier::class_names`]
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>>;

    /// Feature names in the order the model expects them.
    fn feature_names(&self) -> &[String];

    /// Class names in the order probabilities are returned.
    fn class_names(&self) -> &[String];
}
