//! Deduction recommendation module.
//!
//! A user profile is encoded into a fixed feature vector, scored by a
//! trained classifier (or a fixed fallback when none is available), and
//! every category whose probability clears the threshold is returned with
//! an income-based amount estimate.

pub mod estimate;
pub mod features;
mod recommender;
mod scorer;
pub mod training;

pub use estimate::{estimate_amount, estimate_for_label};
pub use features::{FeatureVector, FEATURE_SCHEMA};
pub use recommender::{default_recommendations, DeductionRecommender};
pub use scorer::{Scorer, ScorerCell};
pub use training::{DeductionTrainer, TrainingSet};
