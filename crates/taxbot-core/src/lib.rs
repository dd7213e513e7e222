//! Core library for tax document processing.
//!
//! This crate provides:
//! - Field extraction from OCR text of W-2 forms and receipts (EIN, wages,
//!   federal tax withheld, receipt date, total and expense category)
//! - Deduction recommendation from a user profile, backed by a trained
//!   classifier with a fixed fallback
//! - Model training and persistence
//! - Configuration and data models

pub mod deduction;
pub mod document;
pub mod error;
pub mod models;

pub use deduction::{
    DeductionRecommender, DeductionTrainer, FeatureVector, Scorer, ScorerCell, TrainingSet,
};
pub use document::{ExtractionResult, FieldExtractor, FileTextSource, RuleSet, TextSource};
pub use error::{ExtractionError, RecommendError, Result, TaxbotError};
pub use models::config::TaxbotConfig;
pub use models::deduction::{
    DeductionCandidate, DeductionCategory, ExpenseCategory, RecommendationReport, ScorerKind,
};
pub use models::document::{DocumentType, ExtractedFields, FieldValue};
pub use models::profile::{FilingStatus, UserProfile};

/// Re-export inference types.
pub use taxbot_inference::{Classifier, FileModelStore, ForestParams, ModelStore, RandomForest};
