//! Rule-based field extractors for tax documents.
//!
//! Each rule owns one output field: a pattern, how the match is read, and
//! how the matched text is converted into a [`FieldValue`]. Rules are
//! composed into per-document-type rule sets by the parser.

pub mod amounts;
pub mod category;
pub mod dates;
pub mod ein;
pub mod patterns;

pub use amounts::{parse_us_amount, AnchoredAmountRule, ReceiptTotalRule};
pub use category::{CategoryClassifier, CategoryFieldRule};
pub use dates::{extract_receipt_date, ReceiptDateRule};
pub use ein::{extract_ein, EinRule};

use crate::error::ExtractionError;
use crate::models::document::FieldValue;

/// Result type for rule evaluation.
pub type RuleResult = std::result::Result<Option<ExtractionMatch<FieldValue>>, ExtractionError>;

/// Trait for single-field extraction rules.
///
/// `Ok(None)` means the text does not contain the field. `Err` is reserved
/// for matched text that cannot be converted, which indicates a fault
/// rather than a noisy document.
pub trait FieldRule: Send + Sync {
    /// Name of the field this rule produces.
    fn field(&self) -> &'static str;

    /// Extract the field from text.
    fn apply(&self, text: &str) -> RuleResult;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
