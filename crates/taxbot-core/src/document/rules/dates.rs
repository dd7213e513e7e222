//! Date extraction for receipts.

use super::patterns::RECEIPT_DATE;
use super::{ExtractionMatch, FieldRule, RuleResult};
use crate::models::document::{field, FieldValue};

/// Receipt date rule: first `M/D/YYYY`-shaped substring, kept as printed.
pub struct ReceiptDateRule;

impl ReceiptDateRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReceiptDateRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for ReceiptDateRule {
    fn field(&self) -> &'static str {
        field::DATE
    }

    fn apply(&self, text: &str) -> RuleResult {
        Ok(RECEIPT_DATE.find(text).map(|m| {
            ExtractionMatch::new(FieldValue::Date(m.as_str().to_string()), 0.9, m.as_str())
                .with_position(m.start(), m.end())
        }))
    }
}

/// Extract the receipt date from text.
pub fn extract_receipt_date(text: &str) -> Option<String> {
    RECEIPT_DATE.find(text).map(|m| m.as_str().to_string())
}
