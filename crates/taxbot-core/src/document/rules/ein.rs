//! Employer identification number (EIN) extraction.

use super::patterns::EIN_PATTERN;
use super::{ExtractionMatch, FieldRule, RuleResult};
use crate::models::document::{field, FieldValue};

/// EIN field rule.
///
/// Takes the first `DD-DDDDDDD` substring verbatim. No checksum or prefix
/// validation is applied.
pub struct EinRule;

impl EinRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EinRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for EinRule {
    fn field(&self) -> &'static str {
        field::EMPLOYER_EIN
    }

    fn apply(&self, text: &str) -> RuleResult {
        Ok(EIN_PATTERN.find(text).map(|m| {
            ExtractionMatch::new(FieldValue::Text(m.as_str().to_string()), 0.9, m.as_str())
                .with_position(m.start(), m.end())
        }))
    }
}

/// Extract the EIN from text.
pub fn extract_ein(text: &str) -> Option<String> {
    EIN_PATTERN.find(text).map(|m| m.as_str().to_string())
}
