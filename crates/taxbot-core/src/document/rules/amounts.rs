//! Amount extraction for W-2 forms and receipts.

use regex::{Match, Regex};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{FEDERAL_AMOUNT, RECEIPT_TOTAL, TRAILING_AMOUNT, WAGES_AMOUNT};
use super::{ExtractionMatch, FieldRule, RuleResult};
use crate::error::ExtractionError;
use crate::models::document::{field, FieldValue};

/// Amount following an anchor word, e.g. `Wages ... 52,340.17`.
///
/// First match wins. Any amount after the anchor is accepted, so a different
/// box printed between the anchor and the intended value is picked up
/// instead.
pub struct AnchoredAmountRule {
    field: &'static str,
    pattern: &'static Regex,
}

impl AnchoredAmountRule {
    pub fn new(field: &'static str, pattern: &'static Regex) -> Self {
        Self { field, pattern }
    }

    /// W-2 box 1, anchored on `Wages`.
    pub fn wages() -> Self {
        Self::new(field::WAGES, &WAGES_AMOUNT)
    }

    /// W-2 box 2, anchored on `Federal`.
    pub fn federal_tax_withheld() -> Self {
        Self::new(field::FEDERAL_TAX_WITHHELD, &FEDERAL_AMOUNT)
    }
}

impl FieldRule for AnchoredAmountRule {
    fn field(&self) -> &'static str {
        self.field
    }

    fn apply(&self, text: &str) -> RuleResult {
        let Some(caps) = self.pattern.captures(text) else {
            return Ok(None);
        };
        let Some(amount) = caps.get(1) else {
            return Ok(None);
        };

        let value = parse_amount_field(self.field, amount.as_str())?;
        Ok(Some(
            ExtractionMatch::new(FieldValue::Amount(value), 0.85, amount.as_str())
                .with_position(amount.start(), amount.end()),
        ))
    }
}

/// Receipt total.
///
/// Prefers the amount on a line labelled `TOTAL` (any case). A `SUBTOTAL`
/// line is used only when no plain `TOTAL` label has an amount. Without any
/// label, falls back to a bare amount at the very end of the text.
pub struct ReceiptTotalRule;

impl ReceiptTotalRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReceiptTotalRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for ReceiptTotalRule {
    fn field(&self) -> &'static str {
        field::AMOUNT
    }

    fn apply(&self, text: &str) -> RuleResult {
        let (amount, confidence) = match labelled_total(text) {
            Some(m) => (m, 0.95),
            None => match TRAILING_AMOUNT.captures(text).and_then(|c| c.get(1)) {
                Some(m) => (m, 0.6),
                None => return Ok(None),
            },
        };

        let value = parse_amount_field(field::AMOUNT, amount.as_str())?;
        Ok(Some(
            ExtractionMatch::new(FieldValue::Amount(value), confidence, amount.as_str())
                .with_position(amount.start(), amount.end()),
        ))
    }
}

fn labelled_total(text: &str) -> Option<Match<'_>> {
    let mut subtotal = None;
    for caps in RECEIPT_TOTAL.captures_iter(text) {
        let (Some(label), Some(amount)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !follows_sub(text, label.start()) {
            return Some(amount);
        }
        subtotal.get_or_insert(amount);
    }
    subtotal
}

fn follows_sub(text: &str, label_start: usize) -> bool {
    label_start
        .checked_sub(3)
        .and_then(|start| text.get(start..label_start))
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("sub"))
}

fn parse_amount_field(field: &str, raw: &str) -> Result<Decimal, ExtractionError> {
    parse_us_amount(raw).ok_or_else(|| ExtractionError::Parse {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Parse a US-formatted amount (e.g. "1,234.56" or "1234.56").
pub fn parse_us_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    Decimal::from_str(cleaned.trim()).ok()
}
