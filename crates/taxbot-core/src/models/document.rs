//! Document types and extracted field values.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Field names produced by the extraction rules.
pub mod field {
    pub const EMPLOYER_EIN: &str = "employer_ein";
    pub const WAGES: &str = "wages";
    pub const FEDERAL_TAX_WITHHELD: &str = "federal_tax_withheld";
    pub const DATE: &str = "date";
    pub const AMOUNT: &str = "amount";
    pub const CATEGORY: &str = "category";
}

/// Kind of scanned document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentType {
    /// Form W-2 wage and tax statement.
    W2,
    /// Purchase receipt.
    Receipt,
    /// Anything without a rule set; keeps the caller's original label.
    Unsupported(String),
}

impl DocumentType {
    /// Parse a document type label (case-insensitive, surrounding whitespace ignored).
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "w2" => DocumentType::W2,
            "receipt" => DocumentType::Receipt,
            _ => DocumentType::Unsupported(s.to_string()),
        }
    }

    /// Canonical label.
    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::W2 => "w2",
            DocumentType::Receipt => "receipt",
            DocumentType::Unsupported(label) => label,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DocumentType::Unsupported(_))
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DocumentType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(DocumentType::parse(&label))
    }
}

/// Typed value of an extracted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Free text, e.g. an EIN or a category label.
    Text(String),
    /// Monetary amount.
    Amount(Decimal),
    /// Date exactly as printed on the document.
    Date(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) => Some(s),
            FieldValue::Amount(_) => None,
        }
    }

    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            FieldValue::Amount(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) => f.write_str(s),
            FieldValue::Amount(d) => write!(f, "{:.2}", d),
        }
    }
}

/// Fields extracted from one document.
///
/// A key is present only when its rule matched. The map is built by the
/// extractor and cannot be modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedFields(BTreeMap<String, FieldValue>);

impl ExtractedFields {
    pub(crate) fn from_map(map: BTreeMap<String, FieldValue>) -> Self {
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Shorthand for amount fields.
    pub fn amount(&self, name: &str) -> Option<Decimal> {
        self.get(name).and_then(FieldValue::as_amount)
    }

    /// Shorthand for text and date fields.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }
}
