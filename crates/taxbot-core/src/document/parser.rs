//! Document field extractor dispatching to per-type rule sets.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::models::config::ExtractionConfig;
use crate::models::document::{DocumentType, ExtractedFields, FieldValue};

use super::rules::{
    AnchoredAmountRule, CategoryClassifier, CategoryFieldRule, EinRule, FieldRule,
    ReceiptDateRule, ReceiptTotalRule,
};
use super::source::TextSource;
use super::{ExtractionError, Result};

/// Result of document extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Document type the text was parsed as.
    pub document_type: DocumentType,
    /// Extracted fields.
    pub fields: ExtractedFields,
    /// Confidence of each extracted field.
    pub field_confidence: BTreeMap<String, f32>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    fn empty(document_type: &DocumentType, warning: String, start: Instant) -> Self {
        Self {
            document_type: document_type.clone(),
            fields: ExtractedFields::default(),
            field_confidence: BTreeMap::new(),
            warnings: vec![warning],
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Ordered rules for one document type.
pub struct RuleSet {
    document_type: DocumentType,
    rules: Vec<Box<dyn FieldRule>>,
}

impl RuleSet {
    /// Empty rule set.
    pub fn new(document_type: DocumentType) -> Self {
        Self {
            document_type,
            rules: Vec::new(),
        }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: impl FieldRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// W-2: employer EIN, wages, federal tax withheld.
    pub fn w2() -> Self {
        Self::new(DocumentType::W2)
            .with_rule(EinRule::new())
            .with_rule(AnchoredAmountRule::wages())
            .with_rule(AnchoredAmountRule::federal_tax_withheld())
    }

    /// Receipt: date, total amount, expense category.
    pub fn receipt(classifier: CategoryClassifier) -> Self {
        Self::new(DocumentType::Receipt)
            .with_rule(ReceiptDateRule::new())
            .with_rule(ReceiptTotalRule::new())
            .with_rule(CategoryFieldRule::new(classifier))
    }

    pub fn document_type(&self) -> &DocumentType {
        &self.document_type
    }

    /// Names of the fields this set can produce, in evaluation order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.field()).collect()
    }
}

/// Extracts typed fields from OCR text.
pub struct FieldExtractor {
    rule_sets: Vec<RuleSet>,
    reject_unsupported: bool,
    max_text_bytes: usize,
}

impl FieldExtractor {
    /// Create an extractor with the built-in W-2 and receipt rules.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let classifier = CategoryClassifier::from_rules(&config.category_rules);
        Self {
            rule_sets: vec![RuleSet::w2(), RuleSet::receipt(classifier)],
            reject_unsupported: config.reject_unsupported_types,
            max_text_bytes: config.max_text_bytes,
        }
    }

    /// Register a rule set, replacing any existing set for the same type.
    pub fn with_rule_set(mut self, rule_set: RuleSet) -> Self {
        self.rule_sets
            .retain(|s| s.document_type != rule_set.document_type);
        self.rule_sets.push(rule_set);
        self
    }

    /// Set whether unsupported document types are an error.
    pub fn with_unsupported_rejection(mut self, reject: bool) -> Self {
        self.reject_unsupported = reject;
        self
    }

    /// Set the maximum accepted text size in bytes.
    pub fn with_max_text_bytes(mut self, max: usize) -> Self {
        self.max_text_bytes = max;
        self
    }

    /// Document types with a registered rule set.
    pub fn supported_types(&self) -> Vec<&DocumentType> {
        self.rule_sets.iter().map(|s| &s.document_type).collect()
    }

    /// Extract fields from text.
    ///
    /// Fields that do not match are absent. Only an unsupported document
    /// type with rejection enabled returns an error.
    pub fn extract(&self, document_type: &DocumentType, text: &str) -> Result<ExtractedFields> {
        self.parse(document_type, text).map(|r| r.fields)
    }

    /// Extract fields with confidence scores and warnings.
    pub fn parse(&self, document_type: &DocumentType, text: &str) -> Result<ExtractionResult> {
        let start = Instant::now();

        let Some(rule_set) = self
            .rule_sets
            .iter()
            .find(|s| &s.document_type == document_type)
        else {
            if self.reject_unsupported {
                return Err(ExtractionError::UnsupportedDocumentType(
                    document_type.to_string(),
                ));
            }
            debug!("No rules for document type '{}'", document_type);
            return Ok(ExtractionResult::empty(
                document_type,
                format!("Unsupported document type: {}", document_type),
                start,
            ));
        };

        info!(
            "Parsing {} document from {} characters of text",
            document_type,
            text.len()
        );

        if text.len() > self.max_text_bytes {
            let fault = ExtractionError::TextTooLong {
                len: text.len(),
                max: self.max_text_bytes,
            };
            error!("Skipping {} extraction: {}", document_type, fault);
            return Ok(ExtractionResult::empty(document_type, fault.to_string(), start));
        }

        let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
        let mut field_confidence = BTreeMap::new();
        let mut warnings = Vec::new();

        for rule in &rule_set.rules {
            match rule.apply(text) {
                Ok(Some(m)) => {
                    debug!("{} = {} (confidence {:.2})", rule.field(), m.value, m.confidence);
                    field_confidence.insert(rule.field().to_string(), m.confidence);
                    fields.insert(rule.field().to_string(), m.value);
                }
                Ok(None) => {
                    warnings.push(format!("Could not extract {}", rule.field()));
                }
                Err(fault) => {
                    error!("{} extraction failed on {}: {}", document_type, rule.field(), fault);
                    return Ok(ExtractionResult::empty(document_type, fault.to_string(), start));
                }
            }
        }

        debug!(
            "Extracted {} of {} fields from {} document",
            fields.len(),
            rule_set.rules.len(),
            document_type
        );

        Ok(ExtractionResult {
            document_type: document_type.clone(),
            fields: ExtractedFields::from_map(fields),
            field_confidence,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Extract fields from an OCR text source.
    ///
    /// A source that fails to produce text yields an empty result.
    pub fn extract_from_source(
        &self,
        document_type: &DocumentType,
        source: &dyn TextSource,
    ) -> Result<ExtractionResult> {
        match source.text() {
            Ok(text) => self.parse(document_type, &text),
            Err(fault) => {
                if self.reject_unsupported && !self.supports(document_type) {
                    return Err(ExtractionError::UnsupportedDocumentType(
                        document_type.to_string(),
                    ));
                }
                error!("No text from {}: {}", source.describe(), fault);
                Ok(ExtractionResult::empty(
                    document_type,
                    fault.to_string(),
                    Instant::now(),
                ))
            }
        }
    }

    fn supports(&self, document_type: &DocumentType) -> bool {
        self.rule_sets.iter().any(|s| &s.document_type == document_type)
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::field;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const W2_TEXT: &str = r#"
        Form W-2 Wage and Tax Statement 2024
        b Employer identification number (EIN)
        12-3456789
        c Employer's name, address, and ZIP code
        ACME WIDGETS INC
        1 Wages, tips, other compensation
        85,432.10
        2 Federal income tax withheld
        12,004.55
    "#;

    const RECEIPT_TEXT: &str = r#"
        BLUE BOTTLE COFFEE
        03/14/2024 08:12
        Latte            5.25
        Croissant        4.00
        SUBTOTAL         9.25
        TAX              0.81
        TOTAL           10.06
        VISA ****1234   10.06
    "#;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_w2() {
        let fields = FieldExtractor::new().extract(&DocumentType::W2, W2_TEXT).unwrap();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields.text(field::EMPLOYER_EIN), Some("12-3456789"));
        assert_eq!(fields.amount(field::WAGES), Some(dec("85432.10")));
        assert_eq!(fields.amount(field::FEDERAL_TAX_WITHHELD), Some(dec("12004.55")));
    }

    #[test]
    fn test_parse_w2_with_ungrouped_wages() {
        let text = "1 Wages, tips 50000.00\n2 Federal income tax withheld 6,000.00";
        let fields = FieldExtractor::new().extract(&DocumentType::W2, text).unwrap();

        assert_eq!(fields.amount(field::WAGES), Some(dec("50000.00")));
        assert_eq!(fields.amount(field::FEDERAL_TAX_WITHHELD), Some(dec("6000.00")));
    }

    #[test]
    fn test_parse_receipt() {
        let result = FieldExtractor::new()
            .parse(&DocumentType::Receipt, RECEIPT_TEXT)
            .unwrap();

        assert_eq!(result.fields.text(field::DATE), Some("03/14/2024"));
        assert_eq!(result.fields.amount(field::AMOUNT), Some(dec("10.06")));
        assert_eq!(result.fields.text(field::CATEGORY), Some("meals"));
        assert!(result.warnings.is_empty());
        assert_eq!(result.field_confidence.get(field::AMOUNT), Some(&0.95));
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let result = FieldExtractor::new()
            .parse(&DocumentType::W2, "smudged scan, nothing legible")
            .unwrap();

        assert!(result.fields.is_empty());
        assert_eq!(
            result.warnings,
            vec![
                "Could not extract employer_ein".to_string(),
                "Could not extract wages".to_string(),
                "Could not extract federal_tax_withheld".to_string(),
            ]
        );
    }

    #[test]
    fn test_partial_receipt() {
        let fields = FieldExtractor::new()
            .extract(&DocumentType::Receipt, "Some shop\n7/4/2024")
            .unwrap();

        assert_eq!(fields.len(), 1);
        assert!(fields.contains(field::DATE));
        assert!(!fields.contains(field::AMOUNT));
        assert!(!fields.contains(field::CATEGORY));
    }

    #[test]
    fn test_unsupported_type_is_empty_by_default() {
        let doc = DocumentType::parse("1099");
        let result = FieldExtractor::new().parse(&doc, W2_TEXT).unwrap();

        assert!(result.fields.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_unsupported_type_rejected_when_strict() {
        let extractor = FieldExtractor::new().with_unsupported_rejection(true);
        let err = extractor
            .extract(&DocumentType::parse("1099"), W2_TEXT)
            .unwrap_err();

        assert!(matches!(err, ExtractionError::UnsupportedDocumentType(ref t) if t == "1099"));
    }

    #[test]
    fn test_fault_empties_whole_result() {
        let text = format!("12-3456789\nWages {}.00", vec!["999"; 12].join(","));
        let result = FieldExtractor::new().parse(&DocumentType::W2, &text).unwrap();

        assert!(result.fields.is_empty());
        assert!(result.warnings[0].contains("wages"));
    }

    #[test]
    fn test_oversized_text_is_empty() {
        let extractor = FieldExtractor::new().with_max_text_bytes(16);
        let result = extractor.parse(&DocumentType::W2, W2_TEXT).unwrap();

        assert!(result.fields.is_empty());
        assert!(result.warnings[0].contains("limit is 16"));
    }

    #[test]
    fn test_idempotent() {
        let extractor = FieldExtractor::new();
        let first = extractor.extract(&DocumentType::Receipt, RECEIPT_TEXT).unwrap();
        let second = extractor.extract(&DocumentType::Receipt, RECEIPT_TEXT).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ein_property_over_noise() {
        let extractor = FieldExtractor::new();
        for noise in ["", "Box b: ", "$$ ocr ~~ ", "Wages 1,000.00\n"] {
            for ein in ["00-0000000", "12-3456789", "98-7654321"] {
                let text = format!("{}{} trailing", noise, ein);
                let fields = extractor.extract(&DocumentType::W2, &text).unwrap();
                assert_eq!(fields.text(field::EMPLOYER_EIN), Some(ein));
            }
        }
    }

    #[test]
    fn test_total_property_over_trailing_decimals() {
        let extractor = FieldExtractor::new();
        for tail in ["", "\nCASH 50.00\nCHANGE 7.50", "\n99.99", "\nSUBTOTAL 1.00 3.33"] {
            let text = format!("Store\nTOTAL 42.50{}", tail);
            let fields = extractor.extract(&DocumentType::Receipt, &text).unwrap();
            assert_eq!(fields.amount(field::AMOUNT), Some(dec("42.50")));
        }
    }

    #[test]
    fn test_total_label_variants() {
        let extractor = FieldExtractor::new();
        for text in [
            "SUBTOTAL 42.50\nTIP 5.00",
            "Store\nTOTAL42.50\nCASH 50.00",
            "SUBTOTAL 40.00\nTAX 2.50\nTOTAL 42.50\nCASH 50.00",
        ] {
            let fields = extractor.extract(&DocumentType::Receipt, text).unwrap();
            assert_eq!(fields.amount(field::AMOUNT), Some(dec("42.50")), "{text}");
        }
    }

    #[test]
    fn test_custom_rule_set_replaces_builtin() {
        let extractor = FieldExtractor::new()
            .with_rule_set(RuleSet::new(DocumentType::W2).with_rule(EinRule::new()));

        let fields = extractor.extract(&DocumentType::W2, W2_TEXT).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(extractor.supported_types().len(), 2);
    }

    struct BrokenOcr;

    impl TextSource for BrokenOcr {
        fn text(&self) -> std::result::Result<String, ExtractionError> {
            Err(ExtractionError::Source("engine returned no text".to_string()))
        }
    }

    #[test]
    fn test_failing_source_yields_empty() {
        let result = FieldExtractor::new()
            .extract_from_source(&DocumentType::Receipt, &BrokenOcr)
            .unwrap();

        assert!(result.fields.is_empty());
        assert!(result.warnings[0].contains("engine returned no text"));
    }

    #[test]
    fn test_string_source() {
        let text = RECEIPT_TEXT.to_string();
        let result = FieldExtractor::new()
            .extract_from_source(&DocumentType::Receipt, &text)
            .unwrap();
        assert_eq!(result.fields.len(), 3);
    }
}
