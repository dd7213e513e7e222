//! Keyword-based expense categorization for receipts.

use super::{ExtractionMatch, FieldRule, RuleResult};
use crate::models::config::{default_category_rules, CategoryRule};
use crate::models::deduction::ExpenseCategory;
use crate::models::document::{field, FieldValue};

/// Maps free text to one expense category.
///
/// Rules are checked in list order and the first category with any keyword
/// occurring in the lowercased text wins, so a receipt mentioning both
/// "coffee" and "printer" is `meals`.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<(ExpenseCategory, Vec<String>)>,
}

impl CategoryClassifier {
    /// Classifier with the built-in priority list.
    pub fn new() -> Self {
        Self::from_rules(&default_category_rules())
    }

    /// Classifier with a custom priority list. Keywords are lowercased.
    pub fn from_rules(rules: &[CategoryRule]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|r| {
                    let keywords = r.keywords.iter().map(|k| k.to_lowercase()).collect();
                    (r.category, keywords)
                })
                .collect(),
        }
    }

    /// Classify text, returning the first matching category.
    pub fn classify(&self, text: &str) -> Option<ExpenseCategory> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k.as_str())))
            .map(|(category, _)| *category)
    }

    /// Categories in priority order.
    pub fn priority(&self) -> Vec<ExpenseCategory> {
        self.rules.iter().map(|(c, _)| *c).collect()
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Receipt `category` field backed by a [`CategoryClassifier`].
pub struct CategoryFieldRule {
    classifier: CategoryClassifier,
}

impl CategoryFieldRule {
    pub fn new(classifier: CategoryClassifier) -> Self {
        Self { classifier }
    }
}

impl FieldRule for CategoryFieldRule {
    fn field(&self) -> &'static str {
        field::CATEGORY
    }

    fn apply(&self, text: &str) -> RuleResult {
        Ok(self.classifier.classify(text).map(|category| {
            ExtractionMatch::new(FieldValue::Text(category.as_str().to_string()), 0.7, category.as_str())
        }))
    }
}
