//! Configuration structures for the extraction and recommendation pipelines.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use taxbot_inference::ForestParams;

use crate::models::deduction::ExpenseCategory;

/// Main configuration for taxbot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxbotConfig {
    /// Document field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Deduction recommendation configuration.
    pub recommendation: RecommendationConfig,

    /// Model training and persistence configuration.
    pub model: ModelConfig,
}

/// Document field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Return an error for document types without a rule set instead of an
    /// empty field map.
    pub reject_unsupported_types: bool,

    /// Largest OCR text accepted, in bytes.
    pub max_text_bytes: usize,

    /// Receipt category keywords, checked in list order.
    pub category_rules: Vec<CategoryRule>,
}

/// Keywords that select one expense category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: ExpenseCategory,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: ExpenseCategory, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Built-in receipt category priority list.
pub fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            ExpenseCategory::OfficeSupplies,
            &["staples", "office", "supplies", "paper", "ink"],
        ),
        CategoryRule::new(
            ExpenseCategory::Meals,
            &["restaurant", "cafe", "coffee", "lunch", "dinner"],
        ),
        CategoryRule::new(
            ExpenseCategory::Travel,
            &["hotel", "flight", "airline", "lodging"],
        ),
        CategoryRule::new(
            ExpenseCategory::Equipment,
            &["computer", "software", "hardware", "printer"],
        ),
    ]
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            reject_unsupported_types: false,
            max_text_bytes: 1024 * 1024,
            category_rules: default_category_rules(),
        }
    }
}

/// Deduction recommendation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// A category is recommended when its probability is strictly above this.
    pub confidence_threshold: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
        }
    }
}

/// Model file location and training parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing the persisted model.
    pub model_dir: PathBuf,

    /// Model file name.
    pub model_file: String,

    /// Number of trees to fit.
    pub n_estimators: usize,

    /// Maximum tree depth (unlimited when absent).
    pub max_depth: Option<usize>,

    /// Minimum samples required to split a node.
    pub min_samples_split: usize,

    /// Random seed for training.
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let forest = ForestParams::default();
        Self {
            model_dir: PathBuf::from("models"),
            model_file: "deduction_model.json".to_string(),
            n_estimators: forest.n_estimators,
            max_depth: forest.max_depth,
            min_samples_split: forest.min_samples_split,
            seed: forest.seed,
        }
    }
}

impl ModelConfig {
    /// Full path of the persisted model.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }

    /// Forest hyper-parameters.
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            seed: self.seed,
        }
    }
}

impl TaxbotConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TaxbotConfig::default();
        assert_eq!(config.recommendation.confidence_threshold, 0.5);
        assert!(!config.extraction.reject_unsupported_types);
        assert_eq!(config.model.n_estimators, 100);
        assert_eq!(config.model.seed, 42);
        assert_eq!(
            config.model.model_path(),
            PathBuf::from("models").join("deduction_model.json")
        );
    }

    #[test]
    fn test_category_rule_order() {
        let order: Vec<ExpenseCategory> = default_category_rules().iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![
                ExpenseCategory::OfficeSupplies,
                ExpenseCategory::Meals,
                ExpenseCategory::Travel,
                ExpenseCategory::Equipment,
            ]
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TaxbotConfig =
            serde_json::from_str(r#"{"recommendation": {"confidence_threshold": 0.7}}"#).unwrap();
        assert_eq!(config.recommendation.confidence_threshold, 0.7);
        assert_eq!(config.extraction.max_text_bytes, 1024 * 1024);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TaxbotConfig::default();
        config.extraction.reject_unsupported_types = true;
        config.save(&path).unwrap();

        let loaded = TaxbotConfig::from_file(&path).unwrap();
        assert!(loaded.extraction.reject_unsupported_types);
    }
}
