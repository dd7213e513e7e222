//! Deduction recommender.

use std::sync::Arc;

use chrono::Datelike;
use rust_decimal::Decimal;
use taxbot_inference::{Classifier, FileModelStore, ModelStore};
use tracing::{debug, info};

use super::estimate::estimate_amount;
use super::features::{schema_names, FeatureVector};
use super::scorer::{Scorer, ScorerCell};
use crate::error::RecommendError;
use crate::models::config::TaxbotConfig;
use crate::models::deduction::{DeductionCandidate, DeductionCategory, RecommendationReport};
use crate::models::profile::UserProfile;

/// Fixed recommendations used when no trained model is available.
pub fn default_recommendations() -> Vec<DeductionCandidate> {
    vec![
        DeductionCandidate::new(
            DeductionCategory::CharitableContributions,
            0.8,
            Decimal::from(1_000),
        ),
        DeductionCandidate::new(
            DeductionCategory::RetirementContributions,
            0.9,
            Decimal::from(6_000),
        ),
    ]
}

/// Recommends deduction categories for a user profile.
pub struct DeductionRecommender {
    scorer: ScorerCell,
    threshold: f64,
}

impl DeductionRecommender {
    /// Create a recommender around a scorer cell.
    pub fn new(scorer: ScorerCell) -> Self {
        Self {
            scorer,
            threshold: 0.5,
        }
    }

    /// Create a recommender loading its model from the configured path.
    pub fn from_config(config: &TaxbotConfig) -> Self {
        let store: Arc<dyn ModelStore> = Arc::new(FileModelStore::new(config.model.model_path()));
        Self::new(ScorerCell::new(store))
            .with_threshold(config.recommendation.confidence_threshold)
    }

    /// Set the probability a category must strictly exceed.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn scorer(&self) -> &ScorerCell {
        &self.scorer
    }

    /// Recommend deductions in canonical category order.
    pub fn recommend(
        &self,
        profile: &UserProfile,
    ) -> Result<Vec<DeductionCandidate>, RecommendError> {
        self.recommend_with(profile, self.scorer.current())
    }

    /// Recommend deductions and wrap them in a report for the current year.
    pub fn analyze(&self, profile: &UserProfile) -> Result<RecommendationReport, RecommendError> {
        let scorer = self.scorer.current();
        let kind = scorer.kind();
        let recommendations = self.recommend_with(profile, scorer)?;
        let tax_year = chrono::Local::now().year();
        Ok(RecommendationReport::new(recommendations, kind, tax_year))
    }

    fn recommend_with(
        &self,
        profile: &UserProfile,
        scorer: Scorer,
    ) -> Result<Vec<DeductionCandidate>, RecommendError> {
        let features = FeatureVector::from_profile(profile)?;

        let model = match scorer {
            Scorer::Trained(model) => model,
            Scorer::Default => {
                debug!("Using default deduction recommendations");
                return Ok(default_recommendations());
            }
        };

        let probabilities = score(model.as_ref(), &features)?;

        let recommendations: Vec<DeductionCandidate> = DeductionCategory::ALL
            .iter()
            .zip(probabilities)
            .filter(|(_, p)| *p > self.threshold)
            .map(|(category, p)| {
                DeductionCandidate::new(*category, p, estimate_amount(*category, profile.income_level))
            })
            .collect();

        info!(
            "Recommended {} of {} deduction categories",
            recommendations.len(),
            DeductionCategory::ALL.len()
        );
        Ok(recommendations)
    }
}

/// Score a feature vector after checking the model agrees with the schema.
fn score(model: &dyn Classifier, features: &FeatureVector) -> Result<Vec<f64>, RecommendError> {
    let expected = schema_names();
    if model.feature_names() != expected.as_slice() || features.len() != expected.len() {
        return Err(RecommendError::FeatureSchemaMismatch {
            expected: model.feature_names().to_vec(),
            actual: expected,
        });
    }

    let classes = DeductionCategory::names();
    if model.class_names() != classes.as_slice() {
        return Err(RecommendError::ClassSchemaMismatch {
            expected: classes,
            actual: model.class_names().to_vec(),
        });
    }

    let probabilities = model.predict_proba(features.values())?;
    if probabilities.len() != classes.len() {
        return Err(RecommendError::ProbabilityShape {
            expected: classes.len(),
            actual: probabilities.len(),
        });
    }

    Ok(probabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deduction::features::FEATURE_SCHEMA;
    use crate::models::profile::FilingStatus;
    use pretty_assertions::assert_eq;
    use taxbot_inference::MemoryModelStore;

    struct StubClassifier {
        probabilities: Vec<f64>,
        features: Vec<String>,
        classes: Vec<String>,
    }

    impl StubClassifier {
        fn new(probabilities: Vec<f64>) -> Self {
            Self {
                probabilities,
                features: schema_names(),
                classes: DeductionCategory::names(),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn predict_proba(&self, features: &[f64]) -> taxbot_inference::Result<Vec<f64>> {
            assert_eq!(features.len(), FEATURE_SCHEMA.len());
            Ok(self.probabilities.clone())
        }

        fn feature_names(&self) -> &[String] {
            &self.features
        }

        fn class_names(&self) -> &[String] {
            &self.classes
        }
    }

    fn recommender(stub: StubClassifier) -> DeductionRecommender {
        DeductionRecommender::new(ScorerCell::with_model(Arc::new(stub)))
    }

    #[test]
    fn test_threshold_and_amounts() {
        let rec = recommender(StubClassifier::new(vec![0.9, 0.6, 0.3, 0.2, 0.4, 0.7]));
        let profile = UserProfile::new(Decimal::from(100_000))
            .with_filing_status(FilingStatus::Married)
            .with_home_owner(true)
            .with_medical_expenses(true)
            .with_charitable_contributions(true);
        let result = rec.recommend(&profile).unwrap();

        assert_eq!(
            result,
            vec![
                DeductionCandidate::new(DeductionCategory::CharitableContributions, 0.9, Decimal::from(3_000)),
                DeductionCandidate::new(DeductionCategory::MedicalExpenses, 0.6, Decimal::from(5_000)),
                DeductionCandidate::new(DeductionCategory::StateTaxes, 0.7, Decimal::from(5_000)),
            ]
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let rec = recommender(StubClassifier::new(vec![0.5, 0.5, 0.51, 0.0, 0.0, 0.0]));
        let result = rec.recommend(&UserProfile::new(Decimal::from(10_000))).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].category, DeductionCategory::HomeOffice);
        assert_eq!(result[0].estimated_amount, Decimal::from(1_500));
    }

    #[test]
    fn test_output_in_canonical_order() {
        let rec = recommender(StubClassifier::new(vec![0.99; 6]));
        let categories: Vec<DeductionCategory> = rec
            .recommend(&UserProfile::new(Decimal::from(50_000)))
            .unwrap()
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(categories, DeductionCategory::ALL.to_vec());
    }

    #[test]
    fn test_default_scorer_is_exact() {
        let rec = DeductionRecommender::new(ScorerCell::default_only()).with_threshold(0.95);
        for income in [0, 42_000, 10_000_000] {
            let result = rec.recommend(&UserProfile::new(Decimal::from(income))).unwrap();
            assert_eq!(result, default_recommendations());
        }
    }

    #[test]
    fn test_missing_model_uses_default() {
        let rec = DeductionRecommender::new(ScorerCell::new(Arc::new(MemoryModelStore::new())));
        let report = rec.analyze(&UserProfile::new(Decimal::from(75_000))).unwrap();

        assert_eq!(report.scorer, crate::models::deduction::ScorerKind::Default);
        assert_eq!(report.total_estimated_savings, Decimal::from(7_000));
        assert!(report.tax_year >= 2024);
    }

    #[test]
    fn test_feature_schema_mismatch() {
        let mut stub = StubClassifier::new(vec![0.9; 6]);
        stub.features.swap(0, 1);
        let err = recommender(stub)
            .recommend(&UserProfile::default())
            .unwrap_err();
        assert!(matches!(err, RecommendError::FeatureSchemaMismatch { .. }));
    }

    #[test]
    fn test_feature_count_mismatch() {
        let mut stub = StubClassifier::new(vec![0.9; 6]);
        stub.features.pop();
        assert!(matches!(
            recommender(stub).recommend(&UserProfile::default()),
            Err(RecommendError::FeatureSchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_class_schema_mismatch() {
        let mut stub = StubClassifier::new(vec![0.9; 6]);
        stub.classes.reverse();
        assert!(matches!(
            recommender(stub).recommend(&UserProfile::default()),
            Err(RecommendError::ClassSchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_probability_shape_mismatch() {
        let stub = StubClassifier::new(vec![0.9; 4]);
        assert!(matches!(
            recommender(stub).recommend(&UserProfile::default()),
            Err(RecommendError::ProbabilityShape { expected: 6, actual: 4 })
        ));
    }

    #[test]
    fn test_invalid_profile_rejected_with_any_scorer() {
        let profile = UserProfile::new(Decimal::from(-1));
        let rec = DeductionRecommender::new(ScorerCell::default_only());
        assert!(matches!(
            rec.recommend(&profile),
            Err(RecommendError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_unknown_filing_status_still_scored() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"income_level": 100000, "filing_status": "divorced"}"#).unwrap();
        let rec = recommender(StubClassifier::new(vec![0.9, 0.0, 0.0, 0.0, 0.0, 0.0]));

        let result = rec.recommend(&profile).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].estimated_amount, Decimal::from(3_000));
    }

    #[test]
    fn test_from_config_threshold() {
        let mut config = TaxbotConfig::default();
        config.recommendation.confidence_threshold = 0.8;
        config.model.model_dir = std::env::temp_dir().join("taxbot-no-such-dir");

        let rec = DeductionRecommender::from_config(&config);
        assert_eq!(rec.threshold(), 0.8);
        assert_eq!(
            rec.recommend(&UserProfile::default()).unwrap(),
            default_recommendations()
        );
    }
}
