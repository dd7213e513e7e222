//! Training the deduction model from labelled profiles.

use std::path::Path;
use std::sync::Arc;

use ndarray::Array2;
use serde::Deserialize;
use taxbot_inference::{FeatureMatrix, ForestParams, ModelStore, RandomForest};
use tracing::info;

use super::features::{schema_names, FeatureVector, FEATURE_SCHEMA};
use super::scorer::ScorerCell;
use crate::error::{RecommendError, TaxbotError};
use crate::models::deduction::DeductionCategory;
use crate::models::profile::UserProfile;

/// Labelled training profiles.
///
/// JSON shape: `{"features": [profile, ...], "labels": [category, ...]}`,
/// where the two lists pair up by position.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingSet {
    pub features: Vec<UserProfile>,
    pub labels: Vec<DeductionCategory>,
}

impl TrainingSet {
    /// Build a training set, checking that profiles and labels pair up.
    pub fn new(
        features: Vec<UserProfile>,
        labels: Vec<DeductionCategory>,
    ) -> Result<Self, RecommendError> {
        let set = Self { features, labels };
        set.validate()?;
        Ok(set)
    }

    /// Parse a training set from JSON.
    pub fn from_json(json: &str) -> Result<Self, TaxbotError> {
        let set: TrainingSet = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    /// Load a training set from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, TaxbotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Encode every profile into one feature matrix.
    pub fn to_matrix(&self) -> Result<FeatureMatrix, RecommendError> {
        let mut flat = Vec::with_capacity(self.features.len() * FEATURE_SCHEMA.len());
        for profile in &self.features {
            flat.extend_from_slice(FeatureVector::from_profile(profile)?.values());
        }
        let data = Array2::from_shape_vec((self.features.len(), FEATURE_SCHEMA.len()), flat)
            .map_err(|e| RecommendError::InvalidTrainingSet(e.to_string()))?;
        Ok(FeatureMatrix::from_array(data)?)
    }

    /// Class indices in canonical category order.
    pub fn label_indices(&self) -> Vec<usize> {
        self.labels.iter().map(|c| c.index()).collect()
    }

    fn validate(&self) -> Result<(), RecommendError> {
        if self.features.is_empty() {
            return Err(RecommendError::InvalidTrainingSet(
                "training set is empty".to_string(),
            ));
        }
        if self.features.len() != self.labels.len() {
            return Err(RecommendError::InvalidTrainingSet(format!(
                "{} profiles but {} labels",
                self.features.len(),
                self.labels.len()
            )));
        }
        Ok(())
    }
}

/// Fits deduction models.
#[derive(Debug, Clone, Default)]
pub struct DeductionTrainer {
    params: ForestParams,
}

impl DeductionTrainer {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Fit a forest over the fixed feature schema and category order.
    pub fn train(&self, set: &TrainingSet) -> Result<RandomForest, RecommendError> {
        let x = set.to_matrix()?;
        let y = set.label_indices();

        info!(
            "Training deduction model on {} profiles ({} trees, seed {})",
            set.len(),
            self.params.n_estimators,
            self.params.seed
        );

        let forest = RandomForest::fit(
            self.params,
            &x,
            &y,
            schema_names(),
            DeductionCategory::names(),
        )?;
        Ok(forest)
    }

    /// Fit, persist through `store`, then install into `scorer`.
    pub fn train_and_persist(
        &self,
        set: &TrainingSet,
        store: &dyn ModelStore,
        scorer: Option<&ScorerCell>,
    ) -> Result<Arc<RandomForest>, RecommendError> {
        let forest = Arc::new(self.train(set)?);
        forest.persist(store)?;

        if let Some(cell) = scorer {
            cell.install(forest.clone());
        }
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deduction::DeductionRecommender;
    use rust_decimal::Decimal;
    use taxbot_inference::{Classifier, FileModelStore};

    const TRAINING_JSON: &str = r#"{
        "features": [
            {"income_level": 40000, "has_charitable_contributions": true},
            {"income_level": 90000, "has_charitable_contributions": true, "home_owner": true},
            {"income_level": 120000, "has_charitable_contributions": true, "filing_status": "married"}
        ],
        "labels": ["charitable_contributions", "charitable_contributions", "charitable_contributions"]
    }"#;

    fn small_trainer() -> DeductionTrainer {
        DeductionTrainer::new(ForestParams::default().with_estimators(10))
    }

    #[test]
    fn test_parse_training_set() {
        let set = TrainingSet::from_json(TRAINING_JSON).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.label_indices(), vec![0, 0, 0]);
        assert_eq!(set.to_matrix().unwrap().n_features(), 7);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let json = r#"{"features": [{}, {}], "labels": ["home_office"]}"#;
        assert!(matches!(
            TrainingSet::from_json(json),
            Err(TaxbotError::Recommendation(RecommendError::InvalidTrainingSet(_)))
        ));
    }

    #[test]
    fn test_unknown_label_rejected() {
        let json = r#"{"features": [{}], "labels": ["yacht"]}"#;
        assert!(matches!(TrainingSet::from_json(json), Err(TaxbotError::Json(_))));
    }

    #[test]
    fn test_trained_model_keeps_all_classes() {
        let set = TrainingSet::from_json(TRAINING_JSON).unwrap();
        let forest = small_trainer().train(&set).unwrap();

        let profile = UserProfile::new(Decimal::from(60_000)).with_charitable_contributions(true);
        let features = FeatureVector::from_profile(&profile).unwrap();
        let proba = forest.predict_proba(features.values()).unwrap();

        assert_eq!(proba.len(), 6);
        assert_eq!(proba[0], 1.0);
        assert!(proba[1..].iter().all(|p| *p == 0.0));
    }

    #[test]
    fn test_train_persist_and_recommend() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileModelStore::new(dir.path().join("deduction_model.json")));
        let set = TrainingSet::from_json(TRAINING_JSON).unwrap();

        let recommender = DeductionRecommender::new(ScorerCell::new(store.clone()));
        assert_eq!(
            recommender.scorer().current().kind(),
            crate::models::deduction::ScorerKind::Default
        );

        small_trainer()
            .train_and_persist(&set, store.as_ref(), Some(recommender.scorer()))
            .unwrap();
        assert!(store.exists());

        let result = recommender
            .recommend(&UserProfile::new(Decimal::from(100_000)))
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].category, DeductionCategory::CharitableContributions);
        assert_eq!(result[0].estimated_amount, Decimal::from(3_000));

        // A fresh recommender picks the persisted model up from disk.
        let reloaded = DeductionRecommender::new(ScorerCell::new(store));
        assert_eq!(reloaded.recommend(&UserProfile::default()).unwrap().len(), 1);
    }
}
