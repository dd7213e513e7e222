//! Bagged random forest classifier.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::tree::{DecisionTree, TreeParams};
use crate::backend::Classifier;
use crate::error::InferenceError;
use crate::store::ModelStore;
use crate::tensor::FeatureMatrix;
use crate::Result;

/// Version of the persisted model envelope.
const FORMAT_VERSION: u32 = 1;

/// Hyper-parameters for fitting a forest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees.
    pub n_estimators: usize,

    /// Maximum tree depth (unlimited when `None`).
    pub max_depth: Option<usize>,

    /// Minimum samples a node needs before it may be split.
    pub min_samples_split: usize,

    /// Seed for bootstrap sampling and feature bagging.
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

impl ForestParams {
    /// Set the number of trees.
    pub fn with_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Set the maximum depth.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Random forest over a named feature and class schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    feature_names: Vec<String>,
    class_names: Vec<String>,
    trees: Vec<DecisionTree>,
}

#[derive(Serialize, Deserialize)]
struct ModelEnvelope<M> {
    format_version: u32,
    model: M,
}

impl RandomForest {
    /// Fit a forest.
    ///
    /// `y` holds class indices into `class_names`. Every class keeps a
    /// probability column even when no training sample carries it.
    pub fn fit(
        params: ForestParams,
        x: &FeatureMatrix,
        y: &[usize],
        feature_names: Vec<String>,
        class_names: Vec<String>,
    ) -> Result<Self> {
        if x.n_samples() == 0 {
            return Err(InferenceError::InvalidInput("no samples".to_string()));
        }
        if x.n_samples() != y.len() {
            return Err(InferenceError::InvalidInput(format!(
                "{} samples but {} labels",
                x.n_samples(),
                y.len()
            )));
        }
        if feature_names.len() != x.n_features() {
            return Err(InferenceError::ShapeMismatch {
                expected: feature_names.len(),
                actual: x.n_features(),
            });
        }
        if class_names.is_empty() {
            return Err(InferenceError::InvalidInput("no classes".to_string()));
        }
        if let Some(&label) = y.iter().find(|&&l| l >= class_names.len()) {
            return Err(InferenceError::InvalidInput(format!(
                "label {} outside {} classes",
                label,
                class_names.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(InferenceError::InvalidInput(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        let n = x.n_samples();
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
            max_features: ((x.n_features() as f64).sqrt() as usize).max(1),
        };

        let mut rng = StdRng::seed_from_u64(params.seed);
        let trees: Vec<DecisionTree> = (0..params.n_estimators)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, bootstrap, class_names.len(), &tree_params, &mut rng)
            })
            .collect();

        info!(
            "Fitted random forest: {} trees, {} samples, {} features, {} classes",
            trees.len(),
            n,
            feature_names.len(),
            class_names.len()
        );

        Ok(Self {
            params,
            feature_names,
            class_names,
            trees,
        })
    }

    /// Parameters the forest was fitted with.
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Load a model from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading model from: {}", path.display());

        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Load a model from a persisted envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        debug!("Loading model from {} bytes", bytes.len());

        let envelope: ModelEnvelope<RandomForest> = serde_json::from_slice(bytes)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(InferenceError::ModelLoad(format!(
                "unsupported model format version {}",
                envelope.format_version
            )));
        }

        let model = envelope.model;
        model.validate()?;
        Ok(model)
    }

    /// Serialize into a persisted envelope.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            model: self,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Load through a model store.
    pub fn load(store: &dyn ModelStore) -> Result<Self> {
        let bytes = store.load()?;
        Self::from_bytes(&bytes)
    }

    /// Persist through a model store.
    pub fn persist(&self, store: &dyn ModelStore) -> Result<()> {
        store.save(&self.to_bytes()?)?;
        info!("Persisted model to {}", store.location());
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(InferenceError::NotFitted);
        }
        if self.feature_names.is_empty() || self.class_names.is_empty() {
            return Err(InferenceError::ModelLoad("empty model schema".to_string()));
        }
        for tree in &self.trees {
            tree.validate(self.feature_names.len(), self.class_names.len())?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(InferenceError::NotFitted);
        }
        if features.len() != self.feature_names.len() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.feature_names.len(),
                actual: features.len(),
            });
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::InvalidInput(
                "features contain non-finite values".to_string(),
            ));
        }

        let mut probabilities = vec![0.0; self.class_names.len()];
        for tree in &self.trees {
            for (p, leaf) in probabilities.iter_mut().zip(tree.leaf_distribution(features)?) {
                *p += leaf;
            }
        }

        let n_trees = self.trees.len() as f64;
        probabilities.iter_mut().for_each(|p| *p /= n_trees);

        Ok(probabilities)
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn class_names(&self) -> &[String] {
        &self.class_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryModelStore;
    use pretty_assertions::assert_eq;

    fn names(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn toy_forest() -> RandomForest {
        let x = FeatureMatrix::from_rows(&[
            vec![10_000.0, 0.0],
            vec![12_000.0, 0.0],
            vec![15_000.0, 0.0],
            vec![90_000.0, 1.0],
            vec![95_000.0, 1.0],
            vec![120_000.0, 1.0],
        ])
        .unwrap();
        let y = vec![0, 0, 0, 1, 1, 1];

        RandomForest::fit(
            ForestParams::default().with_estimators(25),
            &x,
            &y,
            names("f", 2),
            names("c", 3),
        )
        .unwrap()
    }

    #[test]
    fn test_fit_and_predict() {
        let forest = toy_forest();
        assert_eq!(forest.n_trees(), 25);

        let low = forest.predict_proba(&[11_000.0, 0.0]).unwrap();
        let high = forest.predict_proba(&[100_000.0, 1.0]).unwrap();

        assert_eq!(low.len(), 3);
        assert!(low[0] > 0.5);
        assert!(high[1] > 0.5);
        assert_eq!(low[2], 0.0);
        assert!((low.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = toy_forest().predict_proba(&[50_000.0, 0.0]).unwrap();
        let b = toy_forest().predict_proba(&[50_000.0, 0.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let forest = toy_forest();
        let err = forest.predict_proba(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::ShapeMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_fit_rejects_out_of_range_label() {
        let x = FeatureMatrix::from_rows(&[vec![1.0]]).unwrap();
        let result = RandomForest::fit(ForestParams::default(), &x, &[5], names("f", 1), names("c", 2));
        assert!(matches!(result, Err(InferenceError::InvalidInput(_))));
    }

    #[test]
    fn test_fit_rejects_label_count_mismatch() {
        let x = FeatureMatrix::from_rows(&[vec![1.0], vec![2.0]]).unwrap();
        let result = RandomForest::fit(ForestParams::default(), &x, &[0], names("f", 1), names("c", 2));
        assert!(result.is_err());
    }

    #[test]
    fn test_persist_and_load() {
        let forest = toy_forest();
        let store = MemoryModelStore::new();
        forest.persist(&store).unwrap();

        let loaded = RandomForest::load(&store).unwrap();
        assert_eq!(loaded.feature_names(), forest.feature_names());
        assert_eq!(loaded.class_names(), forest.class_names());
        assert_eq!(
            loaded.predict_proba(&[95_000.0, 1.0]).unwrap(),
            forest.predict_proba(&[95_000.0, 1.0]).unwrap()
        );
    }

    #[test]
    fn test_corrupt_bytes_fail_cleanly() {
        assert!(matches!(
            RandomForest::from_bytes(b"not a model"),
            Err(InferenceError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_unknown_format_version() {
        let forest = toy_forest();
        let mut value: serde_json::Value = serde_json::from_slice(&forest.to_bytes().unwrap()).unwrap();
        value["format_version"] = serde_json::json!(99);
        let bytes = serde_json::to_vec(&value).unwrap();

        let err = RandomForest::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("version 99"));
    }
}
