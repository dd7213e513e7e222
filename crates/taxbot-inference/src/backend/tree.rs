//! CART decision tree with Gini impurity.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;
use crate::tensor::FeatureMatrix;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: usize,
}

/// A fitted classification tree.
///
/// Nodes are stored in pre-order, so every child index is greater than its
/// parent's index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_classes: usize,
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTree {
    /// Grow a tree over the given sample indices (duplicates allowed).
    pub(crate) fn fit<R: Rng>(
        x: &FeatureMatrix,
        y: &[usize],
        samples: Vec<usize>,
        n_classes: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            n_classes,
        };
        tree.grow(x, y, samples, 0, params, rng);
        tree
    }

    fn grow<R: Rng>(
        &mut self,
        x: &FeatureMatrix,
        y: &[usize],
        samples: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> usize {
        let counts = class_counts(y, &samples, self.n_classes);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_deep = params.max_depth.is_some_and(|max| depth >= max);

        if pure || too_deep || samples.len() < params.min_samples_split {
            return self.push_leaf(&counts);
        }

        let Some(split) = best_split(x, y, &samples, &counts, params.max_features, rng) else {
            return self.push_leaf(&counts);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| x.value(i, split.feature) <= split.threshold);

        let index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });

        let left = self.grow(x, y, left, depth + 1, params, rng);
        let right = self.grow(x, y, right, depth + 1, params, rng);

        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn push_leaf(&mut self, counts: &[usize]) -> usize {
        let total: usize = counts.iter().sum();
        let distribution = counts
            .iter()
            .map(|&c| if total == 0 { 0.0 } else { c as f64 / total as f64 })
            .collect();
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    /// Class distribution of the leaf the sample falls into.
    pub fn leaf_distribution(&self, features: &[f64]) -> Result<&[f64]> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { distribution }) => return Ok(distribution.as_slice()),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).ok_or(InferenceError::ShapeMismatch {
                        expected: feature + 1,
                        actual: features.len(),
                    })?;
                    index = if *value <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(InferenceError::ModelLoad(format!(
                        "tree references missing node {}",
                        index
                    )));
                }
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check structural invariants of a deserialized tree.
    pub(crate) fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(InferenceError::ModelLoad("tree has no nodes".to_string()));
        }
        if self.n_classes != n_classes {
            return Err(InferenceError::ModelLoad(format!(
                "tree has {} classes, model has {}",
                self.n_classes, n_classes
            )));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let children_ok = [*left, *right]
                        .iter()
                        .all(|&c| c > index && c < self.nodes.len());
                    if !children_ok || *feature >= n_features || !threshold.is_finite() {
                        return Err(InferenceError::ModelLoad(format!(
                            "malformed split at node {}",
                            index
                        )));
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(InferenceError::ModelLoad(format!(
                            "leaf {} has {} probabilities, expected {}",
                            index,
                            distribution.len(),
                            n_classes
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

fn class_counts(y: &[usize], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in samples {
        counts[y[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Search a random subset of features for the lowest weighted Gini split.
///
/// Like the usual random-forest rule, more than `max_features` features are
/// inspected when none of the first ones admits a split.
fn best_split<R: Rng>(
    x: &FeatureMatrix,
    y: &[usize],
    samples: &[usize],
    counts: &[usize],
    max_features: usize,
    rng: &mut R,
) -> Option<Split> {
    let mut features: Vec<usize> = (0..x.n_features()).collect();
    features.shuffle(rng);

    let n = samples.len();
    let mut best: Option<Split> = None;

    for (visited, &feature) in features.iter().enumerate() {
        if visited >= max_features && best.is_some() {
            break;
        }

        let mut pairs: Vec<(f64, usize)> = samples
            .iter()
            .map(|&i| (x.value(i, feature), y[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = vec![0usize; counts.len()];
        let mut right = counts.to_vec();

        for k in 0..n - 1 {
            let (value, label) = pairs[k];
            left[label] += 1;
            right[label] -= 1;

            let next = pairs[k + 1].0;
            if next <= value {
                continue;
            }

            let n_left = k + 1;
            let n_right = n - n_left;
            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / n as f64;

            let better = match &best {
                Some(b) => impurity < b.impurity,
                None => true,
            };
            if better {
                let mid = value + (next - value) / 2.0;
                best = Some(Split {
                    feature,
                    threshold: if mid < next { mid } else { value },
                    impurity,
                });
            }
        }
    }

    best
}
