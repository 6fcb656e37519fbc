//! Stress classification
//!
//! A small bagged decision-tree ensemble trained once at startup on a fixed
//! labeled dataset. The forest maps the four raw activity signals to the
//! probability that the user is stressed. Any implementation of
//! [`StressClassifier`] can be plugged into the session controller instead.

use crate::error::EngineError;
use crate::types::{FeatureVector, FEATURE_COUNT};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Candidate features examined per split (sqrt of the feature count)
const MAX_FEATURES: usize = 2;

/// Minimum impurity decrease for a split to be accepted
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

/// Probabilistic binary classifier over activity features
pub trait StressClassifier: Send + Sync {
    /// Probability in `[0, 1]` that the features describe a stressed user
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, EngineError>;
}

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub estimators: usize,
    /// Seed for bootstrap sampling and feature selection
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            estimators: 120,
            seed: 42,
        }
    }
}

/// Labeled feature vectors used to fit the forest
#[derive(Debug, Clone)]
pub struct TrainingSet {
    samples: Vec<FeatureVector>,
    /// `true` marks a stressed example
    labels: Vec<bool>,
}

impl TrainingSet {
    pub fn new(samples: Vec<FeatureVector>, labels: Vec<bool>) -> Result<Self, EngineError> {
        if samples.is_empty() {
            return Err(EngineError::Classifier("training set is empty".to_string()));
        }
        if samples.len() != labels.len() {
            return Err(EngineError::Classifier(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        Ok(Self { samples, labels })
    }

    /// The built-in dataset: two normal and two stressed activity profiles
    pub fn reference() -> Self {
        Self {
            samples: vec![
                [70.0, 4.0, 2.0, 85.0],
                [60.0, 6.0, 4.0, 75.0],
                [45.0, 12.0, 7.0, 40.0],
                [35.0, 18.0, 10.0, 25.0],
            ],
            labels: vec![false, false, true, true],
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn stressed_fraction(&self, idx: &[usize]) -> f64 {
        let stressed = idx.iter().filter(|&&i| self.labels[i]).count();
        stressed as f64 / idx.len() as f64
    }

    fn gini(&self, idx: &[usize]) -> f64 {
        let p = self.stressed_fraction(idx);
        2.0 * p * (1.0 - p)
    }
}

#[derive(Debug, Clone)]
enum TreeNode {
    Leaf {
        stressed: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, features: &FeatureVector) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { stressed } => return *stressed,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Trained tree ensemble, immutable after construction
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<TreeNode>,
}

impl RandomForest {
    /// Fit a forest on `data`, deterministic for a given seed
    pub fn train(data: &TrainingSet, params: ForestParams) -> Result<Self, EngineError> {
        if params.estimators == 0 {
            return Err(EngineError::Classifier(
                "forest needs at least one estimator".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let n = data.len();

        let trees = (0..params.estimators)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                grow(data, &bootstrap, &mut rng)
            })
            .collect();

        Ok(Self { trees })
    }

    /// Forest trained on the built-in dataset with default parameters
    pub fn reference() -> Result<Self, EngineError> {
        Self::train(&TrainingSet::reference(), ForestParams::default())
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}

impl StressClassifier for RandomForest {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, EngineError> {
        if let Some(bad) = features.iter().find(|v| !v.is_finite()) {
            return Err(EngineError::InvalidFeatures(format!(
                "non-finite feature value {bad}"
            )));
        }

        let total: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        Ok((total / self.trees.len() as f64).clamp(0.0, 1.0))
    }
}

/// Grow a CART tree on the bootstrap sample `idx`
fn grow<R: Rng + ?Sized>(data: &TrainingSet, idx: &[usize], rng: &mut R) -> TreeNode {
    let stressed = data.stressed_fraction(idx);
    if stressed == 0.0 || stressed == 1.0 {
        return TreeNode::Leaf { stressed };
    }

    let mut order: [usize; FEATURE_COUNT] = [0, 1, 2, 3];
    order.shuffle(rng);

    // Remaining features are only tried when no candidate yields a split
    let split = best_split(data, idx, &order[..MAX_FEATURES])
        .or_else(|| best_split(data, idx, &order[MAX_FEATURES..]));

    match split {
        None => TreeNode::Leaf { stressed },
        Some((feature, threshold)) => {
            let (left, right): (Vec<usize>, Vec<usize>) = idx
                .iter()
                .copied()
                .partition(|&i| data.samples[i][feature] <= threshold);

            TreeNode::Split {
                feature,
                threshold,
                left: Box::new(grow(data, &left, rng)),
                right: Box::new(grow(data, &right, rng)),
            }
        }
    }
}

/// Best gini split among `features`, thresholds at midpoints of distinct values
fn best_split(data: &TrainingSet, idx: &[usize], features: &[usize]) -> Option<(usize, f64)> {
    let parent = data.gini(idx);
    let n = idx.len() as f64;
    let mut best: Option<(usize, f64, f64)> = None;

    for &feature in features {
        let mut values: Vec<f64> = idx.iter().map(|&i| data.samples[i][feature]).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) = idx
                .iter()
                .copied()
                .partition(|&i| data.samples[i][feature] <= threshold);

            let impurity = (left.len() as f64 * data.gini(&left)
                + right.len() as f64 * data.gini(&right))
                / n;

            if parent - impurity > MIN_IMPURITY_DECREASE
                && best.map_or(true, |(_, _, b)| impurity < b)
            {
                best = Some((feature, threshold, impurity));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}
