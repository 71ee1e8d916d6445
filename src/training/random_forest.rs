//! Random Forest implementation

use super::decision_tree::{majority_class, Criterion, DecisionTree};
use super::models::{check_prediction_width, check_training_input, class_count, Model};
use crate::error::{EvalError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Strategy for max features
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// Square root of n_features
    #[default]
    Sqrt,
    /// Log2 of n_features
    Log2,
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

/// Random Forest classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Maximum features per split (sqrt by default)
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Random state
    pub random_state: u64,
    /// Number of features
    n_features: usize,
    /// Number of classes
    n_classes: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            criterion: Criterion::Gini,
            random_state: 42,
            n_features: 0,
            n_classes: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Enable or disable bootstrap sampling
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    fn compute_max_features(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().floor() as usize,
            MaxFeatures::Fixed(n) => n.min(n_features),
            MaxFeatures::All => n_features,
        }
        .max(1)
    }

    /// Get number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Model for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        if self.n_estimators == 0 {
            return Err(EvalError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let n_samples = x.nrows();
        self.n_features = x.ncols();
        self.n_classes = class_count(y);
        let max_features = self.compute_max_features(self.n_features);
        let n_classes = self.n_classes;

        // Build trees in parallel; each tree owns a seed derived from its index
        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<DecisionTree> {
                let seed = self.random_state.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Array1<usize> = sample_indices.iter().map(|&i| y[i]).collect();

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(max_features)
                    .with_criterion(self.criterion)
                    .with_random_state(rng.gen());
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }

                tree.fit_with_classes(&x_boot, &y_boot, n_classes)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        Ok(())
    }

    /// Majority vote across trees
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        if self.trees.is_empty() {
            return Err(EvalError::NotFitted);
        }
        check_prediction_width(x, self.n_features)?;

        let all_predictions: Vec<Array1<usize>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let predictions = (0..x.nrows())
            .map(|i| {
                let mut votes = vec![0usize; self.n_classes];
                for preds in &all_predictions {
                    votes[preds[i]] += 1;
                }
                majority_class(&votes)
            })
            .collect();

        Ok(predictions)
    }
}
