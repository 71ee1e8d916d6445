//! Decision tree classifier (CART)

use super::models::{check_prediction_width, check_training_input, class_count, Model};
use crate::error::{EvalError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with predicted class
    Leaf { class: usize, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Gini impurity
    #[default]
    Gini,
    /// Shannon entropy
    Entropy,
}

impl Criterion {
    fn impurity(self, counts: &[usize], total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        match self {
            Criterion::Gini => 1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>(),
            Criterion::Entropy => -counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }
}

/// Best split found for one feature
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Decision tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Number of features considered at each split; all when `None`
    pub max_features: Option<usize>,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Seed for feature subsampling
    pub random_state: u64,
    /// Number of features
    n_features: usize,
    /// Number of classes
    n_classes: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create a new classifier tree
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            random_state: 0,
            n_features: 0,
            n_classes: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Consider only `n` randomly chosen features at each split
    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = Some(n.max(1));
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit the tree with classes inferred from `y`
    fn fit_tree(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
        check_training_input(x, y)?;

        self.n_features = x.ncols();
        self.n_classes = n_classes.max(class_count(y));

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut rng));
        Ok(())
    }

    /// Fit with a class count known from the full training set
    pub(crate) fn fit_with_classes(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<usize>,
        n_classes: usize,
    ) -> Result<()> {
        self.fit_tree(x, y, n_classes)
    }

    fn class_counts(&self, y: &Array1<usize>, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in indices {
            counts[y[i]] += 1;
        }
        counts
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<usize>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = self.class_counts(y, indices);
        let leaf = || TreeNode::Leaf {
            class: majority_class(&counts),
            n_samples,
        };

        // Check stopping conditions
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if n_samples < self.min_samples_split
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure
        {
            return leaf();
        }

        let parent_impurity = self.criterion.impurity(&counts, n_samples);
        let features = self.candidate_features(rng);

        let best = match self.find_best_split(x, y, indices, &features, parent_impurity) {
            Some(best) => best,
            None => return leaf(),
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best.feature_idx]] <= best.threshold);

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, rng));
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, rng));

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity: parent_impurity,
        }
    }

    fn candidate_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        match self.max_features {
            Some(k) if k < self.n_features => {
                features.shuffle(rng);
                features.truncate(k);
                features.sort_unstable();
                features
            }
            _ => features,
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<usize>,
        indices: &[usize],
        features: &[usize],
        parent_impurity: f64,
    ) -> Option<SplitCandidate> {
        // Parallelize feature scanning; each feature independently finds its best split
        let candidates: Vec<SplitCandidate> = features
            .par_iter()
            .filter_map(|&feature_idx| {
                self.best_split_for_feature(x.column(feature_idx), y, indices, parent_impurity)
                    .map(|(threshold, gain)| SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    })
            })
            .collect();

        // Ties keep the lowest feature index
        candidates.into_iter().fold(None, |best: Option<SplitCandidate>, c| match best {
            Some(b) if b.gain >= c.gain => Some(b),
            _ => Some(c),
        })
    }

    /// Sweep sorted values once, updating class counts incrementally
    fn best_split_for_feature(
        &self,
        column: ArrayView1<f64>,
        y: &Array1<usize>,
        indices: &[usize],
        parent_impurity: f64,
    ) -> Option<(f64, f64)> {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));

        let n = order.len();
        let mut left_counts = vec![0usize; self.n_classes];
        let mut right_counts = self.class_counts(y, indices);
        let mut best: Option<(f64, f64)> = None;

        for pos in 0..n.saturating_sub(1) {
            let i = order[pos];
            left_counts[y[i]] += 1;
            right_counts[y[i]] -= 1;

            let current = column[i];
            let next = column[order[pos + 1]];
            if current == next {
                continue;
            }

            let n_left = pos + 1;
            let n_right = n - n_left;
            if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                continue;
            }

            let weighted = (n_left as f64 * self.criterion.impurity(&left_counts, n_left)
                + n_right as f64 * self.criterion.impurity(&right_counts, n_right))
                / n as f64;
            let gain = parent_impurity - weighted;

            if gain > 1e-12 && best.map_or(true, |(_, g)| gain > g) {
                best = Some(((current + next) / 2.0, gain));
            }
        }

        best
    }

    fn predict_sample(node: &TreeNode, sample: ArrayView1<f64>) -> usize {
        match node {
            TreeNode::Leaf { class, .. } => *class,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                ..
            } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        fn leaves(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        self.root.as_ref().map_or(0, leaves)
    }
}

impl Model for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        self.fit_tree(x, y, 0)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let root = self.root.as_ref().ok_or(EvalError::NotFitted)?;
        check_prediction_width(x, self.n_features)?;

        Ok(x.outer_iter()
            .map(|row| Self::predict_sample(root, row))
            .collect())
    }
}

/// Most frequent class; ties go to the lowest code
pub(crate) fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}
