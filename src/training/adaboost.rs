//! AdaBoost (Adaptive Boosting) implementation
//!
//! AdaBoost builds an ensemble of weak learners (decision stumps), weighting
//! misclassified samples more heavily in subsequent rounds.

use super::models::{check_prediction_width, check_training_input, class_count, Model};
use crate::error::{EvalError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// A single decision stump: splits on one feature at one threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Stump {
    feature_index: usize,
    threshold: f64,
    /// Prediction when feature <= threshold
    left_label: usize,
    /// Prediction when feature > threshold
    right_label: usize,
}

impl Stump {
    fn predict_sample(&self, sample: ArrayView1<f64>) -> usize {
        if sample[self.feature_index] <= self.threshold {
            self.left_label
        } else {
            self.right_label
        }
    }
}

/// AdaBoost Classifier (SAMME variant, supports multi-class)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostClassifier {
    pub n_estimators: usize,
    pub learning_rate: f64,
    stumps: Vec<Stump>,
    alphas: Vec<f64>,
    n_classes: usize,
    n_features: usize,
    is_fitted: bool,
}

impl Default for AdaBoostClassifier {
    fn default() -> Self {
        Self::new(50, 1.0)
    }
}

impl AdaBoostClassifier {
    pub fn new(n_estimators: usize, learning_rate: f64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            stumps: Vec::new(),
            alphas: Vec::new(),
            n_classes: 0,
            n_features: 0,
            is_fitted: false,
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Number of boosting rounds actually kept
    pub fn n_rounds(&self) -> usize {
        self.stumps.len()
    }

    /// Find the stump with the lowest weighted error.
    ///
    /// Each feature is swept once in sorted order; the best labels on either
    /// side are the classes with the largest weight there.
    fn fit_stump(x: &Array2<f64>, y: &Array1<usize>, weights: &[f64], n_classes: usize) -> Stump {
        let mut total = vec![0.0; n_classes];
        for (&label, &w) in y.iter().zip(weights) {
            total[label] += w;
        }
        let total_weight: f64 = total.iter().sum();

        let constant = argmax(&total);
        let mut best_stump = Stump {
            feature_index: 0,
            threshold: f64::INFINITY,
            left_label: constant,
            right_label: constant,
        };
        let mut best_error = total_weight - total[constant];

        for f in 0..x.ncols() {
            let col = x.column(f);
            let mut order: Vec<usize> = (0..x.nrows()).collect();
            order.sort_by(|&a, &b| col[a].total_cmp(&col[b]));

            let mut left = vec![0.0; n_classes];
            for pos in 0..order.len().saturating_sub(1) {
                let i = order[pos];
                left[y[i]] += weights[i];

                let current = col[i];
                let next = col[order[pos + 1]];
                if current == next {
                    continue;
                }

                let right: Vec<f64> = total.iter().zip(&left).map(|(t, l)| t - l).collect();
                let left_label = argmax(&left);
                let right_label = argmax(&right);
                let error = total_weight - left[left_label] - right[right_label];

                if error < best_error - 1e-12 {
                    best_error = error;
                    best_stump = Stump {
                        feature_index: f,
                        threshold: (current + next) / 2.0,
                        left_label,
                        right_label,
                    };
                }
            }
        }
        best_stump
    }
}

impl Model for AdaBoostClassifier {
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
        self.n_classes = class_count(y);
        self.n_features = x.ncols();
        let k = self.n_classes as f64;
        let mut weights = vec![1.0 / n_samples as f64; n_samples];

        self.stumps.clear();
        self.alphas.clear();

        for _round in 0..self.n_estimators {
            let stump = Self::fit_stump(x, y, &weights, self.n_classes);

            let missed: Vec<bool> = x
                .outer_iter()
                .zip(y.iter())
                .map(|(row, &label)| stump.predict_sample(row) != label)
                .collect();
            let error: f64 = missed
                .iter()
                .zip(&weights)
                .filter(|(&m, _)| m)
                .map(|(_, &w)| w)
                .sum();

            // A perfect stump decides alone
            if error <= 1e-12 {
                self.stumps.push(stump);
                self.alphas.push(1.0);
                break;
            }

            // No better than chance: stop boosting
            if error >= 1.0 - 1.0 / k {
                if self.stumps.is_empty() {
                    self.stumps.push(stump);
                    self.alphas.push(1.0);
                }
                break;
            }

            // SAMME alpha for multi-class
            let alpha = self.learning_rate * (((1.0 - error) / error).ln() + (k - 1.0).ln());

            for (w, &m) in weights.iter_mut().zip(&missed) {
                if m {
                    *w *= alpha.exp();
                }
            }
            let w_sum: f64 = weights.iter().sum();
            if w_sum > 0.0 {
                weights.iter_mut().for_each(|w| *w /= w_sum);
            }

            self.stumps.push(stump);
            self.alphas.push(alpha);
        }

        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        if !self.is_fitted {
            return Err(EvalError::NotFitted);
        }
        check_prediction_width(x, self.n_features)?;

        Ok(x.outer_iter()
            .map(|row| {
                // Weighted vote across all stumps
                let mut scores = vec![0.0; self.n_classes];
                for (stump, &alpha) in self.stumps.iter().zip(&self.alphas) {
                    scores[stump.predict_sample(row)] += alpha;
                }
                argmax(&scores)
            })
            .collect())
    }
}

/// Index of the largest value; ties go to the lowest index
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
