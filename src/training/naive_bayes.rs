//! Naive Bayes classifiers
//!
//! Implements Gaussian Naive Bayes for continuous features.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::models::{check_prediction_width, check_training_input, class_count, Model};
use crate::error::{EvalError, Result};

/// Gaussian Naive Bayes Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNaiveBayes {
    /// Mean of each feature for each class
    means: Vec<Vec<f64>>,
    /// Variance of each feature for each class
    variances: Vec<Vec<f64>>,
    /// Log prior of each class; `None` for classes absent from training
    log_priors: Vec<Option<f64>>,
    /// Portion of the largest feature variance added to every variance
    var_smoothing: f64,
    n_features: usize,
    is_fitted: bool,
}

impl Default for GaussianNaiveBayes {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self {
            means: Vec::new(),
            variances: Vec::new(),
            log_priors: Vec::new(),
            var_smoothing: 1e-9,
            n_features: 0,
            is_fitted: false,
        }
    }

    /// Set variance smoothing parameter
    pub fn with_var_smoothing(mut self, smoothing: f64) -> Self {
        self.var_smoothing = smoothing;
        self
    }

    /// Joint log likelihood of each class for one sample
    fn joint_log_likelihood(&self, sample: ArrayView1<f64>) -> Vec<f64> {
        self.log_priors
            .iter()
            .enumerate()
            .map(|(class, prior)| match prior {
                Some(log_prior) => {
                    log_prior
                        + sample
                            .iter()
                            .zip(&self.means[class])
                            .zip(&self.variances[class])
                            .map(|((&xi, &mean), &var)| {
                                // Log of Gaussian PDF
                                -0.5 * ((xi - mean).powi(2) / var + var.ln() + (2.0 * PI).ln())
                            })
                            .sum::<f64>()
                }
                None => f64::NEG_INFINITY,
            })
            .collect()
    }

    /// Predict normalized class probabilities (log-sum-exp)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(EvalError::NotFitted);
        }
        check_prediction_width(x, self.n_features)?;

        let n_classes = self.log_priors.len();
        let mut proba = Array2::zeros((x.nrows(), n_classes));
        for (row, mut out) in x.outer_iter().zip(proba.outer_iter_mut()) {
            let jll = self.joint_log_likelihood(row);
            let max_val = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let sum: f64 = jll.iter().map(|&v| (v - max_val).exp()).sum();
            for (o, &v) in out.iter_mut().zip(&jll) {
                *o = (v - max_val).exp() / sum;
            }
        }
        Ok(proba)
    }
}

impl Model for GaussianNaiveBayes {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_classes = class_count(y);

        // Smoothing scales with the largest feature variance
        let max_var = x
            .var_axis(Axis(0), 0.0)
            .iter()
            .copied()
            .fold(0.0, f64::max);
        let epsilon = self.var_smoothing * max_var;

        self.means = vec![vec![0.0; n_features]; n_classes];
        self.variances = vec![vec![0.0; n_features]; n_classes];
        self.log_priors = vec![None; n_classes];

        for class in 0..n_classes {
            let class_indices: Vec<usize> = y
                .iter()
                .enumerate()
                .filter(|(_, &label)| label == class)
                .map(|(i, _)| i)
                .collect();
            if class_indices.is_empty() {
                continue;
            }

            // Single-pass Welford's algorithm for mean and variance
            let mut means = vec![0.0; n_features];
            let mut m2 = vec![0.0; n_features];
            for (count, &idx) in class_indices.iter().enumerate() {
                for (j, &val) in x.row(idx).iter().enumerate() {
                    let delta = val - means[j];
                    means[j] += delta / (count + 1) as f64;
                    m2[j] += delta * (val - means[j]);
                }
            }

            let n_class = class_indices.len() as f64;
            self.variances[class] = m2.iter().map(|&v| v / n_class + epsilon).collect();
            self.means[class] = means;
            self.log_priors[class] = Some((n_class / n_samples as f64).ln());
        }

        // Constant features with zero epsilon would divide by zero
        for vars in &mut self.variances {
            for v in vars.iter_mut() {
                if *v <= 0.0 {
                    *v = f64::MIN_POSITIVE.sqrt();
                }
            }
        }

        self.n_features = n_features;
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
                let jll = self.joint_log_likelihood(row);
                let mut best = 0;
                for (class, &v) in jll.iter().enumerate() {
                    if v > jll[best] {
                        best = class;
                    }
                }
                best
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_data() -> (Array2<f64>, Array1<usize>) {
        let x = array![
            [1.0, 2.0], [1.2, 1.8], [0.8, 2.2], [1.1, 2.1],
            [5.0, 6.0], [5.2, 5.8], [4.8, 6.2], [5.1, 6.1],
        ];
        let y = array![0, 0, 0, 0, 1, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_gaussian_nb() {
        let (x, y) = create_data();
        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();

        assert_eq!(nb.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let (x, y) = create_data();
        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();

        let proba = nb.predict_proba(&x).unwrap();
        for row in proba.outer_iter() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_feature() {
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 5.0], [1.0, 6.0]];
        let y = array![0, 0, 1, 1];
        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();

        let predictions = nb.predict(&x).unwrap();
        assert!(predictions.iter().all(|&p| p < 2));
    }

    #[test]
    fn test_predict_before_fit() {
        let nb = GaussianNaiveBayes::new();
        assert!(matches!(nb.predict(&array![[1.0]]), Err(EvalError::NotFitted)));
    }
}
