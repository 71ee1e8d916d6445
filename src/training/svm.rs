//! Support Vector Machine classifier
//!
//! Kernel SVM trained with simplified SMO (Sequential Minimal Optimization).
//! Two classes use one machine; more classes use one-vs-rest.

use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::models::{check_prediction_width, check_training_input, Model};
use crate::error::{EvalError, Result};

/// Maximum number of training rows for the precomputed kernel matrix.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Kernel function type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KernelType {
    /// K(x, y) = x · y
    Linear,
    /// K(x, y) = (γ x · y + r)^d
    Polynomial { degree: u32, gamma: f64, coef0: f64 },
    /// K(x, y) = exp(-γ ||x - y||²)
    Rbf { gamma: f64 },
    /// K(x, y) = tanh(γ x · y + r)
    Sigmoid { gamma: f64, coef0: f64 },
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::Rbf { gamma: 1.0 }
    }
}

impl KernelType {
    fn apply(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match *self {
            KernelType::Linear => a.dot(&b),
            KernelType::Polynomial { degree, gamma, coef0 } => {
                (gamma * a.dot(&b) + coef0).powi(degree as i32)
            }
            KernelType::Rbf { gamma } => {
                let norm_sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * norm_sq).exp()
            }
            KernelType::Sigmoid { gamma, coef0 } => (gamma * a.dot(&b) + coef0).tanh(),
        }
    }
}

/// SVM configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SVMConfig {
    /// Regularization parameter (C)
    pub c: f64,
    pub kernel: KernelType,
    /// Tolerance for the KKT check
    pub tol: f64,
    /// Maximum number of passes over the data
    pub max_iter: usize,
    pub random_state: u64,
}

impl Default for SVMConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: KernelType::default(),
            tol: 1e-3,
            max_iter: 1000,
            random_state: 42,
        }
    }
}

/// One binary machine separating `positive` from every other class
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinarySvm {
    positive: usize,
    support_vectors: Array2<f64>,
    /// alpha_i * y_i for each support vector
    coefficients: Array1<f64>,
    bias: f64,
}

impl BinarySvm {
    fn score(&self, kernel: &KernelType, sample: ArrayView1<f64>) -> f64 {
        self.support_vectors
            .outer_iter()
            .zip(self.coefficients.iter())
            .map(|(sv, &coef)| coef * kernel.apply(sample, sv))
            .sum::<f64>()
            + self.bias
    }
}

/// Support Vector Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMClassifier {
    config: SVMConfig,
    /// Sorted distinct training labels
    classes: Vec<usize>,
    machines: Vec<BinarySvm>,
    n_features: usize,
    is_fitted: bool,
}

impl Default for SVMClassifier {
    fn default() -> Self {
        Self::new(SVMConfig::default())
    }
}

impl SVMClassifier {
    pub fn new(config: SVMConfig) -> Self {
        Self {
            config,
            classes: Vec::new(),
            machines: Vec::new(),
            n_features: 0,
            is_fitted: false,
        }
    }

    pub fn config(&self) -> &SVMConfig {
        &self.config
    }

    /// Total support vectors across all machines
    pub fn n_support_vectors(&self) -> usize {
        self.machines.iter().map(|m| m.support_vectors.nrows()).sum()
    }

    fn compute_kernel_matrix(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let n = x.nrows();
        let kernel = self.config.kernel;
        let values: Vec<f64> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| (0..n).map(move |j| kernel.apply(x.row(i), x.row(j))))
            .collect();
        Ok(Array2::from_shape_vec((n, n), values)?)
    }

    /// SMO over a ±1 target; returns (alphas, bias)
    fn smo_train(&self, k: &Array2<f64>, y: &Array1<f64>, seed: u64) -> (Array1<f64>, f64) {
        let n = y.len();
        let c = self.config.c;
        let tol = self.config.tol;
        let mut alphas = Array1::<f64>::zeros(n);
        let mut bias = 0.0;
        if n < 2 {
            return (alphas, bias);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let decision = |alphas: &Array1<f64>, bias: f64, idx: usize| -> f64 {
            alphas
                .iter()
                .zip(y.iter())
                .zip(k.column(idx).iter())
                .map(|((&a, &yi), &kv)| a * yi * kv)
                .sum::<f64>()
                + bias
        };

        let max_passes = 5;
        let mut passes = 0;
        let mut total_iter = 0;

        while passes < max_passes && total_iter < self.config.max_iter {
            let mut num_changed = 0;

            for i in 0..n {
                let e_i = decision(&alphas, bias, i) - y[i];
                let violates = (y[i] * e_i < -tol && alphas[i] < c)
                    || (y[i] * e_i > tol && alphas[i] > 0.0);
                if !violates {
                    continue;
                }

                let j = loop {
                    let j = rng.gen_range(0..n);
                    if j != i {
                        break j;
                    }
                };
                let e_j = decision(&alphas, bias, j) - y[j];

                let alpha_i_old = alphas[i];
                let alpha_j_old = alphas[j];

                let (l, h) = if y[i] != y[j] {
                    ((alpha_j_old - alpha_i_old).max(0.0), (c + alpha_j_old - alpha_i_old).min(c))
                } else {
                    ((alpha_i_old + alpha_j_old - c).max(0.0), (alpha_i_old + alpha_j_old).min(c))
                };
                if (l - h).abs() < 1e-10 {
                    continue;
                }

                let eta = 2.0 * k[[i, j]] - k[[i, i]] - k[[j, j]];
                if eta >= 0.0 {
                    continue;
                }

                alphas[j] = (alpha_j_old - y[j] * (e_i - e_j) / eta).max(l).min(h);
                if (alphas[j] - alpha_j_old).abs() < 1e-5 {
                    continue;
                }
                alphas[i] = alpha_i_old + y[i] * y[j] * (alpha_j_old - alphas[j]);

                let b1 = bias
                    - e_i
                    - y[i] * (alphas[i] - alpha_i_old) * k[[i, i]]
                    - y[j] * (alphas[j] - alpha_j_old) * k[[i, j]];
                let b2 = bias
                    - e_j
                    - y[i] * (alphas[i] - alpha_i_old) * k[[i, j]]
                    - y[j] * (alphas[j] - alpha_j_old) * k[[j, j]];

                bias = if alphas[i] > 0.0 && alphas[i] < c {
                    b1
                } else if alphas[j] > 0.0 && alphas[j] < c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };

                num_changed += 1;
            }

            total_iter += 1;
            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
        }

        (alphas, bias)
    }

    fn train_machine(
        &self,
        x: &Array2<f64>,
        k: &Array2<f64>,
        y: &Array1<usize>,
        positive: usize,
        seed: u64,
    ) -> BinarySvm {
        let y_binary = y.mapv(|label| if label == positive { 1.0 } else { -1.0 });
        let (alphas, bias) = self.smo_train(k, &y_binary, seed);

        let support: Vec<usize> = alphas
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > 1e-8)
            .map(|(i, _)| i)
            .collect();

        BinarySvm {
            positive,
            support_vectors: x.select(ndarray::Axis(0), &support),
            coefficients: support.iter().map(|&i| alphas[i] * y_binary[i]).collect(),
            bias,
        }
    }
}

impl Model for SVMClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        if self.config.c.is_nan() || self.config.c <= 0.0 {
            return Err(EvalError::InvalidParameter {
                name: "c".to_string(),
                value: self.config.c.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if x.nrows() > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(EvalError::Data(format!(
                "{} training rows exceed the {} row limit of the SVM kernel matrix",
                x.nrows(),
                MAX_KERNEL_MATRIX_SAMPLES
            )));
        }

        let mut classes: Vec<usize> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            return Err(EvalError::Data(
                "SVM requires at least 2 distinct classes".to_string(),
            ));
        }

        let k = self.compute_kernel_matrix(x)?;
        let seed = self.config.random_state;

        // Binary: a single machine for the larger label
        let positives: Vec<usize> = if classes.len() == 2 {
            vec![classes[1]]
        } else {
            classes.clone()
        };
        self.machines = positives
            .iter()
            .map(|&positive| self.train_machine(x, &k, y, positive, seed.wrapping_add(positive as u64)))
            .collect();

        self.classes = classes;
        self.n_features = x.ncols();
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        if !self.is_fitted {
            return Err(EvalError::NotFitted);
        }
        check_prediction_width(x, self.n_features)?;

        let kernel = self.config.kernel;
        let predictions: Vec<usize> = x
            .outer_iter()
            .into_par_iter()
            .map(|row| {
                if let [machine] = self.machines.as_slice() {
                    return if machine.score(&kernel, row) >= 0.0 {
                        self.classes[1]
                    } else {
                        self.classes[0]
                    };
                }

                // Strict comparison keeps the lowest class on ties
                let mut best = (self.classes[0], f64::NEG_INFINITY);
                for machine in &self.machines {
                    let score = machine.score(&kernel, row);
                    if score > best.1 {
                        best = (machine.positive, score);
                    }
                }
                best.0
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_blobs() -> (Array2<f64>, Array1<usize>) {
        let x = array![
            [-2.0, -2.0], [-2.2, -1.8], [-1.8, -2.1], [-2.1, -2.3],
            [2.0, 2.0], [2.2, 1.9], [1.8, 2.2], [2.1, 2.1],
        ];
        let y = array![0, 0, 0, 0, 1, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_binary_separable() {
        let (x, y) = two_blobs();
        let mut svm = SVMClassifier::default();
        svm.fit(&x, &y).unwrap();

        assert_eq!(svm.predict(&x).unwrap(), y);
        assert!(svm.n_support_vectors() > 0);
    }

    #[test]
    fn test_linear_kernel_binary() {
        let (x, y) = two_blobs();
        let config = SVMConfig {
            kernel: KernelType::Linear,
            ..SVMConfig::default()
        };
        let mut svm = SVMClassifier::new(config);
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&array![[-3.0, -3.0], [3.0, 3.0]]).unwrap();
        assert_eq!(predictions, array![0, 1]);
    }

    #[test]
    fn test_one_vs_rest_three_classes() {
        let x = array![
            [0.0, 0.0], [0.2, 0.1], [0.1, 0.2],
            [4.0, 0.0], [4.2, 0.1], [4.1, -0.1],
            [0.0, 4.0], [0.1, 4.2], [-0.1, 4.1],
        ];
        let y = array![0, 0, 0, 1, 1, 1, 2, 2, 2];
        let mut svm = SVMClassifier::default();
        svm.fit(&x, &y).unwrap();

        assert_eq!(svm.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0]];
        let mut svm = SVMClassifier::default();
        assert!(matches!(svm.fit(&x, &array![1, 1]), Err(EvalError::Data(_))));
    }

    #[test]
    fn test_predict_before_fit() {
        let svm = SVMClassifier::default();
        assert!(matches!(svm.predict(&array![[1.0, 2.0]]), Err(EvalError::NotFitted)));
    }
}
