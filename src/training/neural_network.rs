//! Neural Network (Multi-Layer Perceptron) classifier
//!
//! A feedforward network with a softmax output layer, trained by mini-batch
//! gradient descent with momentum on the cross-entropy loss.

use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::models::{check_prediction_width, check_training_input, class_count, Model};
use crate::error::{EvalError, Result};

/// Hidden layer activation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Relu,
    Logistic,
    Tanh,
}

impl Activation {
    fn apply(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::Logistic => z.mapv(|v| 1.0 / (1.0 + (-v).exp())),
            Activation::Tanh => z.mapv(f64::tanh),
        }
    }

    fn derivative(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Logistic => z.mapv(|v| {
                let s = 1.0 / (1.0 + (-v).exp());
                s * (1.0 - s)
            }),
            Activation::Tanh => z.mapv(|v| 1.0 - v.tanh().powi(2)),
        }
    }
}

/// Neural Network configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MLPConfig {
    /// Hidden layer sizes
    pub hidden_layers: Vec<usize>,
    pub activation: Activation,
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub batch_size: usize,
    /// L2 regularization
    pub alpha: f64,
    pub momentum: f64,
    pub random_state: u64,
}

impl Default for MLPConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![100],
            activation: Activation::Relu,
            learning_rate: 0.001,
            max_epochs: 1000,
            batch_size: 32,
            alpha: 0.0001,
            momentum: 0.9,
            random_state: 42,
        }
    }
}

/// Multi-Layer Perceptron Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MLPClassifier {
    config: MLPConfig,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    n_features: usize,
    n_classes: usize,
    is_fitted: bool,
}

impl Default for MLPClassifier {
    fn default() -> Self {
        Self::new(MLPConfig::default())
    }
}

impl MLPClassifier {
    pub fn new(config: MLPConfig) -> Self {
        Self {
            config,
            weights: Vec::new(),
            biases: Vec::new(),
            n_features: 0,
            n_classes: 0,
            is_fitted: false,
        }
    }

    pub fn config(&self) -> &MLPConfig {
        &self.config
    }

    fn validate_config(&self) -> Result<()> {
        let invalid = |name: &str, value: String, reason: &str| EvalError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
        };

        if self.config.batch_size == 0 {
            return Err(invalid("batch_size", "0".to_string(), "must be at least 1"));
        }
        if self.config.hidden_layers.iter().any(|&size| size == 0) {
            return Err(invalid(
                "hidden_layers",
                format!("{:?}", self.config.hidden_layers),
                "every layer needs at least one unit",
            ));
        }
        if !self.config.learning_rate.is_finite() || self.config.learning_rate <= 0.0 {
            return Err(invalid(
                "learning_rate",
                self.config.learning_rate.to_string(),
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Xavier/Glorot uniform initialization
    fn initialize_weights(&mut self, rng: &mut ChaCha8Rng) {
        let mut layer_sizes = vec![self.n_features];
        layer_sizes.extend(&self.config.hidden_layers);
        layer_sizes.push(self.n_classes);

        self.weights.clear();
        self.biases.clear();
        for pair in layer_sizes.windows(2) {
            let (n_in, n_out) = (pair[0], pair[1]);
            let scale = (6.0 / (n_in + n_out) as f64).sqrt();
            self.weights
                .push(Array2::from_shape_fn((n_in, n_out), |_| rng.gen_range(-scale..scale)));
            self.biases.push(Array1::zeros(n_out));
        }
    }

    /// Activations of every layer (input first, softmax output last) and
    /// the pre-activations of the hidden layers
    fn forward(&self, x: &Array2<f64>) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let n_layers = self.weights.len();
        let mut activations = vec![x.clone()];
        let mut z_hidden = Vec::with_capacity(n_layers.saturating_sub(1));

        for (i, (w, b)) in self.weights.iter().zip(&self.biases).enumerate() {
            let Some(input) = activations.last() else {
                break;
            };
            let z = input.dot(w) + b;
            let a = if i + 1 < n_layers {
                let a = self.config.activation.apply(&z);
                z_hidden.push(z);
                a
            } else {
                softmax(z)
            };
            activations.push(a);
        }

        (activations, z_hidden)
    }

    /// Cross-entropy gradients for each layer
    fn backward(
        &self,
        y_onehot: &Array2<f64>,
        activations: &[Array2<f64>],
        z_hidden: &[Array2<f64>],
    ) -> Vec<(Array2<f64>, Array1<f64>)> {
        let n = y_onehot.nrows().max(1) as f64;
        let mut gradients = Vec::with_capacity(self.weights.len());
        let Some(output) = activations.last() else {
            return gradients;
        };

        let mut delta = (output - y_onehot) / n;
        for i in (0..self.weights.len()).rev() {
            let grad_w = activations[i].t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));
            gradients.push((grad_w, grad_b));

            if i > 0 {
                delta = delta.dot(&self.weights[i].t())
                    * self.config.activation.derivative(&z_hidden[i - 1]);
            }
        }

        gradients.reverse();
        gradients
    }

    /// Class probabilities, one row per sample
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(EvalError::NotFitted);
        }
        check_prediction_width(x, self.n_features)?;

        let (mut activations, _) = self.forward(x);
        activations
            .pop()
            .ok_or_else(|| EvalError::Computation("network has no layers".to_string()))
    }
}

fn softmax(mut z: Array2<f64>) -> Array2<f64> {
    for mut row in z.rows_mut() {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    z
}

impl Model for MLPClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        self.validate_config()?;

        let n_samples = x.nrows();
        self.n_features = x.ncols();
        self.n_classes = class_count(y);

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_state);
        self.initialize_weights(&mut rng);

        let mut y_onehot = Array2::<f64>::zeros((n_samples, self.n_classes));
        for (i, &label) in y.iter().enumerate() {
            y_onehot[[i, label]] = 1.0;
        }

        let mut velocities_w: Vec<Array2<f64>> =
            self.weights.iter().map(|w| Array2::zeros(w.raw_dim())).collect();
        let mut velocities_b: Vec<Array1<f64>> =
            self.biases.iter().map(|b| Array1::zeros(b.len())).collect();

        let lr = self.config.learning_rate;
        let momentum = self.config.momentum;
        let decay = 1.0 - self.config.alpha * lr;
        let mut indices: Vec<usize> = (0..n_samples).collect();

        for _epoch in 0..self.config.max_epochs {
            indices.shuffle(&mut rng);

            for batch in indices.chunks(self.config.batch_size) {
                let x_batch = x.select(Axis(0), batch);
                let y_batch = y_onehot.select(Axis(0), batch);

                let (activations, z_hidden) = self.forward(&x_batch);
                let gradients = self.backward(&y_batch, &activations, &z_hidden);

                for (i, (grad_w, grad_b)) in gradients.into_iter().enumerate() {
                    velocities_w[i] = &velocities_w[i] * momentum - &grad_w * lr;
                    velocities_b[i] = &velocities_b[i] * momentum - &grad_b * lr;

                    self.weights[i] = (&self.weights[i] + &velocities_w[i]) * decay;
                    self.biases[i] += &velocities_b[i];
                }
            }
        }

        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let proba = self.predict_proba(x)?;

        // Strict comparison keeps the lowest class on ties
        Ok(proba
            .outer_iter()
            .map(|row| {
                let mut best = 0;
                for (class, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = class;
                    }
                }
                best
            })
            .collect())
    }
}
