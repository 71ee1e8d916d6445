//! K-Nearest Neighbors implementation
//!
//! KNN classifier with configurable distance metric and vote weighting.

use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::models::{check_prediction_width, check_training_input, class_count, Model};
use crate::error::{EvalError, Result};

/// Distance metric for KNN
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Euclidean distance (L2)
    #[default]
    Euclidean,
    /// Manhattan distance (L1)
    Manhattan,
    /// Minkowski distance with parameter p
    Minkowski(f64),
}

/// Weighting scheme for neighbors
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightScheme {
    /// All neighbors have equal weight
    #[default]
    Uniform,
    /// Closer neighbors have more weight (inverse distance)
    Distance,
}

/// KNN configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNConfig {
    /// Number of neighbors
    pub n_neighbors: usize,
    /// Distance metric
    pub metric: DistanceMetric,
    /// Weighting scheme
    pub weights: WeightScheme,
}

impl Default for KNNConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            metric: DistanceMetric::Euclidean,
            weights: WeightScheme::Uniform,
        }
    }
}

/// K-Nearest Neighbors Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNClassifier {
    config: KNNConfig,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<usize>>,
    n_classes: usize,
}

impl KNNClassifier {
    pub fn new(config: KNNConfig) -> Self {
        Self {
            config,
            x_train: None,
            y_train: None,
            n_classes: 0,
        }
    }

    /// Create with default config and specified k
    pub fn with_k(k: usize) -> Self {
        Self::new(KNNConfig {
            n_neighbors: k,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &KNNConfig {
        &self.config
    }
}

impl Model for KNNClassifier {
    /// Stores the training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        if self.config.n_neighbors == 0 {
            return Err(EvalError::InvalidParameter {
                name: "n_neighbors".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        self.n_classes = class_count(y);
        Ok(())
    }

    /// Predict class labels (parallelized over test samples)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x_train), Some(y_train)) => (x_train, y_train),
            _ => return Err(EvalError::NotFitted),
        };
        check_prediction_width(x, x_train.ncols())?;

        let k = self.config.n_neighbors.min(x_train.nrows());
        let metric = self.config.metric;
        let weights = self.config.weights;
        let n_classes = self.n_classes;

        let predictions: Vec<usize> = x
            .outer_iter()
            .into_par_iter()
            .map(|row| {
                let point = row.to_vec();
                let neighbors = find_k_nearest(&point, x_train, y_train, k, metric);
                vote_classify(&neighbors, n_classes, weights)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}

/// Max-heap entry for partial sort (keeps k smallest distances)
#[derive(PartialEq)]
struct DistLabel(f64, usize);

impl Eq for DistLabel {}
impl PartialOrd for DistLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// Find k nearest neighbors using a max-heap, O(n log k)
fn find_k_nearest(
    point: &[f64],
    x_train: &Array2<f64>,
    y_train: &Array1<usize>,
    k: usize,
    metric: DistanceMetric,
) -> Vec<(f64, usize)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (row, &label) in x_train.outer_iter().zip(y_train.iter()) {
        let dist = compute_distance(point, row.iter().copied(), metric);
        if heap.len() < k {
            heap.push(DistLabel(dist, label));
        } else if let Some(top) = heap.peek() {
            if dist < top.0 {
                heap.pop();
                heap.push(DistLabel(dist, label));
            }
        }
    }

    heap.into_iter().map(|dl| (dl.0, dl.1)).collect()
}

/// Compute distance between two points using the specified metric
fn compute_distance(a: &[f64], b: impl Iterator<Item = f64>, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b)
            .map(|(ai, bi)| {
                let d = ai - bi;
                d * d
            })
            .sum::<f64>()
            .sqrt(),
        DistanceMetric::Manhattan => a.iter().zip(b).map(|(ai, bi)| (ai - bi).abs()).sum(),
        DistanceMetric::Minkowski(p) => a
            .iter()
            .zip(b)
            .map(|(ai, bi)| (ai - bi).abs().powf(p))
            .sum::<f64>()
            .powf(1.0 / p),
    }
}

/// Classify by weighted majority vote; ties go to the lowest class code
fn vote_classify(neighbors: &[(f64, usize)], n_classes: usize, weights: WeightScheme) -> usize {
    let mut votes = vec![0.0; n_classes];
    for &(dist, label) in neighbors {
        let weight = match weights {
            WeightScheme::Uniform => 1.0,
            WeightScheme::Distance => 1.0 / (dist + 1e-10),
        };
        votes[label] += weight;
    }

    let mut best = 0;
    for (class, &vote) in votes.iter().enumerate() {
        if vote > votes[best] {
            best = class;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_classification_data() -> (Array2<f64>, Array1<usize>) {
        // Create linearly separable data
        let x = Array2::from_shape_vec((20, 2), vec![
            // Class 0 (low values)
            1.0, 1.0, 1.5, 1.5, 2.0, 2.0, 2.5, 2.5, 1.0, 2.0,
            1.5, 2.5, 2.0, 1.5, 2.5, 1.0, 1.2, 1.8, 1.8, 1.2,
            // Class 1 (high values)
            8.0, 8.0, 8.5, 8.5, 9.0, 9.0, 9.5, 9.5, 8.0, 9.0,
            8.5, 9.5, 9.0, 8.5, 9.5, 8.0, 8.2, 8.8, 8.8, 8.2,
        ]).unwrap();

        let y = Array1::from_vec(vec![
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        ]);

        (x, y)
    }

    #[test]
    fn test_knn_classifier() {
        let (x, y) = create_classification_data();

        let mut knn = KNNClassifier::with_k(3);
        knn.fit(&x, &y).unwrap();

        let predictions = knn.predict(&x).unwrap();

        // Check accuracy (should be perfect for this separable data)
        let correct = y.iter().zip(predictions.iter()).filter(|(a, b)| a == b).count();
        assert_eq!(correct, 20, "KNN should classify separable data perfectly");
    }

    #[test]
    fn test_knn_distance_weighting() {
        let (x, y) = create_classification_data();

        let mut knn = KNNClassifier::new(KNNConfig {
            n_neighbors: 5,
            metric: DistanceMetric::Manhattan,
            weights: WeightScheme::Distance,
        });
        knn.fit(&x, &y).unwrap();

        let queries = Array2::from_shape_vec((2, 2), vec![1.1, 1.1, 9.1, 9.1]).unwrap();
        assert_eq!(knn.predict(&queries).unwrap().to_vec(), vec![0, 1]);
    }

    #[test]
    fn test_k_larger_than_training_set() {
        let x = Array2::from_shape_vec((3, 1), vec![0.0, 1.0, 2.0]).unwrap();
        let y = Array1::from_vec(vec![1, 1, 0]);

        let mut knn = KNNClassifier::with_k(5);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&x).unwrap().to_vec(), vec![1, 1, 1]);
    }

    #[test]
    fn test_vote_tie_goes_to_lowest_class() {
        let neighbors = vec![(1.0, 1), (1.0, 0)];
        assert_eq!(vote_classify(&neighbors, 2, WeightScheme::Uniform), 0);
    }

    #[test]
    fn test_predict_before_fit() {
        let knn = KNNClassifier::with_k(3);
        let x = Array2::zeros((1, 2));
        assert!(matches!(knn.predict(&x), Err(EvalError::NotFitted)));
    }
}
