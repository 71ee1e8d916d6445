//! Classification metrics
//!
//! Precision, recall and F1 are computed per class from a confusion matrix and
//! averaged with support weights. A class whose denominator is zero scores 0.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Confusion matrix for multi-class classification
///
/// Rows and columns cover the distinct labels seen in either vector, in
/// ascending order. Element [i][j] counts samples whose true label is
/// `labels[i]` and whose prediction is `labels[j]`.
#[derive(Clone, Debug)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    labels: Vec<usize>,
}

impl ConfusionMatrix {
    fn with_labels(labels: Vec<usize>) -> Self {
        let n = labels.len();
        Self {
            matrix: vec![vec![0; n]; n],
            labels,
        }
    }

    /// Create from ground truth and predictions
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(EvalError::Shape {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }

        let labels: BTreeSet<usize> = y_true.iter().chain(y_pred).copied().collect();
        let mut cm = Self::with_labels(labels.into_iter().collect());
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if let (Some(i), Some(j)) = (cm.index_of(t), cm.index_of(p)) {
                cm.matrix[i][j] += 1;
            }
        }
        Ok(cm)
    }

    fn index_of(&self, label: usize) -> Option<usize> {
        self.labels.binary_search(&label).ok()
    }

    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    /// Labels covered by the matrix, ascending
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Count for [true_label][predicted_label]; zero for labels never seen
    pub fn get(&self, true_label: usize, predicted_label: usize) -> usize {
        match (self.index_of(true_label), self.index_of(predicted_label)) {
            (Some(i), Some(j)) => self.matrix[i][j],
            _ => 0,
        }
    }

    pub fn true_positives(&self, label: usize) -> usize {
        self.get(label, label)
    }

    /// Predicted as label but wasn't
    pub fn false_positives(&self, label: usize) -> usize {
        self.index_of(label).map_or(0, |j| {
            (0..self.n_classes())
                .filter(|&i| i != j)
                .map(|i| self.matrix[i][j])
                .sum()
        })
    }

    /// Was label but predicted differently
    pub fn false_negatives(&self, label: usize) -> usize {
        self.index_of(label).map_or(0, |i| {
            (0..self.n_classes())
                .filter(|&j| j != i)
                .map(|j| self.matrix[i][j])
                .sum()
        })
    }

    /// Total true instances of a label
    pub fn support(&self, label: usize) -> usize {
        self.index_of(label)
            .map_or(0, |i| self.matrix[i].iter().sum())
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes()).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "      ")?;
        for label in &self.labels {
            write!(f, "Pred {label} ")?;
        }
        writeln!(f)?;

        for (label, row) in self.labels.iter().zip(&self.matrix) {
            write!(f, "True {label}")?;
            for count in row {
                write!(f, "{:>6} ", count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Per-class precision, recall and F1, in the matrix's label order
#[derive(Clone, Debug)]
pub struct PerClassMetrics {
    pub labels: Vec<usize>,
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub f1: Vec<f64>,
    pub support: Vec<usize>,
}

impl PerClassMetrics {
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let labels = cm.labels().to_vec();
        let n_classes = labels.len();
        let mut precision = Vec::with_capacity(n_classes);
        let mut recall = Vec::with_capacity(n_classes);
        let mut f1 = Vec::with_capacity(n_classes);
        let mut support = Vec::with_capacity(n_classes);

        for &class in &labels {
            let tp = cm.true_positives(class) as f64;
            let fp = cm.false_positives(class) as f64;
            let fn_ = cm.false_negatives(class) as f64;

            let p = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
            let r = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
            let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };

            precision.push(p);
            recall.push(r);
            f1.push(f);
            support.push(cm.support(class));
        }

        Self {
            labels,
            precision,
            recall,
            f1,
            support,
        }
    }

    /// Support-weighted mean of a per-class metric
    pub fn weighted(&self, values: &[f64]) -> f64 {
        let total_support: usize = self.support.iter().sum();
        if total_support == 0 {
            return 0.0;
        }
        values
            .iter()
            .zip(&self.support)
            .map(|(&v, &s)| v * s as f64)
            .sum::<f64>()
            / total_support as f64
    }
}

/// The fixed metric set reported for every model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationScores {
    pub accuracy: f64,
    pub f1: f64,
    pub recall: f64,
    pub precision: f64,
}

impl ClassificationScores {
    /// Accuracy plus support-weighted precision, recall and F1
    pub fn compute(y_true: &[usize], y_pred: &[usize]) -> Result<Self> {
        let cm = ConfusionMatrix::from_predictions(y_true, y_pred)?;
        let per_class = PerClassMetrics::from_confusion_matrix(&cm);

        Ok(Self {
            accuracy: cm.accuracy(),
            f1: per_class.weighted(&per_class.f1),
            recall: per_class.weighted(&per_class.recall),
            precision: per_class.weighted(&per_class.precision),
        })
    }
}
