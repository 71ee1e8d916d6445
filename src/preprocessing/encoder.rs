//! Label encoding for categorical columns

use crate::error::{EvalError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Maps categorical values bijectively onto `0..n_classes`.
///
/// Codes follow sorted label order. When every label parses as a number the
/// sort is numeric, otherwise lexicographic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
    is_fitted: bool,
}

impl LabelEncoder {
    /// Create an unfitted encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the set of classes
    pub fn fit<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<&mut Self> {
        let mut classes: Vec<String> = labels.iter().map(|s| s.as_ref().to_string()).collect();
        classes.sort_by(compare_labels);
        classes.dedup();

        self.index = classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code))
            .collect();
        self.classes = classes;
        self.is_fitted = true;
        Ok(self)
    }

    /// Map labels to their codes
    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Array1<usize>> {
        if !self.is_fitted {
            return Err(EvalError::NotFitted);
        }

        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.index
                    .get(label)
                    .copied()
                    .ok_or_else(|| EvalError::Data(format!("unseen label '{}'", label)))
            })
            .collect::<Result<Vec<_>>>()
            .map(Array1::from_vec)
    }

    /// Fit and transform in one step
    pub fn fit_transform<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<Array1<usize>> {
        self.fit(labels)?;
        self.transform(labels)
    }

    /// Map codes back to labels
    pub fn inverse_transform(&self, codes: &[usize]) -> Result<Vec<String>> {
        if !self.is_fitted {
            return Err(EvalError::NotFitted);
        }

        codes
            .iter()
            .map(|&code| {
                self.classes
                    .get(code)
                    .cloned()
                    .ok_or_else(|| EvalError::Data(format!("unknown code {}", code)))
            })
            .collect()
    }

    /// Fitted classes, indexed by code
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of fitted classes
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

fn compare_labels(a: &String, b: &String) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
