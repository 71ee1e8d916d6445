//! Majority-class baseline

use super::decision_tree::majority_class;
use super::models::{check_training_input, class_count, Model};
use crate::error::{EvalError, Result};
use ndarray::{Array1, Array2};

/// Always predicts the most frequent training class
#[derive(Debug, Clone, Default)]
pub struct MajorityClass {
    class: Option<usize>,
}

impl MajorityClass {
    pub fn new() -> Self {
        Self::default()
    }

    /// The class this baseline predicts, once fitted
    pub fn class(&self) -> Option<usize> {
        self.class
    }
}

impl Model for MajorityClass {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        let mut counts = vec![0usize; class_count(y)];
        for &label in y {
            counts[label] += 1;
        }
        self.class = Some(majority_class(&counts));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let class = self.class.ok_or(EvalError::NotFitted)?;
        Ok(Array1::from_elem(x.nrows(), class))
    }
}
