//! Missing value imputation strategies

use crate::error::{EvalError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strategy for imputing missing values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Replace with column mean
    Mean,
    /// Replace with column median
    Median,
    /// Replace with mode / most frequent value
    MostFrequent,
    /// Replace with a constant value
    Constant(f64),
}

/// Imputer for handling missing (NaN) cells in a feature matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: Vec<f64>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    /// Learn one fill value per column from the observed cells
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        self.fill_values = x
            .axis_iter(Axis(1))
            .map(|column| {
                let observed: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
                self.compute_fill(&observed)
            })
            .collect();
        self.is_fitted = true;
        Ok(self)
    }

    /// Replace NaN cells with the fitted fill values
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(EvalError::NotFitted);
        }
        if x.ncols() != self.fill_values.len() {
            return Err(EvalError::Shape {
                expected: format!("{} columns", self.fill_values.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut out = x.clone();
        for (mut column, &fill) in out.axis_iter_mut(Axis(1)).zip(self.fill_values.iter()) {
            column.mapv_inplace(|v| if v.is_nan() { fill } else { v });
        }
        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Fitted fill values, one per column
    pub fn fill_values(&self) -> &[f64] {
        &self.fill_values
    }

    fn compute_fill(&self, observed: &[f64]) -> f64 {
        if observed.is_empty() {
            // Nothing observed in the column
            return match self.strategy {
                ImputeStrategy::Constant(v) => v,
                _ => 0.0,
            };
        }

        match self.strategy {
            ImputeStrategy::Mean => observed.iter().sum::<f64>() / observed.len() as f64,
            ImputeStrategy::Median => {
                let mut sorted = observed.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] + sorted[mid]) / 2.0
                } else {
                    sorted[mid]
                }
            }
            ImputeStrategy::MostFrequent => {
                let mut counts: HashMap<u64, (usize, f64)> = HashMap::new();
                for &v in observed {
                    counts.entry(v.to_bits()).or_insert((0, v)).0 += 1;
                }
                // Ties resolve to the smallest value
                counts
                    .into_values()
                    .max_by(|(ca, va), (cb, vb)| ca.cmp(cb).then_with(|| vb.total_cmp(va)))
                    .map(|(_, v)| v)
                    .unwrap_or(0.0)
            }
            ImputeStrategy::Constant(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_mean_imputation() {
        let x = array![[1.0, 10.0], [f64::NAN, 20.0], [3.0, f64::NAN]];
        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        let filled = imputer.fit_transform(&x).unwrap();

        assert_abs_diff_eq!(filled[[1, 0]], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(filled[[2, 1]], 15.0, epsilon = 1e-10);
        assert!(filled.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_median_imputation() {
        let x = array![[1.0], [f64::NAN], [2.0], [10.0]];
        let mut imputer = Imputer::new(ImputeStrategy::Median);
        let filled = imputer.fit_transform(&x).unwrap();
        assert_abs_diff_eq!(filled[[1, 0]], 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_most_frequent_imputation() {
        let x = array![[4.0], [4.0], [1.0], [f64::NAN]];
        let mut imputer = Imputer::new(ImputeStrategy::MostFrequent);
        let filled = imputer.fit_transform(&x).unwrap();
        assert_eq!(filled[[3, 0]], 4.0);
    }

    #[test]
    fn test_constant_imputation() {
        let x = array![[f64::NAN, 1.0]];
        let mut imputer = Imputer::new(ImputeStrategy::Constant(-1.0));
        let filled = imputer.fit_transform(&x).unwrap();
        assert_eq!(filled[[0, 0]], -1.0);
        assert_eq!(filled[[0, 1]], 1.0);
    }

    #[test]
    fn test_unfitted_imputer() {
        let imputer = Imputer::new(ImputeStrategy::Mean);
        assert!(matches!(imputer.transform(&array![[1.0]]), Err(EvalError::NotFitted)));
    }
}
