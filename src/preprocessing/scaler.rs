//! Feature scaling implementations

use crate::error::{EvalError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// No scaling
    None,
}

impl Default for ScalerType {
    fn default() -> Self {
        Self::Standard
    }
}

/// Parameters for one fitted column
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScalerParams {
    center: f64, // mean or min
    scale: f64,  // std or range
}

/// Column-wise feature scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }

    /// Fit the scaler to every column of `x`
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(EvalError::EmptyFeatureSet {
                rows: x.nrows(),
                cols: x.ncols(),
            });
        }

        self.params = x
            .axis_iter(Axis(1))
            .map(|column| self.compute_params(&column.to_vec()))
            .collect();
        self.is_fitted = true;
        Ok(self)
    }

    /// Apply the fitted parameters
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(EvalError::NotFitted);
        }
        self.check_width(x)?;

        let mut out = x.clone();
        for (mut column, params) in out.axis_iter_mut(Axis(1)).zip(self.params.iter()) {
            column.mapv_inplace(|v| (v - params.center) / params.scale);
        }
        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Undo the scaling
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(EvalError::NotFitted);
        }
        self.check_width(x)?;

        let mut out = x.clone();
        for (mut column, params) in out.axis_iter_mut(Axis(1)).zip(self.params.iter()) {
            column.mapv_inplace(|v| v * params.scale + params.center);
        }
        Ok(out)
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.params.len() {
            return Err(EvalError::Shape {
                expected: format!("{} columns", self.params.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok(())
    }

    fn compute_params(&self, values: &[f64]) -> ScalerParams {
        let n = values.len() as f64;

        match self.scaler_type {
            ScalerType::Standard => {
                let mean = values.iter().sum::<f64>() / n;
                // Population variance, matching zero-mean/unit-variance output
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                ScalerParams {
                    center: mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                }
            }
            ScalerType::MinMax => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                ScalerParams {
                    center: min,
                    scale: if range == 0.0 { 1.0 } else { range },
                }
            }
            ScalerType::None => ScalerParams {
                center: 0.0,
                scale: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_standard_scaler_zero_mean_unit_variance() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0], [5.0, 50.0]];
        let mut scaler = Scaler::new(ScalerType::Standard);
        let scaled = scaler.fit_transform(&x).unwrap();

        for column in scaled.axis_iter(Axis(1)) {
            let n = column.len() as f64;
            let mean = column.sum() / n;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(var, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_constant_column_is_centred_only() {
        let x = array![[3.0], [3.0], [3.0]];
        let mut scaler = Scaler::new(ScalerType::Standard);
        let scaled = scaler.fit_transform(&x).unwrap();
        assert!(scaled.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_minmax_scaler() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let mut scaler = Scaler::new(ScalerType::MinMax);
        let scaled = scaler.fit_transform(&x).unwrap();

        assert_abs_diff_eq!(scaled[[0, 0]], 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(scaled[[4, 0]], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_inverse_transform() {
        let x = array![[1.0, -2.0], [2.0, 0.5], [3.0, 7.0]];
        let mut scaler = Scaler::new(ScalerType::Standard);
        let scaled = scaler.fit_transform(&x).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();

        for (o, r) in x.iter().zip(restored.iter()) {
            assert_abs_diff_eq!(*o, *r, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_empty_feature_set() {
        let no_cols = Array2::<f64>::zeros((4, 0));
        let no_rows = Array2::<f64>::zeros((0, 3));
        let mut scaler = Scaler::new(ScalerType::Standard);

        assert!(matches!(scaler.fit(&no_cols), Err(EvalError::EmptyFeatureSet { rows: 4, cols: 0 })));
        assert!(matches!(scaler.fit(&no_rows), Err(EvalError::EmptyFeatureSet { rows: 0, cols: 3 })));
    }

    #[test]
    fn test_transform_checks_width() {
        let mut scaler = Scaler::new(ScalerType::Standard);
        scaler.fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(matches!(scaler.transform(&array![[1.0], [2.0]]), Err(EvalError::Shape { .. })));
    }
}
