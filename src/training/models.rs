//! Model capability trait

use crate::error::{EvalError, Result};
use ndarray::{Array1, Array2};

/// A classifier the harness can train and query.
///
/// Implementations are opaque to the evaluation loop: it only ever calls
/// `fit` once and then `predict` once on each instance.
pub trait Model: Send {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>;

    /// Predict one class code per row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;
}

/// Reject empty or misaligned training input
pub(crate) fn check_training_input(x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(EvalError::Shape {
            expected: format!("{} labels", x.nrows()),
            actual: format!("{} labels", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(EvalError::EmptyFeatureSet {
            rows: 0,
            cols: x.ncols(),
        });
    }
    Ok(())
}

/// Reject prediction input whose width differs from the training data
pub(crate) fn check_prediction_width(x: &Array2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(EvalError::Shape {
            expected: format!("{} features", n_features),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}

/// Number of classes implied by a label vector
pub(crate) fn class_count(y: &Array1<usize>) -> usize {
    y.iter().copied().max().map_or(0, |m| m + 1)
}
