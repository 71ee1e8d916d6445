//! Seeded train/test partitioning

use crate::error::{EvalError, Result};
use crate::preprocessing::Scaler;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A single train/test partition with the selected rows
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<usize>,
    pub y_test: Array1<usize>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    /// Valid class codes are `0..n_classes`
    pub n_classes: usize,
}

impl Split {
    pub fn n_train(&self) -> usize {
        self.train_indices.len()
    }

    pub fn n_test(&self) -> usize {
        self.test_indices.len()
    }

    /// Whether `label` is a class code present in the labelled rows
    pub fn is_known_class(&self, label: usize) -> bool {
        label < self.n_classes
    }

    /// Fit `scaler` on the training rows and apply it to both partitions
    pub fn scale_with(&mut self, scaler: &mut Scaler) -> Result<()> {
        self.x_train = scaler.fit_transform(&self.x_train)?;
        self.x_test = scaler.transform(&self.x_test)?;
        Ok(())
    }
}

/// Number of test rows for `n_samples` rows
pub fn test_size(n_samples: usize, test_fraction: f64) -> usize {
    // Relative guard against representation error in the product
    let exact = test_fraction * n_samples as f64;
    (exact - exact.abs() * 1e-9).ceil().max(0.0) as usize
}

/// Check that a test fraction is usable for `n_samples` rows
pub fn validate_fraction(test_fraction: f64, n_samples: usize) -> Result<usize> {
    let invalid = |reason: &str| EvalError::InvalidFraction {
        fraction: test_fraction,
        reason: reason.to_string(),
    };

    if !test_fraction.is_finite() || test_fraction <= 0.0 || test_fraction >= 1.0 {
        return Err(invalid("must lie strictly between 0 and 1"));
    }

    let n_test = test_size(n_samples, test_fraction);
    if n_test == 0 {
        return Err(invalid("leaves the test partition empty"));
    }
    if n_test >= n_samples {
        return Err(invalid("leaves the training partition empty"));
    }
    Ok(n_test)
}

/// Shuffle row indices with a seeded RNG and cut off the test partition.
///
/// The first `ceil(test_fraction * n)` shuffled indices form the test set and
/// the rest, in shuffled order, the training set.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<usize>,
    test_fraction: f64,
    seed: u64,
) -> Result<Split> {
    let n_samples = x.nrows();
    if y.len() != n_samples {
        return Err(EvalError::Shape {
            expected: format!("{} labels", n_samples),
            actual: format!("{} labels", y.len()),
        });
    }

    let n_test = validate_fraction(test_fraction, n_samples)?;

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_indices = indices.split_off(n_test);
    let test_indices = indices;

    Ok(Split {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: train_indices.iter().map(|&i| y[i]).collect(),
        y_test: test_indices.iter().map(|&i| y[i]).collect(),
        train_indices,
        test_indices,
        n_classes: y.iter().max().map_or(0, |&m| m.saturating_add(1)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::ScalerType;

    fn data(n: usize) -> (Array2<f64>, Array1<usize>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64);
        let y = (0..n).map(|i| i % 3).collect();
        (x, y)
    }

    #[test]
    fn test_sizes() {
        let (x, y) = data(150);
        let split = train_test_split(&x, &y, 0.2, 62).unwrap();
        assert_eq!(split.n_test(), 30);
        assert_eq!(split.n_train(), 120);
        assert_eq!(split.x_train.nrows(), 120);
        assert_eq!(split.y_test.len(), 30);
    }

    #[test]
    fn test_test_size_rounds_up() {
        assert_eq!(test_size(10, 0.25), 3);
        assert_eq!(test_size(150, 0.2), 30);
        assert_eq!(test_size(3, 0.01), 1);
        assert_eq!(test_size(150, 1e-12), 1);
    }

    #[test]
    fn test_tiny_fraction_keeps_one_test_row() {
        let (x, y) = data(150);
        let split = train_test_split(&x, &y, 1e-12, 62).unwrap();
        assert_eq!(split.n_test(), 1);
        assert_eq!(split.n_train(), 149);
    }

    #[test]
    fn test_empty_test_partition_is_rejected() {
        let err = validate_fraction(0.5, 0).unwrap_err();
        assert!(matches!(
            err,
            EvalError::InvalidFraction { ref reason, .. } if reason.contains("test partition empty")
        ));
    }

    #[test]
    fn test_known_classes_follow_labels() {
        let (x, y) = data(12);
        let split = train_test_split(&x, &y, 0.25, 5).unwrap();
        assert_eq!(split.n_classes, 3);
        assert!(split.is_known_class(2));
        assert!(!split.is_known_class(3));
    }

    #[test]
    fn test_rows_follow_indices() {
        let (x, y) = data(20);
        let split = train_test_split(&x, &y, 0.3, 1).unwrap();

        for (row, &i) in split.x_test.outer_iter().zip(&split.test_indices) {
            assert_eq!(row, x.row(i));
        }
        for (&label, &i) in split.y_train.iter().zip(&split.train_indices) {
            assert_eq!(label, y[i]);
        }
    }

    #[test]
    fn test_invalid_fractions() {
        let (x, y) = data(10);
        for fraction in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                train_test_split(&x, &y, fraction, 0),
                Err(EvalError::InvalidFraction { .. })
            ));
        }
    }

    #[test]
    fn test_fraction_leaving_no_training_rows() {
        let (x, y) = data(2);
        assert!(matches!(
            train_test_split(&x, &y, 0.9, 0),
            Err(EvalError::InvalidFraction { .. })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let (x, _) = data(5);
        let y = Array1::from_vec(vec![0, 1]);
        assert!(matches!(
            train_test_split(&x, &y, 0.2, 0),
            Err(EvalError::Shape { .. })
        ));
    }

    #[test]
    fn test_scale_with_uses_training_rows() {
        let (x, y) = data(10);
        let mut split = train_test_split(&x, &y, 0.2, 3).unwrap();
        let mut scaler = Scaler::new(ScalerType::Standard);
        split.scale_with(&mut scaler).unwrap();

        let mean = split.x_train.column(0).sum() / split.n_train() as f64;
        assert!(mean.abs() < 1e-10);
    }
}
