//! Integration test: classification scores

use approx::assert_abs_diff_eq;
use evalbench::evaluation::{ClassificationScores, ConfusionMatrix, PerClassMetrics};
use proptest::prelude::*;

fn in_unit_range(scores: &ClassificationScores) -> bool {
    [scores.accuracy, scores.f1, scores.recall, scores.precision]
        .iter()
        .all(|v| (0.0..=1.0).contains(v))
}

#[test]
fn test_weighted_f1_matches_hand_computation() {
    // class 0: tp 2, fp 0, fn 2 -> p 1.0, r 0.5, f1 2/3, support 4
    // class 1: tp 2, fp 2, fn 0 -> p 0.5, r 1.0, f1 2/3, support 2
    let y_true = [0, 0, 0, 0, 1, 1];
    let y_pred = [0, 0, 1, 1, 1, 1];

    let scores = ClassificationScores::compute(&y_true, &y_pred).unwrap();
    assert_abs_diff_eq!(scores.accuracy, 4.0 / 6.0, epsilon = 1e-6);
    assert_abs_diff_eq!(scores.precision, (4.0 * 1.0 + 2.0 * 0.5) / 6.0, epsilon = 1e-6);
    assert_abs_diff_eq!(scores.recall, (4.0 * 0.5 + 2.0 * 1.0) / 6.0, epsilon = 1e-6);
    assert_abs_diff_eq!(
        scores.f1,
        (4.0 * (2.0 / 3.0) + 2.0 * (2.0 / 3.0)) / 6.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_single_class_ground_truth() {
    let y_true = [2, 2, 2, 2];
    let y_pred = [2, 0, 2, 1];

    let scores = ClassificationScores::compute(&y_true, &y_pred).unwrap();
    assert!(in_unit_range(&scores));
    assert_abs_diff_eq!(scores.accuracy, 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(scores.precision, 1.0, epsilon = 1e-12);
}

#[test]
fn test_all_wrong_scores_zero() {
    let scores = ClassificationScores::compute(&[0, 0, 1], &[1, 1, 0]).unwrap();
    assert_eq!(scores.accuracy, 0.0);
    assert_eq!(scores.f1, 0.0);
    assert_eq!(scores.precision, 0.0);
    assert_eq!(scores.recall, 0.0);
}

#[test]
fn test_per_class_support() {
    let cm = ConfusionMatrix::from_predictions(&[0, 1, 1, 2, 2, 2], &[0, 1, 0, 2, 2, 1]).unwrap();
    let per_class = PerClassMetrics::from_confusion_matrix(&cm);
    assert_eq!(per_class.support, vec![1, 2, 3]);
    assert_abs_diff_eq!(per_class.recall[2], 2.0 / 3.0, epsilon = 1e-12);
}

proptest! {
    #[test]
    fn prop_scores_stay_in_unit_range(
        pairs in prop::collection::vec((0usize..5, 0usize..5), 1..200),
    ) {
        let (y_true, y_pred): (Vec<usize>, Vec<usize>) = pairs.into_iter().unzip();
        let scores = ClassificationScores::compute(&y_true, &y_pred).unwrap();
        prop_assert!(in_unit_range(&scores));
        prop_assert!((scores.recall - scores.accuracy).abs() < 1e-9);
    }
}
