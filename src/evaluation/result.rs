//! Result records and the aggregated table

use super::metrics::ClassificationScores;
use crate::error::{EvalError, Phase};
use crate::utils::round_to;
use serde::{Deserialize, Serialize};

/// Decimals kept for quality scores
pub const SCORE_DECIMALS: u32 = 4;
/// Decimals kept for timings
pub const TIME_DECIMALS: u32 = 2;

/// Outcome of evaluating one model. Values are rounded on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    name: String,
    accuracy: f64,
    f1: f64,
    recall: f64,
    precision: f64,
    train_time_seconds: f64,
    test_time_seconds: f64,
}

impl ResultRecord {
    pub fn new(
        name: impl Into<String>,
        scores: ClassificationScores,
        train_time_seconds: f64,
        test_time_seconds: f64,
    ) -> Self {
        let score = |v: f64| round_to(v.clamp(0.0, 1.0), SCORE_DECIMALS);
        let time = |v: f64| round_to(v.max(0.0), TIME_DECIMALS);

        Self {
            name: name.into(),
            accuracy: score(scores.accuracy),
            f1: score(scores.f1),
            recall: score(scores.recall),
            precision: score(scores.precision),
            train_time_seconds: time(train_time_seconds),
            test_time_seconds: time(test_time_seconds),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn f1(&self) -> f64 {
        self.f1
    }

    pub fn recall(&self) -> f64 {
        self.recall
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn train_time_seconds(&self) -> f64 {
        self.train_time_seconds
    }

    pub fn test_time_seconds(&self) -> f64 {
        self.test_time_seconds
    }

    /// Quality metrics in report column order
    pub fn scores(&self) -> [f64; 4] {
        [self.accuracy, self.f1, self.recall, self.precision]
    }

    /// Timing metrics in report column order
    pub fn timings(&self) -> [f64; 2] {
        [self.train_time_seconds, self.test_time_seconds]
    }
}

/// A model dropped from the table under the skip policy
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFailure {
    pub model: String,
    pub phase: Option<Phase>,
    pub message: String,
}

impl ModelFailure {
    pub fn from_error(model: impl Into<String>, err: &EvalError) -> Self {
        let (phase, message) = match err {
            EvalError::ModelFault { phase, source, .. } => (Some(*phase), source.to_string()),
            other => (None, other.to_string()),
        };
        Self {
            model: model.into(),
            phase,
            message,
        }
    }
}

/// Records in registry order, plus any skipped models
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    records: Vec<ResultRecord>,
    failures: Vec<ModelFailure>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn record_failure(&mut self, failure: ModelFailure) {
        self.failures.push(failure);
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn failures(&self) -> &[ModelFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Model names in row order
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name()).collect()
    }

    /// Record with the highest accuracy; earliest wins ties
    pub fn best_by_accuracy(&self) -> Option<&ResultRecord> {
        self.records.iter().fold(None, |best: Option<&ResultRecord>, r| match best {
            Some(b) if b.accuracy >= r.accuracy => Some(b),
            _ => Some(r),
        })
    }
}
