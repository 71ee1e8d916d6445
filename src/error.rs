//! Error types for the evaluation harness

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, EvalError>;

/// Phase of a model's lifecycle in which a fault occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Train,
    Test,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Train => write!(f, "train"),
            Phase::Test => write!(f, "test"),
        }
    }
}

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Data not found: {path}: {reason}")]
    DataNotFound { path: PathBuf, reason: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Empty feature set: {rows} rows x {cols} columns")]
    EmptyFeatureSet { rows: usize, cols: usize },

    #[error("Invalid test fraction {fraction}: {reason}")]
    InvalidFraction { fraction: f64, reason: String },

    #[error("Missing values in feature column '{column}' (enable imputation to fill them)")]
    MissingValues { column: String },

    #[error("Duplicate model name: {0}")]
    DuplicateModel(String),

    #[error("Model '{model}' failed during {phase}")]
    ModelFault {
        model: String,
        phase: Phase,
        #[source]
        source: Box<EvalError>,
    },

    #[error("Model not fitted")]
    NotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Computation error: {0}")]
    Computation(String),
}

impl EvalError {
    /// Wrap a fault raised by a model capability
    pub fn model_fault(model: impl Into<String>, phase: Phase, source: EvalError) -> Self {
        EvalError::ModelFault {
            model: model.into(),
            phase,
            source: Box::new(source),
        }
    }

    /// Build a write error for `path`
    pub fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        EvalError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for faults detected before any model runs
    pub fn is_input_fault(&self) -> bool {
        matches!(
            self,
            EvalError::DataNotFound { .. }
                | EvalError::Schema(_)
                | EvalError::EmptyFeatureSet { .. }
                | EvalError::InvalidFraction { .. }
                | EvalError::MissingValues { .. }
                | EvalError::Config(_)
        )
    }
}

impl From<polars::error::PolarsError> for EvalError {
    fn from(err: polars::error::PolarsError) -> Self {
        EvalError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::Config(err.to_string())
    }
}

impl From<ndarray::ShapeError> for EvalError {
    fn from(err: ndarray::ShapeError) -> Self {
        EvalError::Shape {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EvalError::Schema("need at least 2 columns, got 1".to_string());
        assert_eq!(err.to_string(), "Schema error: need at least 2 columns, got 1");
    }

    #[test]
    fn test_model_fault_keeps_source() {
        let err = EvalError::model_fault("KNN", Phase::Test, EvalError::NotFitted);
        assert_eq!(err.to_string(), "Model 'KNN' failed during test");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Model not fitted"));
    }

    #[test]
    fn test_model_fault_chain_names_cause_once() {
        let err = anyhow::Error::from(EvalError::model_fault(
            "KNN",
            Phase::Train,
            EvalError::Computation("singular matrix".to_string()),
        ));
        let chain = format!("{:#}", err);
        assert_eq!(chain, "Model 'KNN' failed during train: Computation error: singular matrix");
        assert_eq!(chain.matches("singular matrix").count(), 1);
    }

    #[test]
    fn test_input_fault_classification() {
        assert!(EvalError::EmptyFeatureSet { rows: 0, cols: 3 }.is_input_fault());
        assert!(!EvalError::NotFitted.is_input_fault());
        assert!(!EvalError::write("out.csv", "denied").is_input_fault());
    }
}
