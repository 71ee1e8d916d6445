//! Run configuration
//!
//! Defaults reproduce the reference run: `dataset.csv` in the working
//! directory, seed 62, a 20% test partition and a single KNN model.

use crate::error::{EvalError, Result};
use crate::evaluation::FailurePolicy;
use crate::preprocessing::PreprocessingConfig;
use crate::training::{ModelSpec, ModelType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Everything a run needs besides the data itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// CSV file to evaluate on
    pub data_path: PathBuf,

    /// Directory receiving the results CSV and charts
    pub output_dir: PathBuf,

    /// Seed for the train/test shuffle
    pub seed: u64,

    /// Share of rows held out for testing, in (0, 1)
    pub test_fraction: f64,

    pub preprocessing: PreprocessingConfig,

    /// Models to evaluate, in report order
    pub models: Vec<ModelSpec>,

    pub failure_policy: FailurePolicy,

    /// Write SVG charts and print terminal charts
    pub charts: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("dataset.csv"),
            output_dir: PathBuf::from("."),
            seed: 62,
            test_fraction: 0.2,
            preprocessing: PreprocessingConfig::default(),
            models: vec![ModelSpec::new(ModelType::knn())],
            failure_policy: FailurePolicy::Abort,
            charts: true,
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    /// Replace the model list
    pub fn with_models(mut self, models: Vec<ModelSpec>) -> Self {
        self.models = models;
        self
    }

    /// Append one model to the list
    pub fn with_model(mut self, model: ModelSpec) -> Self {
        self.models.push(model);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_charts(mut self, charts: bool) -> Self {
        self.charts = charts;
        self
    }

    /// Load from a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EvalError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check values that can be judged without the data
    pub fn validate(&self) -> Result<()> {
        if !self.test_fraction.is_finite() || self.test_fraction <= 0.0 || self.test_fraction >= 1.0 {
            return Err(EvalError::InvalidFraction {
                fraction: self.test_fraction,
                reason: "must lie strictly between 0 and 1".to_string(),
            });
        }

        if self.data_path.as_os_str().is_empty() {
            return Err(EvalError::Config("data_path is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for spec in &self.models {
            let name = spec.name();
            if !seen.insert(name.clone()) {
                return Err(EvalError::Config(format!(
                    "model name '{}' is used more than once",
                    name
                )));
            }
        }
        Ok(())
    }
}
