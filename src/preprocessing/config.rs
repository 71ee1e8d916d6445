//! Preprocessing configuration

use super::{ImputeStrategy, ScalerType};
use serde::{Deserialize, Serialize};

/// Which rows the feature scaler is fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerFit {
    /// Fit on every row before splitting
    #[default]
    Combined,
    /// Fit on the training partition only, apply to both partitions
    TrainOnly,
}

/// Configuration for data preprocessing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Type of scaler to use for features
    pub scaler_type: ScalerType,

    /// Rows the scaler is fitted on
    pub scaler_fit: ScalerFit,

    /// Strategy for missing feature values; `None` rejects them
    pub impute_strategy: Option<ImputeStrategy>,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            scaler_type: ScalerType::Standard,
            scaler_fit: ScalerFit::Combined,
            impute_strategy: None,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set scaler type
    pub fn with_scaler(mut self, scaler_type: ScalerType) -> Self {
        self.scaler_type = scaler_type;
        self
    }

    /// Builder method to set the scaler fit scope
    pub fn with_scaler_fit(mut self, scaler_fit: ScalerFit) -> Self {
        self.scaler_fit = scaler_fit;
        self
    }

    /// Builder method to enable imputation
    pub fn with_imputation(mut self, strategy: ImputeStrategy) -> Self {
        self.impute_strategy = Some(strategy);
        self
    }
}
