//! Data preprocessing module
//!
//! Fit-once / transform-many stages applied identically for every model:
//! - Target label encoding
//! - Ordinal encoding of categorical features
//! - Optional missing value imputation
//! - Feature scaling (standard, min-max)

mod config;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use config::{PreprocessingConfig, ScalerFit};
pub use encoder::LabelEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::{DataPreprocessor, PreparedData};
pub use scaler::{Scaler, ScalerType};

use serde::{Deserialize, Serialize};

/// Column data type for preprocessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
}
