//! evalbench - Model evaluation harness
//!
//! Every candidate classifier goes through the same preprocessing, the same
//! seeded train/test split, the same timing and the same scoring, so the
//! resulting table is a fair, reproducible comparison.
//!
//! # Modules
//!
//! - [`utils`] - CSV loading and saving, timing helpers
//! - [`preprocessing`] - Target encoding, imputation, feature scaling
//! - [`training`] - The [`training::Model`] trait, built-in classifiers, registry, split
//! - [`evaluation`] - Evaluation loop, metrics, result records, progress notices
//! - [`visualization`] - Grouped bar charts (SVG and terminal)
//! - [`report`] - Console table, persisted CSV, charts
//! - [`config`] - Run configuration
//! - [`run`] - End-to-end run
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use evalbench::prelude::*;
//!
//! let config = HarnessConfig::new()
//!     .with_data_path("iris.csv")
//!     .with_model(ModelSpec::new(ModelType::naive_bayes()));
//!
//! let outcome = Run::new(config).execute(&mut SilentProgress, &mut std::io::stdout())?;
//! println!("{} models evaluated", outcome.table.len());
//! # Ok::<(), evalbench::error::EvalError>(())
//! ```

pub mod error;

pub mod preprocessing;
pub mod training;
pub mod evaluation;

pub mod visualization;
pub mod report;
pub mod utils;

pub mod config;
pub mod run;
pub mod cli;

pub use error::{EvalError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::HarnessConfig;
    pub use crate::error::{EvalError, Phase, Result};
    pub use crate::evaluation::{
        ClassificationScores, Evaluator, FailurePolicy, ProgressEvent, ProgressSink,
        RecordingProgress, ResultRecord, ResultTable, SilentProgress,
    };
    pub use crate::preprocessing::{
        DataPreprocessor, ImputeStrategy, PreparedData, PreprocessingConfig, ScalerFit,
        ScalerType,
    };
    pub use crate::report::{ReportArtifacts, Reporter};
    pub use crate::run::{Run, RunOutcome};
    pub use crate::training::{
        train_test_split, Model, ModelRegistry, ModelSpec, ModelType, Split,
    };
    pub use crate::utils::{DataLoader, Dataset};
}
