//! Model evaluation module
//!
//! Every registered model goes through the same steps: timed training, timed
//! inference on the held-out rows and a fixed set of weighted metrics.

mod engine;
pub mod metrics;
mod progress;
mod result;

pub use engine::{Evaluator, FailurePolicy};
pub use metrics::{ClassificationScores, ConfusionMatrix, PerClassMetrics};
pub use progress::{ProgressEvent, ProgressSink, RecordingProgress, SilentProgress};
pub use result::{ModelFailure, ResultRecord, ResultTable, SCORE_DECIMALS, TIME_DECIMALS};
