//! The evaluation loop

use super::metrics::ClassificationScores;
use super::progress::{ProgressEvent, ProgressSink};
use super::result::{ModelFailure, ResultRecord, ResultTable};
use crate::error::{EvalError, Phase, Result};
use crate::training::{Model, ModelRegistry, Split};
use crate::utils::Stopwatch;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What to do when a model faults during fit or predict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the run and surface the fault
    #[default]
    Abort,
    /// Log the fault, record it and move on to the next model
    Skip,
}

/// Runs every registered model through identical fit/predict/score steps
pub struct Evaluator<'a> {
    policy: FailurePolicy,
    progress: &'a mut dyn ProgressSink,
}

impl<'a> Evaluator<'a> {
    pub fn new(progress: &'a mut dyn ProgressSink) -> Self {
        Self {
            policy: FailurePolicy::default(),
            progress,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Evaluate models sequentially in registry order, consuming the registry
    pub fn evaluate(&mut self, registry: ModelRegistry, split: &Split) -> Result<ResultTable> {
        info!(
            models = registry.len(),
            train_rows = split.n_train(),
            test_rows = split.n_test(),
            "Starting model evaluation"
        );

        let mut table = ResultTable::new();
        for (name, mut model) in registry {
            match self.evaluate_model(&name, model.as_mut(), split) {
                Ok(record) => table.push(record),
                Err(err) => match self.policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::Skip => {
                        let failure = ModelFailure::from_error(&name, &err);
                        warn!(model = %name, error = %failure.message, "Skipping model");
                        self.progress.on_event(&ProgressEvent::ModelSkipped {
                            model: name.clone(),
                            reason: failure.message.clone(),
                        });
                        table.record_failure(failure);
                    }
                },
            }
        }

        info!(
            evaluated = table.len(),
            skipped = table.failures().len(),
            "Model evaluation complete"
        );
        self.progress.on_event(&ProgressEvent::EvaluationFinished {
            evaluated: table.len(),
            skipped: table.failures().len(),
        });
        Ok(table)
    }

    /// Train, time, predict and score a single model
    pub fn evaluate_model(
        &mut self,
        name: &str,
        model: &mut dyn Model,
        split: &Split,
    ) -> Result<ResultRecord> {
        self.progress.on_event(&ProgressEvent::ModelStarted {
            model: name.to_string(),
        });

        let ((), train_time) = self.timed(name, Phase::Train, || {
            model.fit(&split.x_train, &split.y_train)
        })?;

        let (y_pred, test_time) = self.timed(name, Phase::Test, || model.predict(&split.x_test))?;

        if y_pred.len() != split.y_test.len() {
            return Err(EvalError::model_fault(
                name,
                Phase::Test,
                EvalError::Shape {
                    expected: format!("{} predictions", split.y_test.len()),
                    actual: format!("{} predictions", y_pred.len()),
                },
            ));
        }

        if let Some(&label) = y_pred.iter().find(|&&p| !split.is_known_class(p)) {
            return Err(EvalError::model_fault(
                name,
                Phase::Test,
                EvalError::Shape {
                    expected: format!("class codes below {}", split.n_classes),
                    actual: format!("class code {}", label),
                },
            ));
        }

        let scores = ClassificationScores::compute(
            &split.y_test.to_vec(),
            &y_pred.to_vec(),
        )?;

        let record = ResultRecord::new(
            name,
            scores,
            train_time.as_secs_f64(),
            test_time.as_secs_f64(),
        );
        debug!(
            model = name,
            accuracy = record.accuracy(),
            f1 = record.f1(),
            "Model scored"
        );
        Ok(record)
    }

    /// Bracket one phase with progress notices and wall-clock timing
    fn timed<T>(
        &mut self,
        name: &str,
        phase: Phase,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<(T, Duration)> {
        let watch = Stopwatch::start();
        self.progress.on_event(&ProgressEvent::PhaseStarted {
            model: name.to_string(),
            phase,
            at: watch.started_at(),
        });

        let value = f().map_err(|e| EvalError::model_fault(name, phase, e))?;
        let elapsed = watch.elapsed();

        self.progress.on_event(&ProgressEvent::PhaseFinished {
            model: name.to_string(),
            phase,
            at: Local::now(),
            elapsed,
        });
        debug!(model = name, %phase, seconds = elapsed.as_secs_f64(), "Phase finished");

        Ok((value, elapsed))
    }
}
