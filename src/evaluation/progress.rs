//! Progress notifications emitted by the evaluation loop

use crate::error::Phase;
use chrono::{DateTime, Local};
use std::time::Duration;

/// One notice from the evaluation loop
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A model is about to be evaluated
    ModelStarted { model: String },
    /// `fit` or `predict` is about to be called
    PhaseStarted {
        model: String,
        phase: Phase,
        at: DateTime<Local>,
    },
    /// `fit` or `predict` returned successfully
    PhaseFinished {
        model: String,
        phase: Phase,
        at: DateTime<Local>,
        elapsed: Duration,
    },
    /// A faulting model was dropped under the skip policy
    ModelSkipped { model: String, reason: String },
    /// Every registered model has been evaluated or skipped
    EvaluationFinished { evaluated: usize, skipped: usize },
}

/// Receiver for progress notices
pub trait ProgressSink {
    fn on_event(&mut self, event: &ProgressEvent);
}

/// Discards every notice
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn on_event(&mut self, _event: &ProgressEvent) {}
}

/// Keeps every notice in arrival order
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    events: Vec<ProgressEvent>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    /// Models in the order they were started
    pub fn started_models(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::ModelStarted { model } => Some(model.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn on_event(&mut self, event: &ProgressEvent) {
        self.events.push(event.clone());
    }
}
