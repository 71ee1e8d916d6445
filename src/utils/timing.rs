//! Wall-clock instrumentation and formatting helpers

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Format an elapsed duration with an adaptive unit.
///
/// Below one second the value is shown in milliseconds, below one minute in
/// seconds, otherwise as whole minutes plus seconds.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.2} ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.2} s", seconds)
    } else {
        let minutes = (seconds / 60.0).floor();
        let rest = seconds - minutes * 60.0;
        format!("{:.0} min {:.2} s", minutes, rest)
    }
}

/// Render a wall-clock timestamp as `HH:MM:SS`
pub fn clock_time(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Round `value` to `decimals` decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Monotonic timer paired with the wall-clock time it was started at
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started_at: DateTime<Local>,
    start: Instant,
}

impl Stopwatch {
    /// Start a new stopwatch
    pub fn start() -> Self {
        Self {
            started_at: Local::now(),
            start: Instant::now(),
        }
    }

    /// Wall-clock time at which the stopwatch was started
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Elapsed monotonic time since start
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
