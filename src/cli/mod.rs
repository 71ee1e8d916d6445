//! evalbench CLI Module
//!
//! Command-line front end: evaluate the configured models or inspect a dataset.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use crate::config::HarnessConfig;
use crate::error::{EvalError, Phase};
use crate::evaluation::{FailurePolicy, ProgressEvent, ProgressSink};
use crate::run::{Run, RunOutcome};
use crate::utils::{clock_time, format_duration, DataLoader};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn fail(s: &str) -> ColoredString   { s.truecolor(230, 110, 110) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv_row(key: &str, val: impl std::fmt::Display) {
    println!("  {:<12} {}", muted(key), val);
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "evalbench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train, time and score classifiers under identical conditions")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate every configured model and write the report (default)
    Run(RunArgs),

    /// Show data information
    Info {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Overrides applied on top of the configuration file or the defaults
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Input CSV file
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Directory for the results CSV and charts
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Share of rows held out for testing
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Keep going when a model faults
    #[arg(long)]
    pub skip_failures: bool,

    /// Do not write or print charts
    #[arg(long)]
    pub no_charts: bool,
}

impl RunArgs {
    /// Resolve the effective configuration
    pub fn into_config(self) -> crate::error::Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_json_file(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(data) = self.data {
            config.data_path = data;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if self.skip_failures {
            config.failure_policy = FailurePolicy::Skip;
        }
        if self.no_charts {
            config.charts = false;
        }
        Ok(config)
    }
}

// ─── Progress ──────────────────────────────────────────────────────────────────

/// Prints evaluation notices in the step/section style
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    line_open: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terminate a step line left open by a phase that never finished
    pub fn close_line(&mut self) {
        if self.line_open {
            println!("{}", fail("failed"));
            self.line_open = false;
        }
    }
}

fn phase_title(phase: Phase) -> &'static str {
    match phase {
        Phase::Train => "Training",
        Phase::Test => "Testing",
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_event(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::ModelStarted { model } => {
                section(&format!("Model: {}", model));
            }
            ProgressEvent::PhaseStarted { phase, at, .. } => {
                step_run(&format!("{} from {}", phase_title(*phase), clock_time(at)));
                self.line_open = true;
            }
            ProgressEvent::PhaseFinished { at, elapsed, .. } => {
                step_done(&format!(
                    "until {} · {}",
                    clock_time(at),
                    format_duration(elapsed.as_secs_f64())
                ));
                self.line_open = false;
            }
            ProgressEvent::ModelSkipped { model, reason } => {
                self.close_line();
                println!("  {} {} {}", fail("✗"), model, dim(reason));
            }
            ProgressEvent::EvaluationFinished { .. } => {
                section("Results");
            }
        }
    }
}

// ─── Run ───────────────────────────────────────────────────────────────────────

pub fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.into_config()?;

    section("Evaluation");
    kv_row("Data", config.data_path.display());
    kv_row("Output", config.output_dir.display());
    kv_row("Seed", config.seed);
    kv_row("Test split", format!("{:.0}%", config.test_fraction * 100.0));
    let names: Vec<String> = config.models.iter().map(|m| m.name()).collect();
    kv_row("Models", if names.is_empty() { "none".to_string() } else { names.join(", ") });

    let mut progress = ConsoleProgress::new();
    let stdout = std::io::stdout();
    let mut console = stdout.lock();

    let outcome = match Run::new(config).execute(&mut progress, &mut console) {
        Ok(outcome) => outcome,
        Err(err) => {
            progress.close_line();
            println!("  {} {}", fail("✗"), failure_hint(&err));
            return Err(err.into());
        }
    };
    drop(console);

    print_summary(&outcome);
    Ok(())
}

/// One-line reading of why a run stopped
fn failure_hint(err: &EvalError) -> &'static str {
    if err.is_input_fault() {
        "Input rejected before any model ran"
    } else if matches!(err, EvalError::ModelFault { .. }) {
        "Model failed; pass --skip-failures to continue past it"
    } else {
        "Run aborted"
    }
}

fn print_summary(outcome: &RunOutcome) {
    println!();
    step_ok(&format!(
        "{} rows · {} features · {} classes · {} train / {} test",
        outcome.n_rows, outcome.n_features, outcome.n_classes, outcome.n_train, outcome.n_test
    ));
    step_ok(&format!("Results saved to {}", outcome.artifacts.results_csv.display()));
    for chart in &outcome.artifacts.charts {
        step_ok(&format!("Chart saved to {}", chart.display()));
    }

    for failure in outcome.table.failures() {
        let phase = failure.phase.map(|p| p.to_string()).unwrap_or_default();
        println!("  {} {} {} {}", fail("skipped"), failure.model, muted(&phase), dim(&failure.message));
    }

    if let Some(best) = outcome.table.best_by_accuracy() {
        println!();
        println!("  {} {} {} {:.4}",
            ok("best"),
            best.name().white().bold(),
            muted("Accuracy:"),
            best.accuracy()
        );
    }

    println!();
}

// ─── Info ──────────────────────────────────────────────────────────────────────

pub fn cmd_info(data_path: &PathBuf) -> anyhow::Result<()> {
    section("Data Info");

    let loader = DataLoader::new();
    let info = loader.file_info(data_path)?;

    kv_row("File", info.path.display());
    kv_row("Size", format!("{:.2} KB", info.file_size as f64 / 1024.0));
    kv_row("Rows", info.n_rows);
    kv_row("Columns", info.n_cols);
    println!();

    let dataset = loader.load(data_path)?;
    let target = dataset.target_column();
    let id = dataset.id_column();

    println!("  {:<20} {:<12} {:>6} {:>8} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"), muted("Role"));
    println!("  {}", dim(&"─".repeat(60)));

    for col in dataset.frame().get_columns() {
        let role = if col.name().as_str() == target {
            "target"
        } else if col.name().as_str() == id {
            "id"
        } else {
            "feature"
        };
        println!(
            "  {:<20} {:<12} {:>6} {:>8} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0),
            role
        );
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args_reproduce_defaults() {
        let config = RunArgs::default().into_config().unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from([
            "evalbench",
            "run",
            "--data",
            "iris.csv",
            "--seed",
            "7",
            "--test-fraction",
            "0.3",
            "--skip-failures",
        ]);
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        let config = args.into_config().unwrap();

        assert_eq!(config.data_path, PathBuf::from("iris.csv"));
        assert_eq!(config.seed, 7);
        assert_eq!(config.test_fraction, 0.3);
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
        assert!(config.charts);
    }

    #[test]
    fn test_failure_hint_wording() {
        let fraction = EvalError::InvalidFraction {
            fraction: 1.5,
            reason: "must lie strictly between 0 and 1".to_string(),
        };
        assert!(failure_hint(&fraction).starts_with("Input rejected"));

        let fault = EvalError::model_fault("KNN", Phase::Test, EvalError::NotFitted);
        assert!(failure_hint(&fault).contains("--skip-failures"));

        assert_eq!(failure_hint(&EvalError::write("out.csv", "denied")), "Run aborted");
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::parse_from(["evalbench"]);
        assert!(cli.command.is_none());
    }
}
