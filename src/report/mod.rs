//! Result aggregation and reporting
//!
//! Turns a [`ResultTable`] into the console table, the persisted CSV and the
//! two comparison charts. The console table is always written before any file
//! is touched, so a persistence fault still leaves the results on screen.

use crate::error::{EvalError, Result};
use crate::evaluation::ResultTable;
use crate::utils::DataSaver;
use crate::visualization::BarChart;
use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the persisted result table
pub const RESULTS_FILE: &str = "model_results_with_time.csv";
/// File name of the quality chart
pub const PERFORMANCE_CHART_FILE: &str = "model_performance.svg";
/// File name of the timing chart
pub const TIMING_CHART_FILE: &str = "model_timing.svg";

/// Column headers shared by the console table and the CSV
pub const RESULT_COLUMNS: [&str; 7] = [
    "Model",
    "Accuracy",
    "F1",
    "Recall",
    "Precision",
    "TrainTime",
    "TestTime",
];

const TERMINAL_BAR_WIDTH: usize = 40;

/// Files produced by a report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifacts {
    pub rows: usize,
    pub results_csv: PathBuf,
    pub charts: Vec<PathBuf>,
}

/// Writes the console table, the CSV and the charts for a result table
#[derive(Debug, Clone)]
pub struct Reporter {
    output_dir: PathBuf,
    charts: bool,
}

impl Reporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            charts: true,
        }
    }

    /// Enable or disable SVG and terminal charts
    pub fn with_charts(mut self, charts: bool) -> Self {
        self.charts = charts;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(RESULTS_FILE)
    }

    /// Print, persist and chart the table
    pub fn aggregate<W: Write + ?Sized>(
        &self,
        table: &ResultTable,
        console: &mut W,
    ) -> Result<ReportArtifacts> {
        console
            .write_all(render_table(table).as_bytes())
            .and_then(|_| console.flush())
            .map_err(|e| EvalError::write("<console>", e))?;

        let results_csv = self.results_path();
        let mut frame = results_frame(table)?;
        DataSaver::save_csv(&mut frame, &results_csv)?;
        info!(path = %results_csv.display(), rows = table.len(), "Results saved");

        let mut charts = Vec::new();
        if self.charts {
            let rendered = [
                (BarChart::performance(table), PERFORMANCE_CHART_FILE),
                (BarChart::timing(table), TIMING_CHART_FILE),
            ];
            for (chart, file) in &rendered {
                let path = self.output_dir.join(file);
                chart.save_svg(&path)?;
                info!(path = %path.display(), "Chart saved");
                charts.push(path);
            }

            for (chart, _) in &rendered {
                writeln!(console)
                    .and_then(|_| console.write_all(chart.render_terminal(TERMINAL_BAR_WIDTH).as_bytes()))
                    .map_err(|e| EvalError::write("<console>", e))?;
            }
        }

        Ok(ReportArtifacts {
            rows: table.len(),
            results_csv,
            charts,
        })
    }
}

/// Result table as a frame with the fixed report columns
pub fn results_frame(table: &ResultTable) -> Result<DataFrame> {
    let records = table.records();
    let names: Vec<&str> = table.names();
    let score = |i: usize| records.iter().map(|r| r.scores()[i]).collect::<Vec<f64>>();
    let time = |i: usize| records.iter().map(|r| r.timings()[i]).collect::<Vec<f64>>();

    let frame = DataFrame::new(vec![
        Column::new(RESULT_COLUMNS[0].into(), names),
        Column::new(RESULT_COLUMNS[1].into(), score(0)),
        Column::new(RESULT_COLUMNS[2].into(), score(1)),
        Column::new(RESULT_COLUMNS[3].into(), score(2)),
        Column::new(RESULT_COLUMNS[4].into(), score(3)),
        Column::new(RESULT_COLUMNS[5].into(), time(0)),
        Column::new(RESULT_COLUMNS[6].into(), time(1)),
    ])?;
    Ok(frame)
}

/// Fixed-column plain-text table, one row per record
pub fn render_table(table: &ResultTable) -> String {
    let name_width = table
        .names()
        .iter()
        .map(|n| n.chars().count())
        .chain(std::iter::once(RESULT_COLUMNS[0].len()))
        .max()
        .unwrap_or(5);

    let mut out = format!("{:<name_width$}", RESULT_COLUMNS[0]);
    for header in &RESULT_COLUMNS[1..] {
        out.push_str(&format!(" {:>10}", header));
    }
    out.push('\n');

    for record in table.records() {
        out.push_str(&format!("{:<name_width$}", record.name()));
        for score in record.scores() {
            out.push_str(&format!(" {:>10.4}", score));
        }
        for time in record.timings() {
            out.push_str(&format!(" {:>10.2}", time));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{ClassificationScores, ResultRecord};

    fn table() -> ResultTable {
        let mut table = ResultTable::new();
        table.push(ResultRecord::new(
            "KNN",
            ClassificationScores {
                accuracy: 0.9667,
                f1: 0.9665,
                recall: 0.9667,
                precision: 0.9694,
            },
            0.01,
            0.25,
        ));
        table
    }

    #[test]
    fn test_render_table() {
        let text = render_table(&table());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Model"));
        assert!(lines[0].ends_with("TestTime"));
        assert!(lines[1].starts_with("KNN"));
        assert!(lines[1].contains("0.9694"));
        assert!(lines[1].ends_with("0.25"));
    }

    #[test]
    fn test_results_frame_columns() {
        let frame = results_frame(&table()).unwrap();
        let names: Vec<String> = frame
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, RESULT_COLUMNS);
        assert_eq!(frame.height(), 1);
    }

    #[test]
    fn test_aggregate_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Vec::new();
        let artifacts = Reporter::new(dir.path())
            .aggregate(&table(), &mut console)
            .unwrap();

        assert_eq!(artifacts.rows, 1);
        assert!(artifacts.results_csv.exists());
        assert_eq!(artifacts.charts.len(), 2);
        assert!(artifacts.charts.iter().all(|p| p.exists()));

        let text = String::from_utf8(console).unwrap();
        assert!(text.starts_with("Model"));
        assert!(text.contains("Model Performance Comparison"));
    }

    #[test]
    fn test_charts_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Reporter::new(dir.path())
            .with_charts(false)
            .aggregate(&table(), &mut std::io::sink())
            .unwrap();

        assert!(artifacts.charts.is_empty());
        assert!(!dir.path().join(PERFORMANCE_CHART_FILE).exists());
    }

    #[test]
    fn test_unwritable_output_is_write_error_after_console() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let mut console = Vec::new();
        let result = Reporter::new(blocker.join("out")).aggregate(&table(), &mut console);

        assert!(matches!(result, Err(EvalError::Write { .. })));
        assert!(String::from_utf8(console).unwrap().contains("KNN"));
    }
}
