//! Grouped bar charts, rendered as SVG files and as terminal text.

use crate::error::{EvalError, Result};
use crate::evaluation::ResultTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 150.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const Y_TICKS: usize = 5;

const PALETTE: [&str; 6] = [
    "#4C72B0", "#DD8452", "#55A868", "#C44E52", "#8172B3", "#937860",
];

/// One metric plotted across every category
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<f64>,
}

/// Grouped bar chart: one group per category, one bar per series
#[derive(Debug, Clone)]
pub struct BarChart {
    title: String,
    y_label: String,
    categories: Vec<String>,
    series: Vec<ChartSeries>,
    y_max: Option<f64>,
}

impl BarChart {
    pub fn new(title: impl Into<String>, y_label: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            categories,
            series: Vec::new(),
            y_max: None,
        }
    }

    /// Add a series; missing values are drawn as zero
    pub fn with_series(mut self, label: impl Into<String>, values: Vec<f64>) -> Self {
        self.series.push(ChartSeries {
            label: label.into(),
            values,
        });
        self
    }

    /// Fix the top of the value axis instead of deriving it from the data
    pub fn with_y_max(mut self, y_max: f64) -> Self {
        self.y_max = Some(y_max);
        self
    }

    /// Accuracy, F1, recall and precision per model
    pub fn performance(table: &ResultTable) -> Self {
        let records = table.records();
        let column = |i: usize| records.iter().map(|r| r.scores()[i]).collect::<Vec<_>>();

        Self::new("Model Performance Comparison", "Score", names(table))
            .with_series("Accuracy", column(0))
            .with_series("F1", column(1))
            .with_series("Recall", column(2))
            .with_series("Precision", column(3))
            .with_y_max(1.0)
    }

    /// Train and test wall-clock seconds per model
    pub fn timing(table: &ResultTable) -> Self {
        let records = table.records();
        let column = |i: usize| records.iter().map(|r| r.timings()[i]).collect::<Vec<_>>();

        Self::new("Execution Time by Model", "Seconds", names(table))
            .with_series("Train Time", column(0))
            .with_series("Test Time", column(1))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn series(&self) -> &[ChartSeries] {
        &self.series
    }

    fn value(&self, series: usize, category: usize) -> f64 {
        self.series[series]
            .values
            .get(category)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
            .max(0.0)
    }

    fn axis_max(&self) -> f64 {
        if let Some(max) = self.y_max.filter(|m| *m > 0.0) {
            return max;
        }
        let max = (0..self.series.len())
            .flat_map(|s| (0..self.categories.len()).map(move |c| (s, c)))
            .map(|(s, c)| self.value(s, c))
            .fold(0.0f64, f64::max);
        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }

    /// Write the chart as a standalone SVG document
    pub fn render_svg<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let base_y = MARGIN_TOP + plot_h;
        let y_max = self.axis_max();

        writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            writer,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" style="background-color: white;">"#
        )?;
        writeln!(writer, r#"<style type="text/css">"#)?;
        writeln!(writer, ".title {{ font: bold 18px sans-serif; }}")?;
        writeln!(writer, ".axis {{ font: 12px sans-serif; fill: #333; }}")?;
        writeln!(writer, ".grid {{ stroke: #ddd; stroke-width: 1; }}")?;
        writeln!(writer, "</style>")?;

        writeln!(
            writer,
            r#"<text x="{:.1}" y="30" class="title" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            escape_xml(&self.title)
        )?;

        // Value axis with gridlines
        for tick in 0..=Y_TICKS {
            let value = y_max * tick as f64 / Y_TICKS as f64;
            let y = base_y - plot_h * tick as f64 / Y_TICKS as f64;
            writeln!(
                writer,
                r#"<line class="grid" x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}"/>"#,
                MARGIN_LEFT + plot_w
            )?;
            writeln!(
                writer,
                r#"<text class="axis" x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
                MARGIN_LEFT - 6.0,
                y + 4.0,
                tick_label(value)
            )?;
        }
        writeln!(
            writer,
            r#"<text class="axis" x="18" y="{:.1}" text-anchor="middle" transform="rotate(-90 18 {:.1})">{}</text>"#,
            MARGIN_TOP + plot_h / 2.0,
            MARGIN_TOP + plot_h / 2.0,
            escape_xml(&self.y_label)
        )?;
        writeln!(
            writer,
            r##"<line x1="{MARGIN_LEFT}" y1="{base_y:.1}" x2="{:.1}" y2="{base_y:.1}" stroke="#333"/>"##,
            MARGIN_LEFT + plot_w
        )?;

        if self.categories.is_empty() {
            writeln!(
                writer,
                r#"<text class="axis" x="{:.1}" y="{:.1}" text-anchor="middle">No results</text>"#,
                MARGIN_LEFT + plot_w / 2.0,
                MARGIN_TOP + plot_h / 2.0
            )?;
        } else {
            let group_w = plot_w / self.categories.len() as f64;
            let bar_w = group_w * 0.8 / self.series.len().max(1) as f64;

            for (c, category) in self.categories.iter().enumerate() {
                let group_x = MARGIN_LEFT + group_w * c as f64 + group_w * 0.1;
                for s in 0..self.series.len() {
                    let value = self.value(s, c);
                    let h = (value / y_max).min(1.0) * plot_h;
                    writeln!(
                        writer,
                        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{}: {}</title></rect>"#,
                        group_x + bar_w * s as f64,
                        base_y - h,
                        bar_w,
                        h,
                        PALETTE[s % PALETTE.len()],
                        escape_xml(&self.series[s].label),
                        value
                    )?;
                }
                writeln!(
                    writer,
                    r#"<text class="axis category" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                    MARGIN_LEFT + group_w * (c as f64 + 0.5),
                    base_y + 20.0,
                    escape_xml(category)
                )?;
            }
        }

        // Legend
        let legend_x = WIDTH - MARGIN_RIGHT + 15.0;
        for (s, series) in self.series.iter().enumerate() {
            let y = MARGIN_TOP + 20.0 * s as f64;
            writeln!(
                writer,
                r#"<rect x="{legend_x:.1}" y="{y:.1}" width="12" height="12" fill="{}"/>"#,
                PALETTE[s % PALETTE.len()]
            )?;
            writeln!(
                writer,
                r#"<text class="axis" x="{:.1}" y="{:.1}">{}</text>"#,
                legend_x + 18.0,
                y + 10.0,
                escape_xml(&series.label)
            )?;
        }

        writeln!(writer, "</svg>")
    }

    /// SVG document as a string
    pub fn to_svg(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.render_svg(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Write the SVG document to `path`
    pub fn save_svg(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| EvalError::write(path, e))?;
        let mut writer = BufWriter::new(file);
        self.render_svg(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| EvalError::write(path, e))
    }

    /// Horizontal block bars for the terminal, one block per category
    pub fn render_terminal(&self, bar_width: usize) -> String {
        let mut output = format!("{} ({})\n", self.title, self.y_label);
        if self.categories.is_empty() {
            output.push_str("  No results\n");
            return output;
        }

        let y_max = self.axis_max();
        let label_len = self.series.iter().map(|s| s.label.len()).max().unwrap_or(0);

        for (c, category) in self.categories.iter().enumerate() {
            output.push_str(&format!("  {category}\n"));
            for (s, series) in self.series.iter().enumerate() {
                let value = self.value(s, c);
                let bar_len = ((value / y_max).min(1.0) * bar_width as f64).round() as usize;
                output.push_str(&format!(
                    "    {:label_len$}  {:bar_width$}  {}\n",
                    series.label,
                    "█".repeat(bar_len),
                    tick_label(value),
                ));
            }
        }
        output
    }
}

fn names(table: &ResultTable) -> Vec<String> {
    table.names().into_iter().map(String::from).collect()
}

fn tick_label(value: f64) -> String {
    if value == 0.0 || value >= 1.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.4}", value)
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
