//! Visualization module: comparison charts for evaluated models.

pub mod bar_chart;
pub use bar_chart::{BarChart, ChartSeries};
