//! Utility functions and types

pub mod data_loader;
pub mod timing;

pub use data_loader::{DataLoader, DataSaver, Dataset, FileInfo};
pub use timing::{clock_time, format_duration, round_to, Stopwatch};
