//! Data loading utilities

use crate::error::{EvalError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Rows used to infer column types when reading CSV
const INFER_SCHEMA_ROWS: usize = 1000;

/// In-memory tabular dataset.
///
/// Column 0 is an identifier, the last column is the class label and every
/// column in between is a feature.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    source: PathBuf,
}

impl Dataset {
    /// Wrap a frame, checking that it has at least one column besides the label
    pub fn new(frame: DataFrame, source: impl Into<PathBuf>) -> Result<Self> {
        if frame.width() < 2 {
            return Err(EvalError::Schema(format!(
                "need at least 2 columns (features + target), got {}",
                frame.width()
            )));
        }
        Ok(Self {
            frame,
            source: source.into(),
        })
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns, identifier and target included
    pub fn n_columns(&self) -> usize {
        self.frame.width()
    }

    /// Path the dataset was read from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Underlying frame
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Name of the identifier column
    pub fn id_column(&self) -> String {
        self.column_names().remove(0)
    }

    /// Names of the feature columns, in file order
    pub fn feature_columns(&self) -> Vec<String> {
        let names = self.column_names();
        let last = names.len() - 1;
        names[1..last].to_vec()
    }

    /// Name of the target column
    pub fn target_column(&self) -> String {
        let mut names = self.column_names();
        names.pop().unwrap_or_default()
    }

    /// Materialized series for a column
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|c| c.as_materialized_series())
            .map_err(|_| EvalError::Schema(format!("column '{}' not found", name)))
    }
}

/// File information gathered without building a dataset
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<String>,
}

/// Data loader for CSV sources
#[derive(Debug, Default, Clone, Copy)]
pub struct DataLoader;

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self
    }

    /// Read a CSV file into a frame
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let not_found = |reason: String| EvalError::DataNotFound {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| not_found(e.to_string()))?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| not_found(e.to_string()))
    }

    /// Load a dataset, validating its shape
    pub fn load(&self, path: &Path) -> Result<Dataset> {
        let frame = self.load_csv(path)?;
        let dataset = Dataset::new(frame, path)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.n_rows(),
            columns = dataset.n_columns(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Get file info without loading full data
    pub fn file_info(&self, path: &Path) -> Result<FileInfo> {
        let not_found = |reason: String| EvalError::DataNotFound {
            path: path.to_path_buf(),
            reason,
        };

        let metadata = std::fs::metadata(path).map_err(|e| not_found(e.to_string()))?;
        let file = File::open(path).map_err(|e| not_found(e.to_string()))?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next()
            .transpose()
            .map_err(|e| not_found(e.to_string()))?
            .unwrap_or_default();

        let columns: Vec<String> = header
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let n_rows = lines
            .map_while(|l| l.ok())
            .filter(|l| !l.trim().is_empty())
            .count();

        Ok(FileInfo {
            path: path.to_path_buf(),
            file_size: metadata.len(),
            n_rows,
            n_cols: columns.len(),
            columns,
        })
    }
}

/// Persist frames to disk
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV with a header row
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EvalError::write(path, e))?;
        }

        let mut file = File::create(path).map_err(|e| EvalError::write(path, e))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| EvalError::write(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_load_dataset() {
        let file = create_test_csv(&["id,a,b,label", "1,0.5,2,x", "2,1.5,3,y", "3,2.5,4,x"]);
        let dataset = DataLoader::new().load(file.path()).unwrap();

        assert_eq!(dataset.n_rows(), 3);
        assert_eq!(dataset.n_columns(), 4);
        assert_eq!(dataset.id_column(), "id");
        assert_eq!(dataset.feature_columns(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(dataset.target_column(), "label");
    }

    #[test]
    fn test_missing_file_is_data_not_found() {
        let result = DataLoader::new().load(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(EvalError::DataNotFound { .. })));
    }

    #[test]
    fn test_single_column_is_schema_error() {
        let file = create_test_csv(&["label", "x", "y"]);
        let result = DataLoader::new().load(file.path());
        assert!(matches!(result, Err(EvalError::Schema(_))));
    }

    #[test]
    fn test_two_columns_have_no_features() {
        let file = create_test_csv(&["id,label", "1,x", "2,y"]);
        let dataset = DataLoader::new().load(file.path()).unwrap();
        assert!(dataset.feature_columns().is_empty());
    }

    #[test]
    fn test_file_info() {
        let file = create_test_csv(&["id,a,label", "1,2,x", "2,3,y"]);
        let info = DataLoader::new().file_info(file.path()).unwrap();

        assert_eq!(info.n_rows, 2);
        assert_eq!(info.n_cols, 3);
        assert_eq!(info.columns, vec!["id", "a", "label"]);
    }

    #[test]
    fn test_save_csv_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut df = DataFrame::new(vec![
            Column::new("a".into(), &[1, 2, 3]),
            Column::new("b".into(), &[4, 5, 6]),
        ])
        .unwrap();

        DataSaver::save_csv(&mut df, &path).unwrap();

        let loaded = DataLoader::new().load_csv(&path).unwrap();
        assert_eq!(loaded.height(), 3);
        assert_eq!(loaded.width(), 2);
    }
}
