//! Data preprocessing pipeline

use super::{
    config::{PreprocessingConfig, ScalerFit},
    encoder::LabelEncoder,
    imputer::Imputer,
    scaler::{Scaler, ScalerType},
    ColumnType,
};
use crate::error::{EvalError, Result};
use crate::utils::Dataset;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use std::collections::HashMap;
use std::time::Instant;

/// Features and encoded target ready for splitting
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Feature matrix, one row per dataset row
    pub features: Array2<f64>,
    /// Encoded class labels
    pub labels: Array1<usize>,
    /// Feature column names, in matrix column order
    pub feature_names: Vec<String>,
    /// Encoder fitted on the target column
    pub target_encoder: LabelEncoder,
    /// Whether `features` has already been scaled
    pub scaled: bool,
}

impl PreparedData {
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.target_encoder.n_classes()
    }
}

/// Turns a [`Dataset`] into a numeric feature matrix and encoded target
#[derive(Debug, Clone)]
pub struct DataPreprocessor {
    config: PreprocessingConfig,
    column_types: Vec<(String, ColumnType)>,
    feature_encoders: HashMap<String, LabelEncoder>,
    is_fitted: bool,
}

impl Default for DataPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPreprocessor {
    /// Create a new preprocessor with default configuration
    pub fn new() -> Self {
        Self::with_config(PreprocessingConfig::default())
    }

    /// Create a new preprocessor with custom configuration
    pub fn with_config(config: PreprocessingConfig) -> Self {
        Self {
            config,
            column_types: Vec::new(),
            feature_encoders: HashMap::new(),
            is_fitted: false,
        }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Detected type of each feature column
    pub fn column_types(&self) -> &[(String, ColumnType)] {
        &self.column_types
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Encode the target, build the feature matrix, impute and scale.
    ///
    /// Scaling happens here only when the scaler is fitted on combined rows;
    /// with [`ScalerFit::TrainOnly`] the returned matrix is unscaled.
    pub fn fit_transform(&mut self, dataset: &Dataset) -> Result<PreparedData> {
        let start = Instant::now();

        let (labels, target_encoder) = Self::encode_target(dataset)?;
        let feature_names = dataset.feature_columns();
        let mut features = self.feature_matrix(dataset, &feature_names)?;

        if features.nrows() == 0 || features.ncols() == 0 {
            return Err(EvalError::EmptyFeatureSet {
                rows: features.nrows(),
                cols: features.ncols(),
            });
        }

        match self.config.impute_strategy {
            Some(strategy) => {
                features = Imputer::new(strategy).fit_transform(&features)?;
            }
            None => check_missing(&features, &feature_names)?,
        }

        let scaled = self.config.scaler_fit == ScalerFit::Combined
            && self.config.scaler_type != ScalerType::None;
        if scaled {
            features = Scaler::new(self.config.scaler_type).fit_transform(&features)?;
        }

        self.is_fitted = true;

        tracing::debug!(
            seconds = start.elapsed().as_secs_f64(),
            rows = features.nrows(),
            features = features.ncols(),
            classes = target_encoder.n_classes(),
            scaled,
            "Preprocessing complete"
        );

        Ok(PreparedData {
            features,
            labels,
            feature_names,
            target_encoder,
            scaled,
        })
    }

    /// Fit a label encoder on the target column and encode it
    pub fn encode_target(dataset: &Dataset) -> Result<(Array1<usize>, LabelEncoder)> {
        let name = dataset.target_column();
        let series = dataset.series(&name)?.cast(&DataType::String)?;

        let labels = series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.map(str::to_string).ok_or_else(|| {
                    EvalError::Schema(format!(
                        "target column '{}' has a missing value at row {}",
                        name, row
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut encoder = LabelEncoder::new();
        let codes = encoder.fit_transform(&labels)?;
        Ok((codes, encoder))
    }

    /// Build the raw feature matrix; missing cells become NaN
    fn feature_matrix(&mut self, dataset: &Dataset, names: &[String]) -> Result<Array2<f64>> {
        self.column_types.clear();
        self.feature_encoders.clear();

        let columns = names
            .iter()
            .map(|name| self.column_values(name, dataset.series(name)?))
            .collect::<Result<Vec<_>>>()?;

        let n_rows = dataset.n_rows();
        Ok(Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| columns[j][i]))
    }

    fn column_values(&mut self, name: &str, series: &Series) -> Result<Vec<f64>> {
        if is_numeric_dtype(series.dtype()) {
            self.column_types.push((name.to_string(), ColumnType::Numeric));
            let values = series.cast(&DataType::Float64)?;
            return Ok(values
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect());
        }

        // Anything else is treated as categorical and ordinal-encoded
        self.column_types.push((name.to_string(), ColumnType::Categorical));
        let strings = series.cast(&DataType::String)?;
        let values: Vec<Option<&str>> = strings.str()?.into_iter().collect();
        let present: Vec<&str> = values.iter().flatten().copied().collect();

        let mut encoder = LabelEncoder::new();
        encoder.fit(&present)?;
        let codes = encoder.transform(&present)?;
        self.feature_encoders.insert(name.to_string(), encoder);

        let mut codes = codes.into_iter();
        Ok(values
            .iter()
            .map(|v| match v {
                Some(_) => codes.next().map(|c| c as f64).unwrap_or(f64::NAN),
                None => f64::NAN,
            })
            .collect())
    }
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

fn check_missing(features: &Array2<f64>, names: &[String]) -> Result<()> {
    for (column, name) in features.axis_iter(Axis(1)).zip(names) {
        if column.iter().any(|v| v.is_nan()) {
            return Err(EvalError::MissingValues {
                column: name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::ImputeStrategy;

    fn dataset() -> Dataset {
        let frame = DataFrame::new(vec![
            Column::new("id".into(), &[1i64, 2, 3, 4]),
            Column::new("x".into(), &[1.0f64, 2.0, 3.0, 4.0]),
            Column::new("color".into(), &["red", "blue", "red", "green"]),
            Column::new("label".into(), &["a", "b", "a", "b"]),
        ])
        .unwrap();
        Dataset::new(frame, "memory").unwrap()
    }

    #[test]
    fn test_fit_transform_shapes() {
        let mut preprocessor = DataPreprocessor::new();
        let prepared = preprocessor.fit_transform(&dataset()).unwrap();

        assert_eq!(prepared.n_samples(), 4);
        assert_eq!(prepared.n_features(), 2);
        assert_eq!(prepared.n_classes(), 2);
        assert_eq!(prepared.feature_names, vec!["x", "color"]);
        assert_eq!(prepared.labels.to_vec(), vec![0, 1, 0, 1]);
        assert!(prepared.scaled);
        assert_eq!(
            preprocessor.column_types()[1],
            ("color".to_string(), ColumnType::Categorical)
        );
    }

    #[test]
    fn test_train_only_leaves_features_unscaled() {
        let config = PreprocessingConfig::new().with_scaler_fit(ScalerFit::TrainOnly);
        let mut preprocessor = DataPreprocessor::with_config(config);
        let prepared = preprocessor.fit_transform(&dataset()).unwrap();

        assert!(!prepared.scaled);
        assert_eq!(prepared.features.column(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_missing_feature_without_imputer() {
        let frame = DataFrame::new(vec![
            Column::new("id".into(), &[1i64, 2, 3]),
            Column::new("x".into(), &[Some(1.0f64), None, Some(3.0)]),
            Column::new("label".into(), &["a", "b", "a"]),
        ])
        .unwrap();
        let dataset = Dataset::new(frame, "memory").unwrap();

        let result = DataPreprocessor::new().fit_transform(&dataset);
        assert!(matches!(result, Err(EvalError::MissingValues { column }) if column == "x"));
    }

    #[test]
    fn test_missing_feature_with_imputer() {
        let frame = DataFrame::new(vec![
            Column::new("id".into(), &[1i64, 2, 3]),
            Column::new("x".into(), &[Some(1.0f64), None, Some(3.0)]),
            Column::new("label".into(), &["a", "b", "a"]),
        ])
        .unwrap();
        let dataset = Dataset::new(frame, "memory").unwrap();

        let config = PreprocessingConfig::new()
            .with_scaler(ScalerType::None)
            .with_imputation(ImputeStrategy::Mean);
        let prepared = DataPreprocessor::with_config(config)
            .fit_transform(&dataset)
            .unwrap();
        assert_eq!(prepared.features[[1, 0]], 2.0);
    }

    #[test]
    fn test_missing_target_is_schema_error() {
        let frame = DataFrame::new(vec![
            Column::new("id".into(), &[1i64, 2]),
            Column::new("x".into(), &[1.0f64, 2.0]),
            Column::new("label".into(), &[Some("a"), None]),
        ])
        .unwrap();
        let dataset = Dataset::new(frame, "memory").unwrap();

        let result = DataPreprocessor::new().fit_transform(&dataset);
        assert!(matches!(result, Err(EvalError::Schema(_))));
    }

    #[test]
    fn test_no_feature_columns() {
        let frame = DataFrame::new(vec![
            Column::new("id".into(), &[1i64, 2]),
            Column::new("label".into(), &["a", "b"]),
        ])
        .unwrap();
        let dataset = Dataset::new(frame, "memory").unwrap();

        let result = DataPreprocessor::new().fit_transform(&dataset);
        assert!(matches!(result, Err(EvalError::EmptyFeatureSet { rows: 2, cols: 0 })));
    }
}
