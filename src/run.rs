//! End-to-end run: load, prepare, split, evaluate and report
//!
//! Each stage hands its output to the next through plain values; nothing is
//! kept in shared state between stages.

use crate::config::HarnessConfig;
use crate::error::Result;
use crate::evaluation::{Evaluator, ProgressSink, ResultTable};
use crate::preprocessing::{DataPreprocessor, PreparedData, Scaler, ScalerFit, ScalerType};
use crate::report::{ReportArtifacts, Reporter};
use crate::training::{train_test_split, ModelRegistry, Split};
use crate::utils::{DataLoader, Dataset};
use std::io::Write;
use tracing::info;

/// Summary of a completed run
#[derive(Debug)]
pub struct RunOutcome {
    pub table: ResultTable,
    pub artifacts: ReportArtifacts,
    pub n_rows: usize,
    pub n_features: usize,
    pub n_classes: usize,
    pub n_train: usize,
    pub n_test: usize,
}

/// One invocation of the harness
pub struct Run {
    config: HarnessConfig,
    registry: Option<ModelRegistry>,
}

impl Run {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            registry: None,
        }
    }

    /// Evaluate these models instead of the configured ones
    pub fn with_registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Execute every stage in order.
    ///
    /// Configuration and input faults surface before any model is fitted.
    pub fn execute<W: Write + ?Sized>(
        self,
        progress: &mut dyn ProgressSink,
        console: &mut W,
    ) -> Result<RunOutcome> {
        let Run { config, registry } = self;
        config.validate()?;

        let registry = match registry {
            Some(registry) => registry,
            None => ModelRegistry::from_specs(&config.models)?,
        };

        let dataset = load(&config)?;
        let prepared = prepare(&config, &dataset)?;
        let split = split(&config, &prepared)?;

        let table = Evaluator::new(progress)
            .with_policy(config.failure_policy)
            .evaluate(registry, &split)?;

        let artifacts = Reporter::new(&config.output_dir)
            .with_charts(config.charts)
            .aggregate(&table, console)?;

        Ok(RunOutcome {
            n_rows: prepared.n_samples(),
            n_features: prepared.n_features(),
            n_classes: prepared.n_classes(),
            n_train: split.n_train(),
            n_test: split.n_test(),
            table,
            artifacts,
        })
    }
}

/// Read the configured CSV
pub fn load(config: &HarnessConfig) -> Result<Dataset> {
    DataLoader::new().load(&config.data_path)
}

/// Encode, impute and (for combined fitting) scale
pub fn prepare(config: &HarnessConfig, dataset: &Dataset) -> Result<PreparedData> {
    DataPreprocessor::with_config(config.preprocessing.clone()).fit_transform(dataset)
}

/// Partition the prepared rows, scaling on the training rows when configured
pub fn split(config: &HarnessConfig, prepared: &PreparedData) -> Result<Split> {
    let mut split = train_test_split(
        &prepared.features,
        &prepared.labels,
        config.test_fraction,
        config.seed,
    )?;

    let preprocessing = &config.preprocessing;
    if preprocessing.scaler_fit == ScalerFit::TrainOnly
        && preprocessing.scaler_type != ScalerType::None
    {
        let mut scaler = Scaler::new(preprocessing.scaler_type);
        split.scale_with(&mut scaler)?;
    }

    info!(
        train = split.n_train(),
        test = split.n_test(),
        seed = config.seed,
        "Data split"
    );
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use crate::evaluation::RecordingProgress;
    use crate::preprocessing::PreprocessingConfig;
    use crate::training::{ModelSpec, ModelType};

    fn write_dataset(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id,a,b,label").unwrap();
        for i in 0..40 {
            let class = if i % 2 == 0 { "yes" } else { "no" };
            let offset = if i % 2 == 0 { 0.0 } else { 10.0 };
            writeln!(file, "{},{},{},{}", i, offset + i as f64 * 0.1, offset - 1.0, class).unwrap();
        }
        path
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::new()
            .with_data_path(write_dataset(dir.path()))
            .with_output_dir(dir.path().join("out"))
            .with_charts(false);

        let mut progress = RecordingProgress::new();
        let outcome = Run::new(config)
            .execute(&mut progress, &mut std::io::sink())
            .unwrap();

        assert_eq!(outcome.n_rows, 40);
        assert_eq!(outcome.n_features, 2);
        assert_eq!(outcome.n_classes, 2);
        assert_eq!(outcome.n_test, 8);
        assert_eq!(outcome.n_train, 32);
        assert_eq!(outcome.table.names(), vec!["KNN"]);
        assert_eq!(outcome.table.records()[0].accuracy(), 1.0);
        assert!(outcome.artifacts.results_csv.exists());
    }

    #[test]
    fn test_train_only_scaling() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::new()
            .with_preprocessing(PreprocessingConfig::new().with_scaler_fit(ScalerFit::TrainOnly));
        let dataset = DataLoader::new().load(&write_dataset(dir.path())).unwrap();

        let prepared = prepare(&config, &dataset).unwrap();
        assert!(!prepared.scaled);

        let split = split(&config, &prepared).unwrap();
        let means = split.x_train.mean_axis(ndarray::Axis(0)).unwrap();
        assert!(means.iter().all(|m| m.abs() < 1e-9));
    }

    #[test]
    fn test_invalid_fraction_before_loading() {
        let config = HarnessConfig::new()
            .with_data_path("/no/such/file.csv")
            .with_test_fraction(1.5)
            .with_models(vec![ModelSpec::new(ModelType::Majority)]);

        let result = Run::new(config).execute(&mut RecordingProgress::new(), &mut std::io::sink());
        assert!(matches!(result, Err(EvalError::InvalidFraction { .. })));
    }
}
