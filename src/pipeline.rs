//! End-to-end experiment pipeline
//!
//! One `run` goes load -> target check -> seeded split -> encode -> train ->
//! evaluate. Encoding is fit on the training partition only and applied
//! frozen to the test partition, so vocabulary never leaks across the split.

use crate::config::ExperimentConfig;
use crate::data::{self, DataSource, TARGET_COLUMN};
use crate::error::{QosError, Result};
use crate::evaluation::{self, Evaluation, MetricsReport, RocCurve};
use crate::preprocessing::FeaturePreprocessor;
use crate::training::{Classifier, ClassifierKind};
use ndarray::Array1;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Result of one experiment run
#[derive(Debug, Clone)]
pub struct ExperimentOutcome {
    pub metrics: MetricsReport,
    pub roc: Option<RocCurve>,
    pub n_train: usize,
    pub n_test: usize,
}

/// QoS compliance prediction experiment
#[derive(Debug, Clone)]
pub struct QosExperiment {
    config: ExperimentConfig,
}

impl QosExperiment {
    /// Create an experiment with the given configuration
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Experiment configuration
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run the full pipeline against a data source with the chosen model.
    pub fn run(&self, source: &DataSource, kind: ClassifierKind) -> Result<ExperimentOutcome> {
        let df = data::load_data(source, &self.config)?;
        info!(
            rows = df.height(),
            columns = df.width(),
            "Dataset loaded"
        );

        data::ensure_target(&df)?;

        let (train_df, test_df) = self.split(&df)?;
        info!(
            train = train_df.height(),
            test = test_df.height(),
            "Train/test split complete"
        );

        let mut preprocessor = FeaturePreprocessor::new();
        let x_train = preprocessor.fit_transform(&train_df)?;
        let x_test = preprocessor.transform(&test_df)?;
        let y_train = extract_target(&train_df)?;
        let y_test = extract_target(&test_df)?;

        let mut model = Classifier::from_config(kind, &self.config);
        info!(model = %kind, "Training");
        model.fit(&x_train, &y_train)?;
        log_top_importances(&model, preprocessor.feature_names());

        let Evaluation { metrics, roc } = evaluation::evaluate(&model, &x_test, &y_test)?;
        for (name, value) in metrics.entries() {
            info!("{name}: {value:.4}");
        }

        Ok(ExperimentOutcome {
            metrics,
            roc,
            n_train: x_train.nrows(),
            n_test: x_test.nrows(),
        })
    }

    /// Deterministic shuffled split. Test size is `floor(n * test_fraction)`.
    fn split(&self, df: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        let n = df.height();
        let n_test = (n as f64 * self.config.test_fraction) as usize;
        let n_train = n - n_test;
        if n_test == 0 || n_train == 0 {
            return Err(QosError::Config(format!(
                "cannot split {} rows with test fraction {}",
                n, self.config.test_fraction
            )));
        }

        let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_seed);
        indices.shuffle(&mut rng);

        let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
        let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

        let test_df = df.take(&test_idx)?;
        let train_df = df.take(&train_idx)?;
        Ok((train_df, test_df))
    }
}

/// Pull the label column out as 0.0/1.0 values.
fn extract_target(df: &DataFrame) -> Result<Array1<f64>> {
    let column = df
        .column(TARGET_COLUMN)
        .map_err(|_| QosError::MissingTarget(TARGET_COLUMN.to_string()))?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| QosError::DataLoad(format!("label column: {e}")))?;
    let values: Option<Vec<f64>> = casted
        .f64()
        .map_err(|e| QosError::DataLoad(e.to_string()))?
        .into_iter()
        .collect();
    let values =
        values.ok_or_else(|| QosError::DataLoad("label column contains nulls".to_string()))?;
    Ok(Array1::from_vec(values))
}

fn log_top_importances(model: &Classifier, feature_names: &[String]) {
    if let Some(importances) = model.feature_importances() {
        let mut ranked: Vec<(usize, f64)> = importances.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        for (idx, importance) in ranked.into_iter().take(5) {
            if let Some(name) = feature_names.get(idx) {
                info!("importance {name}: {importance:.4}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_is_deterministic_and_disjoint() {
        let df = df!(
            "latency" => (0..50).map(|i| i as f64).collect::<Vec<_>>(),
            TARGET_COLUMN => (0..50).map(|i| (i % 2) as i64).collect::<Vec<_>>()
        )
        .unwrap();

        let exp = QosExperiment::new(ExperimentConfig::default().with_random_seed(7));
        let (train_a, test_a) = exp.split(&df).unwrap();
        let (train_b, test_b) = exp.split(&df).unwrap();

        assert_eq!(test_a.height(), 10);
        assert_eq!(train_a.height(), 40);
        assert!(train_a.equals(&train_b));
        assert!(test_a.equals(&test_b));
    }

    #[test]
    fn test_split_different_seeds_differ() {
        let df = df!(
            "latency" => (0..50).map(|i| i as f64).collect::<Vec<_>>(),
            TARGET_COLUMN => (0..50).map(|i| (i % 2) as i64).collect::<Vec<_>>()
        )
        .unwrap();

        let a = QosExperiment::new(ExperimentConfig::default().with_random_seed(1));
        let b = QosExperiment::new(ExperimentConfig::default().with_random_seed(2));
        let (_, test_a) = a.split(&df).unwrap();
        let (_, test_b) = b.split(&df).unwrap();
        assert!(!test_a.equals(&test_b));
    }

    #[test]
    fn test_split_too_small_is_config_error() {
        let df = df!(
            "latency" => &[1.0, 2.0],
            TARGET_COLUMN => &[0i64, 1]
        )
        .unwrap();
        let exp = QosExperiment::new(ExperimentConfig::default().with_test_fraction(0.2));
        // floor(2 * 0.2) = 0 test rows
        assert!(matches!(
            exp.split(&df).unwrap_err(),
            QosError::Config(_)
        ));
    }

    #[test]
    fn test_extract_target_casts_integers() {
        let df = df!(TARGET_COLUMN => &[1i64, 0, 1]).unwrap();
        let y = extract_target(&df).unwrap();
        assert_eq!(y, Array1::from_vec(vec![1.0, 0.0, 1.0]));
    }
}
