//! Dataset sources: synthetic generation and CSV ingestion
//!
//! A dataset is a polars `DataFrame` whose columns follow the fixed record
//! schema below, plus the `QoS_compliant` label column (1 = compliant).

mod generator;
mod loader;

pub use generator::SyntheticGenerator;
pub use loader::{load_csv, save_csv};

use crate::config::ExperimentConfig;
use crate::error::{QosError, Result};
use polars::prelude::*;
use std::path::PathBuf;

/// Name of the binary label column
pub const TARGET_COLUMN: &str = "QoS_compliant";

/// Feature columns, in schema order (configuration attributes then metrics)
pub const FEATURE_COLUMNS: [&str; 11] = [
    "cpu_cores",
    "cpu_speed",
    "memory",
    "storage",
    "network_speed",
    "os",
    "software_stack",
    "latency",
    "throughput",
    "error_rate",
    "completion_time",
];

/// Where a run's dataset comes from
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Generate a labeled dataset from the configured thresholds and seed
    Synthetic,
    /// Read a CSV file matching the record schema
    Csv(PathBuf),
}

/// Load the dataset for a run: from file if a path was given, otherwise
/// generated synthetically from the experiment configuration.
pub fn load_data(source: &DataSource, config: &ExperimentConfig) -> Result<DataFrame> {
    match source {
        DataSource::Csv(path) => load_csv(path),
        DataSource::Synthetic => {
            SyntheticGenerator::new(config.dataset_size, config.random_seed)
                .with_thresholds(config.thresholds)
                .generate()
        }
    }
}

/// Fail with `MissingTarget` unless the label column is present.
pub fn ensure_target(df: &DataFrame) -> Result<()> {
    if df
        .get_column_names()
        .iter()
        .any(|name| name.as_str() == TARGET_COLUMN)
    {
        Ok(())
    } else {
        Err(QosError::MissingTarget(TARGET_COLUMN.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_target_present() {
        let df = df!(
            "latency" => &[100.0, 250.0],
            TARGET_COLUMN => &[1i64, 0]
        )
        .unwrap();
        assert!(ensure_target(&df).is_ok());
    }

    #[test]
    fn test_ensure_target_missing() {
        let df = df!("latency" => &[100.0, 250.0]).unwrap();
        let err = ensure_target(&df).unwrap_err();
        assert!(matches!(err, QosError::MissingTarget(_)));
    }
}
