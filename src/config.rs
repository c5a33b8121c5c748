//! Experiment configuration and QoS threshold policy

use serde::{Deserialize, Serialize};

/// QoS thresholds a job must meet to count as compliant.
///
/// Labeling is the conjunction of four comparisons: latency, error rate and
/// completion time are upper bounds, throughput is a lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QosThresholds {
    /// Maximum acceptable latency in milliseconds
    pub latency_ms: f64,
    /// Minimum acceptable throughput in requests per second
    pub throughput_rps: f64,
    /// Maximum acceptable error rate as a fraction
    pub error_rate: f64,
    /// Maximum acceptable job completion time in milliseconds
    pub completion_time_ms: f64,
}

impl Default for QosThresholds {
    fn default() -> Self {
        Self {
            latency_ms: 200.0,
            throughput_rps: 100.0,
            error_rate: 0.05,
            completion_time_ms: 1000.0,
        }
    }
}

impl QosThresholds {
    /// Decide compliance for one observation. Pure; inputs are assumed finite.
    pub fn is_compliant(
        &self,
        latency: f64,
        throughput: f64,
        error_rate: f64,
        completion_time: f64,
    ) -> bool {
        latency <= self.latency_ms
            && throughput >= self.throughput_rps
            && error_rate <= self.error_rate
            && completion_time <= self.completion_time_ms
    }
}

/// Full experiment configuration.
///
/// Every source of randomness (data generation, train/test split, forest
/// bootstrap) derives from `random_seed`, so one seed reproduces a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// QoS threshold policy used for labeling synthetic data
    pub thresholds: QosThresholds,
    /// Number of synthetic records to generate
    pub dataset_size: usize,
    /// Fraction of data held out for testing
    pub test_fraction: f64,
    /// Seed for all sampling
    pub random_seed: u64,
    /// Number of trees in the forest variant
    pub n_estimators: usize,
    /// Maximum tree depth; `None` grows to full depth
    pub max_depth: Option<usize>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            thresholds: QosThresholds::default(),
            dataset_size: 1000,
            test_fraction: 0.2,
            random_seed: 42,
            n_estimators: 100,
            max_depth: None,
        }
    }
}

impl ExperimentConfig {
    /// Set the dataset size
    pub fn with_dataset_size(mut self, size: usize) -> Self {
        self.dataset_size = size;
        self
    }

    /// Set the random seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set the held-out test fraction
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    /// Set the number of trees for the forest variant
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Set the maximum tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}
