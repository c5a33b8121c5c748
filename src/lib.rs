//! QoS compliance prediction pipeline
//!
//! Trains tree-based classifiers to predict whether a server configuration
//! meets its quality-of-service thresholds, from synthetic or CSV data.
//!
//! # Modules
//!
//! - [`config`] - Experiment settings and the QoS threshold policy
//! - [`data`] - Synthetic dataset generation and CSV ingestion
//! - [`preprocessing`] - One-hot encoding and numeric scaling
//! - [`training`] - Decision tree and random forest classifiers
//! - [`evaluation`] - Classification metrics and ROC curves
//! - [`pipeline`] - End-to-end experiment orchestration

pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod pipeline;
pub mod preprocessing;
pub mod training;

pub use error::{QosError, Result};

/// Commonly used types
pub mod prelude {
    pub use crate::config::{ExperimentConfig, QosThresholds};
    pub use crate::data::{DataSource, SyntheticGenerator, TARGET_COLUMN};
    pub use crate::error::{QosError, Result};
    pub use crate::evaluation::{Evaluation, MetricsReport, RocCurve};
    pub use crate::pipeline::{ExperimentOutcome, QosExperiment};
    pub use crate::preprocessing::FeaturePreprocessor;
    pub use crate::training::{Classifier, ClassifierKind};
}
