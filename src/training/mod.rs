//! Model training
//!
//! Two classifier families behind one tagged enum: a bagged random forest
//! and a single full-depth decision tree. The enum keeps dispatch explicit
//! at the call site instead of hiding it behind a trait object.

pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{DecisionTree, TreeNode};
pub use random_forest::{MaxFeatures, RandomForest};

use crate::config::ExperimentConfig;
use crate::error::{QosError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which classifier family to train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierKind {
    /// Bagged ensemble of decision trees
    RandomForest,
    /// Single full-depth decision tree
    DecisionTree,
}

impl FromStr for ClassifierKind {
    type Err = QosError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rf" | "random_forest" => Ok(ClassifierKind::RandomForest),
            "dt" | "decision_tree" => Ok(ClassifierKind::DecisionTree),
            other => Err(QosError::Config(format!(
                "unknown model '{other}', expected 'rf' or 'dt'"
            ))),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::RandomForest => write!(f, "random_forest"),
            ClassifierKind::DecisionTree => write!(f, "decision_tree"),
        }
    }
}

/// Binary classifier over the encoded feature matrix.
///
/// Labels travel as `f64` holding 0.0 or 1.0. Only the forest produces
/// probability estimates; the single tree reports hard labels and returns
/// `ProbabilityUnsupported` from [`Classifier::predict_proba`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Classifier {
    RandomForest(RandomForest),
    DecisionTree(DecisionTree),
}

impl Classifier {
    /// Build an unfitted classifier from experiment settings
    pub fn from_config(kind: ClassifierKind, config: &ExperimentConfig) -> Self {
        match kind {
            ClassifierKind::RandomForest => {
                let mut rf = RandomForest::new(config.n_estimators)
                    .with_random_state(config.random_seed);
                if let Some(d) = config.max_depth {
                    rf = rf.with_max_depth(d);
                }
                Classifier::RandomForest(rf)
            }
            ClassifierKind::DecisionTree => {
                let mut dt = DecisionTree::new();
                if let Some(d) = config.max_depth {
                    dt = dt.with_max_depth(d);
                }
                Classifier::DecisionTree(dt)
            }
        }
    }

    /// Fit to training data. Requires both classes in `y`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let mut classes: Vec<i64> = y.iter().map(|v| v.round() as i64).collect();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            return Err(QosError::Training(format!(
                "expected two classes in the training labels, found {}",
                classes.len()
            )));
        }

        match self {
            Classifier::RandomForest(rf) => rf.fit(x, y).map(|_| ()),
            Classifier::DecisionTree(dt) => dt.fit(x, y).map(|_| ()),
        }
    }

    /// Predict hard labels (0.0 / 1.0)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Classifier::RandomForest(rf) => rf.predict(x),
            Classifier::DecisionTree(dt) => dt.predict(x),
        }
    }

    /// Positive-class probability per sample, where supported
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Classifier::RandomForest(rf) => rf.predict_proba(x),
            Classifier::DecisionTree(_) => Err(QosError::ProbabilityUnsupported),
        }
    }

    /// Normalized feature importances, if fitted
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        match self {
            Classifier::RandomForest(rf) => rf.feature_importances(),
            Classifier::DecisionTree(dt) => dt.feature_importances(),
        }
    }

    /// Which family this classifier belongs to
    pub fn kind(&self) -> ClassifierKind {
        match self {
            Classifier::RandomForest(_) => ClassifierKind::RandomForest,
            Classifier::DecisionTree(_) => ClassifierKind::DecisionTree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_class_data() -> (Array2<f64>, Array1<f64>) {
        (
            array![[0.0], [0.1], [0.9], [1.0]],
            array![0.0, 0.0, 1.0, 1.0],
        )
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            "rf".parse::<ClassifierKind>().unwrap(),
            ClassifierKind::RandomForest
        );
        assert_eq!(
            "dt".parse::<ClassifierKind>().unwrap(),
            ClassifierKind::DecisionTree
        );
        assert!("svm".parse::<ClassifierKind>().is_err());
    }

    #[test]
    fn test_single_class_labels_rejected() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 1.0, 1.0];
        let config = ExperimentConfig::default();

        let mut clf = Classifier::from_config(ClassifierKind::RandomForest, &config);
        let err = clf.fit(&x, &y).unwrap_err();
        assert!(matches!(err, QosError::Training(_)));
        assert!(err.to_string().contains("found 1"));
    }

    #[test]
    fn test_tree_has_no_probabilities() {
        let (x, y) = two_class_data();
        let config = ExperimentConfig::default();

        let mut clf = Classifier::from_config(ClassifierKind::DecisionTree, &config);
        clf.fit(&x, &y).unwrap();
        assert!(clf.predict(&x).is_ok());
        assert!(matches!(
            clf.predict_proba(&x).unwrap_err(),
            QosError::ProbabilityUnsupported
        ));
    }

    #[test]
    fn test_forest_has_probabilities() {
        let (x, y) = two_class_data();
        let config = ExperimentConfig::default().with_n_estimators(10);

        let mut clf = Classifier::from_config(ClassifierKind::RandomForest, &config);
        clf.fit(&x, &y).unwrap();
        let proba = clf.predict_proba(&x).unwrap();
        assert_eq!(proba.len(), 4);
    }
}
