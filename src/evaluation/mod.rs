//! Model evaluation
//!
//! Classification metrics from confusion counts, plus an optional ROC curve
//! when the model exposes probability estimates. Undefined ratios (zero
//! denominator) report as 0.0 rather than NaN so downstream formatting and
//! serialization stay total.

use crate::error::{QosError, Result};
use crate::training::Classifier;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Scalar classification metrics for one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Present only when the model supports probabilities and the ground
    /// truth contains both classes
    pub roc_auc: Option<f64>,
}

impl MetricsReport {
    /// Named metric values in report order, skipping an absent AUC
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut entries = vec![
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1_score", self.f1_score),
        ];
        if let Some(auc) = self.roc_auc {
            entries.push(("roc_auc", auc));
        }
        entries
    }
}

/// ROC curve points and the area under them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
    pub auc: f64,
}

impl RocCurve {
    /// Compute the curve from ground truth and positive-class scores.
    ///
    /// Requires both classes present in `y_true`.
    pub fn compute(y_true: &Array1<f64>, y_score: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_score.len() {
            return Err(QosError::Evaluation(format!(
                "ground truth has {} samples, scores have {}",
                y_true.len(),
                y_score.len()
            )));
        }

        let n_pos = y_true.iter().filter(|&&v| v > 0.5).count();
        let n_neg = y_true.len() - n_pos;
        if n_pos == 0 || n_neg == 0 {
            return Err(QosError::Evaluation(
                "ROC requires both classes in the ground truth".to_string(),
            ));
        }

        // Sweep thresholds from high to low, accumulating counts
        let mut order: Vec<usize> = (0..y_score.len()).collect();
        order.sort_by(|&a, &b| {
            y_score[b]
                .partial_cmp(&y_score[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut fpr = vec![0.0];
        let mut tpr = vec![0.0];
        let mut thresholds = vec![f64::INFINITY];

        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut i = 0;
        while i < order.len() {
            let score = y_score[order[i]];
            // Consume all samples tied at this score before emitting a point
            while i < order.len() && y_score[order[i]] == score {
                if y_true[order[i]] > 0.5 {
                    tp += 1;
                } else {
                    fp += 1;
                }
                i += 1;
            }
            fpr.push(fp as f64 / n_neg as f64);
            tpr.push(tp as f64 / n_pos as f64);
            thresholds.push(score);
        }

        // Trapezoidal area
        let mut auc = 0.0;
        for w in 1..fpr.len() {
            auc += (fpr[w] - fpr[w - 1]) * (tpr[w] + tpr[w - 1]) / 2.0;
        }

        Ok(Self {
            fpr,
            tpr,
            thresholds,
            auc,
        })
    }
}

/// Full evaluation output: scalar metrics plus the curve behind the AUC
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub metrics: MetricsReport,
    pub roc: Option<RocCurve>,
}

/// Evaluate a fitted classifier on held-out data.
///
/// A model without probability support still yields the full threshold-based
/// report; only the ROC side is skipped.
pub fn evaluate(model: &Classifier, x: &Array2<f64>, y_true: &Array1<f64>) -> Result<Evaluation> {
    if x.nrows() != y_true.len() {
        return Err(QosError::Evaluation(format!(
            "feature matrix has {} rows, ground truth has {} samples",
            x.nrows(),
            y_true.len()
        )));
    }

    let y_pred = model.predict(x)?;
    let (accuracy, precision, recall, f1_score) = classification_metrics(y_true, &y_pred)?;

    let roc = match model.predict_proba(x) {
        Ok(scores) => match RocCurve::compute(y_true, &scores) {
            Ok(curve) => Some(curve),
            Err(e) => {
                warn!("Skipping ROC: {e}");
                None
            }
        },
        Err(QosError::ProbabilityUnsupported) => {
            warn!("Model does not expose probability estimates, skipping ROC");
            None
        }
        Err(e) => return Err(e),
    };

    let metrics = MetricsReport {
        accuracy,
        precision,
        recall,
        f1_score,
        roc_auc: roc.as_ref().map(|r| r.auc),
    };

    Ok(Evaluation { metrics, roc })
}

/// Accuracy, precision, recall and F1 from 0/1 labels. The positive class
/// is 1; any value above 0.5 counts as positive.
pub fn classification_metrics(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
) -> Result<(f64, f64, f64, f64)> {
    if y_true.len() != y_pred.len() {
        return Err(QosError::Evaluation(format!(
            "ground truth has {} samples, predictions have {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(QosError::Evaluation("empty evaluation set".to_string()));
    }

    let mut tp = 0usize;
    let mut tn = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;

    for (&truth, &pred) in y_true.iter().zip(y_pred.iter()) {
        match (truth > 0.5, pred > 0.5) {
            (true, true) => tp += 1,
            (false, false) => tn += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
        }
    }

    let n = y_true.len() as f64;
    let accuracy = (tp + tn) as f64 / n;
    let precision = safe_ratio(tp as f64, (tp + fp) as f64);
    let recall = safe_ratio(tp as f64, (tp + fn_) as f64);
    let f1_score = safe_ratio(2.0 * precision * recall, precision + recall);

    Ok((accuracy, precision, recall, f1_score))
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_predictions() {
        let y = array![0.0, 1.0, 1.0, 0.0];
        let (acc, prec, rec, f1) = classification_metrics(&y, &y).unwrap();
        assert_eq!(acc, 1.0);
        assert_eq!(prec, 1.0);
        assert_eq!(rec, 1.0);
        assert_eq!(f1, 1.0);
    }

    #[test]
    fn test_no_predicted_positives_gives_zero_not_nan() {
        let y_true = array![1.0, 1.0, 0.0];
        let y_pred = array![0.0, 0.0, 0.0];
        let (acc, prec, rec, f1) = classification_metrics(&y_true, &y_pred).unwrap();
        assert!((acc - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(prec, 0.0);
        assert_eq!(rec, 0.0);
        assert_eq!(f1, 0.0);
        assert!(!f1.is_nan());
    }

    #[test]
    fn test_known_confusion_matrix() {
        // tp=2 fp=1 fn=1 tn=1
        let y_true = array![1.0, 1.0, 1.0, 0.0, 0.0];
        let y_pred = array![1.0, 1.0, 0.0, 1.0, 0.0];
        let (acc, prec, rec, f1) = classification_metrics(&y_true, &y_pred).unwrap();
        assert!((acc - 0.6).abs() < 1e-12);
        assert!((prec - 2.0 / 3.0).abs() < 1e-12);
        assert!((rec - 2.0 / 3.0).abs() < 1e-12);
        assert!((f1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let y_true = array![1.0, 0.0];
        let y_pred = array![1.0];
        assert!(matches!(
            classification_metrics(&y_true, &y_pred).unwrap_err(),
            QosError::Evaluation(_)
        ));
    }

    #[test]
    fn test_roc_perfect_separation() {
        let y_true = array![0.0, 0.0, 1.0, 1.0];
        let y_score = array![0.1, 0.2, 0.8, 0.9];
        let roc = RocCurve::compute(&y_true, &y_score).unwrap();
        assert!((roc.auc - 1.0).abs() < 1e-12);
        assert_eq!(roc.fpr[0], 0.0);
        assert_eq!(roc.tpr[0], 0.0);
        assert_eq!(*roc.fpr.last().unwrap(), 1.0);
        assert_eq!(*roc.tpr.last().unwrap(), 1.0);
    }

    #[test]
    fn test_roc_reversed_scores_auc_zero() {
        let y_true = array![1.0, 1.0, 0.0, 0.0];
        let y_score = array![0.1, 0.2, 0.8, 0.9];
        let roc = RocCurve::compute(&y_true, &y_score).unwrap();
        assert!(roc.auc.abs() < 1e-12);
    }

    #[test]
    fn test_roc_single_class_is_an_error() {
        let y_true = array![1.0, 1.0];
        let y_score = array![0.3, 0.7];
        assert!(RocCurve::compute(&y_true, &y_score).is_err());
    }

    #[test]
    fn test_roc_tied_scores_share_a_point() {
        let y_true = array![0.0, 1.0, 1.0, 0.0];
        let y_score = array![0.5, 0.5, 0.9, 0.1];
        let roc = RocCurve::compute(&y_true, &y_score).unwrap();
        // distinct thresholds: inf, 0.9, 0.5, 0.1
        assert_eq!(roc.thresholds.len(), 4);
    }
}
