//! Random forest classifier
//!
//! Bags seeded bootstrap samples over [`DecisionTree`] estimators. The base
//! seed fully determines the forest: tree `i` draws its bootstrap and its
//! per-split feature subsets from streams seeded with `base_seed + i`, so
//! refits reproduce the same ensemble regardless of how rayon schedules the
//! tree builds.

use super::decision_tree::DecisionTree;
use crate::error::{QosError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in a leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Base seed for bootstrap and feature sampling
    pub random_state: u64,
    feature_importances: Option<Array1<f64>>,
    n_features: usize,
}

/// Strategy for the number of features per split
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// All features
    All,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create an unfitted forest with the given ensemble size
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            random_state: 42,
            feature_importances: None,
            n_features: 0,
        }
    }

    /// Set maximum depth per tree
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the base seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    fn compute_max_features(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::All => n_features,
        }
        .max(1)
    }

    /// Fit the forest to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(QosError::Shape {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        if self.n_estimators == 0 {
            return Err(QosError::Training(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        self.n_features = n_features;
        let max_features = self.compute_max_features(n_features);
        let base_seed = self.random_state;

        let trees: Result<Vec<DecisionTree>> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf);
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }
                tree.max_features = Some(max_features);
                // Feature-sampling seed drawn after the bootstrap so the two
                // streams stay decorrelated
                tree.random_state = rng.next_u64();
                tree.fit(&x_boot, &y_boot)?;

                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total_importances = vec![0.0; self.n_features];
        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (i, &val) in imp.iter().enumerate() {
                    if i < self.n_features {
                        total_importances[i] += val;
                    }
                }
            }
        }

        let total: f64 = total_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut total_importances {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total_importances));
    }

    fn tree_predictions(&self, x: &Array2<f64>) -> Result<Vec<Array1<f64>>> {
        self.trees.par_iter().map(|tree| tree.predict(x)).collect()
    }

    /// Predict class labels by majority vote; ties go to the non-compliant
    /// class.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(QosError::NotFitted);
        }

        let all_predictions = self.tree_predictions(x)?;
        let n_samples = x.nrows();

        let predictions: Vec<f64> = (0..n_samples)
            .map(|i| {
                let mut votes = [0usize; 2];
                for preds in &all_predictions {
                    votes[(preds[i] > 0.5) as usize] += 1;
                }
                if votes[1] > votes[0] {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Positive-class probability per sample, as the fraction of trees
    /// voting 1.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(QosError::NotFitted);
        }

        let all_predictions = self.tree_predictions(x)?;
        let n_samples = x.nrows();
        let n_trees = all_predictions.len() as f64;

        let proba: Vec<f64> = (0..n_samples)
            .map(|i| {
                let positive_votes = all_predictions
                    .iter()
                    .filter(|preds| preds[i] > 0.5)
                    .count();
                positive_votes as f64 / n_trees
            })
            .collect();

        Ok(Array1::from_vec(proba))
    }

    /// Importances averaged over trees and normalized to sum to one
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        (
            array![
                [0.0, 0.0],
                [0.1, 0.1],
                [0.2, 0.2],
                [1.0, 1.0],
                [1.1, 1.1],
                [1.2, 1.2],
            ],
            array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        )
    }

    #[test]
    fn test_classifier_accuracy() {
        let (x, y) = separable_data();

        let mut rf = RandomForest::new(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let accuracy = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count() as f64
            / y.len() as f64;

        assert!(accuracy >= 0.8, "Accuracy too low: {}", accuracy);
    }

    #[test]
    fn test_same_seed_reproduces_predictions() {
        let (x, y) = separable_data();

        let mut a = RandomForest::new(10).with_random_state(7);
        let mut b = RandomForest::new(10).with_random_state(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_informative_trailing_features_are_sampled() {
        // Six constant columns followed by two informative ones; sqrt
        // subsetting must still reach the tail of the matrix
        let n = 20;
        let x = Array2::from_shape_fn((n, 8), |(i, j)| {
            if j >= 6 {
                (i >= n / 2) as usize as f64
            } else {
                0.0
            }
        });
        let y = Array1::from_shape_fn(n, |i| (i >= n / 2) as usize as f64);

        let mut rf = RandomForest::new(50).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let accuracy = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count() as f64
            / n as f64;
        assert!(accuracy >= 0.9, "accuracy too low: {accuracy}");

        // Constant columns can never yield a split, so all importance mass
        // sits on the two informative features
        let importances = rf.feature_importances().unwrap();
        let informative: f64 = importances[6] + importances[7];
        assert!((informative - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_features_strategy() {
        let (x, y) = separable_data();

        let mut rf = RandomForest::new(10)
            .with_max_features(MaxFeatures::All)
            .with_random_state(42);
        rf.fit(&x, &y).unwrap();
        assert_eq!(rf.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_predict_before_fit_is_an_error() {
        let rf = RandomForest::new(10);
        let x = array![[1.0, 2.0]];
        assert!(matches!(rf.predict(&x).unwrap_err(), QosError::NotFitted));
    }

    #[test]
    fn test_feature_importances_sum_to_one() {
        let (x, y) = separable_data();

        let mut rf = RandomForest::new(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let importances = rf.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        let total: f64 = importances.sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
