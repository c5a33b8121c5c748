//! Numeric scaling hook
//!
//! The baseline tree classifiers split on raw values, so scaling defaults to
//! `None`; `Standard` is available for models that need it.

use crate::error::{QosError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of scaler to apply to numeric columns
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ScalerType {
    /// Pass numeric values through unchanged
    #[default]
    None,
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
}

/// Parameters for a fitted scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    std: f64,
}

/// Numeric feature scaler with per-column fitted parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericScaler {
    scaler_type: ScalerType,
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl NumericScaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit scaling parameters for one named column.
    pub fn fit_column(&mut self, col_name: &str, values: &[f64]) {
        if self.scaler_type == ScalerType::Standard {
            let n = values.len().max(1) as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            self.params.insert(
                col_name.to_string(),
                ScalerParams {
                    mean,
                    std: if std == 0.0 { 1.0 } else { std },
                },
            );
        }
        self.is_fitted = true;
    }

    /// Apply the fitted parameters to a column's values.
    pub fn scale_column(&self, col_name: &str, values: Vec<f64>) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(QosError::NotFitted);
        }

        match self.scaler_type {
            ScalerType::None => Ok(values),
            ScalerType::Standard => {
                let params = self
                    .params
                    .get(col_name)
                    .ok_or_else(|| QosError::ColumnNotFound(col_name.to_string()))?;
                Ok(values
                    .into_iter()
                    .map(|v| (v - params.mean) / params.std)
                    .collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_scaler_passes_through() {
        let mut scaler = NumericScaler::new(ScalerType::None);
        scaler.fit_column("latency", &[100.0, 200.0]);
        let out = scaler.scale_column("latency", vec![150.0, 250.0]).unwrap();
        assert_eq!(out, vec![150.0, 250.0]);
    }

    #[test]
    fn test_standard_scaler_centers_and_scales() {
        let mut scaler = NumericScaler::new(ScalerType::Standard);
        scaler.fit_column("x", &[1.0, 2.0, 3.0]);
        let out = scaler.scale_column("x", vec![1.0, 2.0, 3.0]).unwrap();
        assert!((out[1]).abs() < 1e-12); // mean maps to 0
        assert!((out[0] + out[2]).abs() < 1e-12); // symmetric around the mean
    }

    #[test]
    fn test_constant_column_does_not_divide_by_zero() {
        let mut scaler = NumericScaler::new(ScalerType::Standard);
        scaler.fit_column("x", &[5.0, 5.0, 5.0]);
        let out = scaler.scale_column("x", vec![5.0]).unwrap();
        assert_eq!(out, vec![0.0]);
    }

    #[test]
    fn test_scale_before_fit_is_an_error() {
        let scaler = NumericScaler::new(ScalerType::None);
        assert!(matches!(
            scaler.scale_column("x", vec![1.0]).unwrap_err(),
            QosError::NotFitted
        ));
    }
}
