//! Feature preprocessing
//!
//! Converts raw heterogeneous records into a fixed-width `f64` matrix:
//! categorical columns are one-hot encoded against a vocabulary frozen on the
//! training partition, numeric columns pass through the scaling hook
//! (identity by default). The fitted encoding is immutable; `transform`
//! applies it unchanged to any later split.

mod encoder;
mod scaler;

pub use encoder::CategoryEncoder;
pub use scaler::{NumericScaler, ScalerType};

use crate::data::TARGET_COLUMN;
use crate::error::{QosError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fits on training rows, transforms any rows with the frozen encoding.
///
/// Output column order is derived from the input column order: each numeric
/// column yields one matrix column, each categorical column expands in place
/// into one indicator column per vocabulary entry (vocabulary sorted
/// lexicographically). The label column is ignored if present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePreprocessor {
    encoder: CategoryEncoder,
    scaler: NumericScaler,
    // feature columns in input order, with their kind
    columns: Vec<(String, ColumnKind)>,
    feature_names: Vec<String>,
    is_fitted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum ColumnKind {
    Numeric,
    Categorical,
}

impl Default for FeaturePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaturePreprocessor {
    /// Create a preprocessor with the identity scaling hook
    pub fn new() -> Self {
        Self::with_scaler(ScalerType::None)
    }

    /// Create a preprocessor with an explicit scaler type
    pub fn with_scaler(scaler_type: ScalerType) -> Self {
        Self {
            encoder: CategoryEncoder::new(),
            scaler: NumericScaler::new(scaler_type),
            columns: Vec::new(),
            feature_names: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the encoding on the training partition only.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.columns.clear();
        self.feature_names.clear();

        for col in df.get_columns() {
            let name = col.name().to_string();
            if name == TARGET_COLUMN {
                continue;
            }
            let kind = if col.dtype() == &DataType::String {
                ColumnKind::Categorical
            } else {
                ColumnKind::Numeric
            };
            self.columns.push((name, kind));
        }

        if self.columns.is_empty() {
            return Err(QosError::DataLoad("no feature columns found".to_string()));
        }

        let categorical: Vec<&str> = self
            .columns
            .iter()
            .filter(|(_, k)| *k == ColumnKind::Categorical)
            .map(|(n, _)| n.as_str())
            .collect();
        self.encoder.fit(df, &categorical)?;

        for (name, kind) in &self.columns {
            match kind {
                ColumnKind::Numeric => {
                    let values = numeric_values(df, name)?;
                    self.scaler.fit_column(name, &values);
                    self.feature_names.push(name.clone());
                }
                ColumnKind::Categorical => {
                    // vocabulary exists after encoder.fit
                    let vocab = self.encoder.vocabulary(name).unwrap_or(&[]);
                    for category in vocab {
                        self.feature_names.push(format!("{name}_{category}"));
                    }
                }
            }
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform rows into a feature matrix using the frozen encoding.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(QosError::NotFitted);
        }

        let n_rows = df.height();
        let mut matrix_cols: Vec<Vec<f64>> = Vec::with_capacity(self.feature_names.len());

        for (name, kind) in &self.columns {
            match kind {
                ColumnKind::Numeric => {
                    let values = numeric_values(df, name)?;
                    matrix_cols.push(self.scaler.scale_column(name, values)?);
                }
                ColumnKind::Categorical => {
                    matrix_cols.extend(self.encoder.encode_column(df, name)?);
                }
            }
        }

        let n_cols = matrix_cols.len();
        let col_refs: Vec<&[f64]> = matrix_cols.iter().map(|c| c.as_slice()).collect();
        Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
            col_refs[c][r]
        }))
    }

    /// Fit on the training partition and transform it in one step.
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Names of the output matrix columns, in order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

/// Extract one column as `f64`, casting integers as needed. Missing cells
/// fail the load rather than flowing through training as silent zeros.
fn numeric_values(df: &DataFrame, col_name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(col_name)
        .map_err(|_| QosError::ColumnNotFound(col_name.to_string()))?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| QosError::DataLoad(format!("column '{col_name}': {e}")))?;
    let values: Option<Vec<f64>> = casted
        .f64()
        .map_err(|e| QosError::DataLoad(e.to_string()))?
        .into_iter()
        .collect();
    values.ok_or_else(|| QosError::DataLoad(format!("column '{col_name}' contains nulls")))
}
