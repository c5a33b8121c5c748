//! One-hot encoding with a frozen vocabulary
//!
//! The vocabulary for each column is collected during `fit` and sorted
//! lexicographically, which fixes the indicator column order independently of
//! row order. Values outside the fitted vocabulary are a hard error at
//! transform time.

use crate::error::{QosError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One-hot encoder over named string columns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryEncoder {
    vocabularies: HashMap<String, Vec<String>>,
    is_fitted: bool,
}

impl CategoryEncoder {
    /// Create an unfitted encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the vocabulary for each named column.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.vocabularies.clear();

        for &col_name in columns {
            let values = string_values(df, col_name)?;
            let mut vocab: Vec<String> = values.into_iter().collect();
            vocab.sort_unstable();
            vocab.dedup();
            self.vocabularies.insert(col_name.to_string(), vocab);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode one column into its indicator columns, in vocabulary order.
    ///
    /// Every value must belong to the fitted vocabulary; nulls and unseen
    /// categories fail the whole transform.
    pub fn encode_column(&self, df: &DataFrame, col_name: &str) -> Result<Vec<Vec<f64>>> {
        if !self.is_fitted {
            return Err(QosError::NotFitted);
        }

        let vocab = self
            .vocabularies
            .get(col_name)
            .ok_or_else(|| QosError::ColumnNotFound(col_name.to_string()))?;
        let values = string_values(df, col_name)?;

        // Resolve every value to its vocabulary index before building any
        // indicator column, so a bad row fails the transform atomically
        let indices: Vec<usize> = values
            .iter()
            .map(|value| {
                vocab
                    .iter()
                    .position(|v| v == value)
                    .ok_or_else(|| QosError::UnknownCategory {
                        column: col_name.to_string(),
                        value: value.clone(),
                    })
            })
            .collect::<Result<_>>()?;

        let mut indicators = vec![vec![0.0; values.len()]; vocab.len()];
        for (row, &vocab_idx) in indices.iter().enumerate() {
            indicators[vocab_idx][row] = 1.0;
        }

        Ok(indicators)
    }

    /// Fitted vocabulary for a column, sorted
    pub fn vocabulary(&self, col_name: &str) -> Option<&[String]> {
        self.vocabularies.get(col_name).map(|v| v.as_slice())
    }

    /// Whether `fit` has run
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

/// Read a string column, treating nulls as unknown categories.
fn string_values(df: &DataFrame, col_name: &str) -> Result<Vec<String>> {
    let series = df
        .column(col_name)
        .map_err(|_| QosError::ColumnNotFound(col_name.to_string()))?
        .as_materialized_series()
        .clone();
    let chunked = series
        .str()
        .map_err(|e| QosError::DataLoad(format!("column '{col_name}': {e}")))?;

    chunked
        .into_iter()
        .map(|opt| {
            opt.map(str::to_string)
                .ok_or_else(|| QosError::UnknownCategory {
                    column: col_name.to_string(),
                    value: "<null>".to_string(),
                })
        })
        .collect()
}
