//! CSV ingestion and export

use crate::error::{QosError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Load a CSV dataset with a header row. Unreadable or malformed input
/// surfaces as a `DataLoad` error carrying the underlying cause.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| QosError::DataLoad(format!("cannot open {}: {e}", path.display())))?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| QosError::DataLoad(format!("cannot parse {}: {e}", path.display())))
}

/// Write a dataset to CSV with a header row and no index column.
pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .map_err(|e| QosError::DataLoad(format!("cannot create {}: {e}", path.display())))?;

    CsvWriter::new(&mut file)
        .finish(df)
        .map_err(|e| QosError::DataLoad(format!("cannot write {}: {e}", path.display())))
}
