//! CSV loading for the heart disease dataset

use crate::error::{HeartError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Token the raw dataset uses for an unknown value
pub const MISSING_TOKEN: &str = "?";

/// CSV loader that maps [`MISSING_TOKEN`] to null
#[derive(Debug, Default, Clone, Copy)]
pub struct DataLoader;

impl DataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a CSV file with a header row.
    ///
    /// The schema is inferred from every row, so a stray non-numeric cell
    /// anywhere turns its column into strings. A missing or empty file is a
    /// `DataFormat` error.
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let start = Instant::now();

        if !path.exists() {
            return Err(HeartError::DataFormat(format!(
                "dataset not found at {}",
                path.display()
            )));
        }

        let file = File::open(path)?;
        let parse_opts = CsvParseOptions::default()
            .with_null_values(Some(NullValues::AllColumnsSingle(MISSING_TOKEN.into())));

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| HeartError::DataFormat(format!("{}: {}", path.display(), e)))?;

        if df.height() == 0 {
            return Err(HeartError::DataFormat(format!(
                "dataset at {} has no rows",
                path.display()
            )));
        }

        debug!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded CSV"
        );

        Ok(df)
    }
}

/// Read a column as `f64` values, keeping nulls.
///
/// Nulls already present (missing token) survive as `None`; any value that
/// does not parse as a number is a `DataFormat` error.
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| HeartError::DataFormat(format!("missing column '{}'", name)))?;

    let nulls_before = column.null_count();
    let cast = column
        .cast(&DataType::Float64)
        .map_err(|e| HeartError::DataFormat(format!("column '{}': {}", name, e)))?;

    if cast.null_count() > nulls_before {
        return Err(HeartError::DataFormat(format!(
            "column '{}' contains non-numeric values",
            name
        )));
    }

    Ok(cast.f64()?.into_iter().collect())
}
