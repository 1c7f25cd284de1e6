//! CSV loading.

use crate::error::{PreparationError, Result, ResultExt};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Load a CSV file with a header row.
///
/// Column dtypes are inferred from every row, so a float that first appears
/// late in an integer column still widens it to `Float64`.
///
/// Tries standard loading with `"` quoting first, then falls back to loading
/// without quote handling. Errors from the last attempt are returned.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PreparationError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("data file not found: {}", path.display()),
        )));
    }

    info!("Loading dataset from {}", path.display());

    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => {
            info!("Loaded {} rows x {} columns", df.height(), df.width());
            return Ok(df);
        }
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Without quote handling
    let df = CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(None))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .context(format!("Failed to parse CSV file {}", path.display()))?;

    info!("Loaded {} rows x {} columns", df.height(), df.width());
    Ok(df)
}
