//! CSV readers.

use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Reads a CSV extract into a Polars DataFrame.
///
/// The first row is the header. Column types are inferred from every row, so
/// a decimal that first appears deep in a money column still makes it a float.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Reads only the header record of a CSV file.
///
/// Header names are trimmed and stripped of a leading byte-order mark.
pub fn read_csv_headers(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| IngestError::Header {
            path: path.to_path_buf(),
            source,
        })?;
    let headers = reader.headers().map_err(|source| IngestError::Header {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(headers
        .iter()
        .map(|header| header.trim().trim_matches('\u{feff}').to_string())
        .collect())
}
