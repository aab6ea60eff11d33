//! Content fingerprint of a summary frame.

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// SHA-256 (hex) of the frame rendered as CSV with a header row.
///
/// Identical column names, column order and values give identical
/// fingerprints, so two runs over unchanged inputs can be compared cheaply.
pub fn frame_fingerprint(df: &DataFrame) -> Result<String> {
    let mut frame = df.clone();
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut frame)?;
    Ok(hex::encode(Sha256::digest(&buffer)))
}
