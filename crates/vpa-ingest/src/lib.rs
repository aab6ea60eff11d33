//! CSV ingestion for the vendor performance pipeline.
//!
//! - **discovery**: find CSV extracts in the raw data directory
//! - **reader**: read an extract into a Polars `DataFrame`
//! - **validation**: row-count, null, and layout checks on a loaded table

pub mod discovery;
pub mod error;
pub mod reader;
pub mod validation;

pub use discovery::{list_csv_files, table_name_for};
pub use error::{IngestError, Result};
pub use reader::{read_csv_frame, read_csv_headers};
pub use validation::{TableValidation, missing_columns, validate_frame};
