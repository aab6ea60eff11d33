//! SQLite storage for the vendor performance pipeline.
//!
//! [`SqliteStore`] holds the raw fact tables written by ingestion and the
//! summary written by the pipeline. It is both the pipeline's
//! [`FactSource`] and its [`SummarySink`].

mod convert;
pub mod error;
mod store;

use polars::prelude::DataFrame;

use vpa_model::{FactTable, LoadMode};
use vpa_summary::{FactSource, SummaryError, SummarySink};

pub use error::{Result, StoreError};
pub use store::SqliteStore;

impl FactSource for SqliteStore {
    fn load(&self, table: FactTable) -> vpa_summary::Result<DataFrame> {
        self.read_table(table.table_name())
            .map_err(|e| SummaryError::SourceUnavailable {
                table: table.table_name().to_string(),
                message: e.to_string(),
            })
    }
}

impl SummarySink for SqliteStore {
    fn persist(
        &self,
        table: &str,
        df: &DataFrame,
        mode: LoadMode,
    ) -> vpa_summary::Result<usize> {
        self.write_frame(table, df, mode)
            .map_err(|e| SummaryError::PersistenceFailure {
                table: table.to_string(),
                message: e.to_string(),
            })
    }
}
