use std::path::PathBuf;

use serde::Serialize;

use vpa_ingest::TableValidation;
use vpa_summary::SummaryReport;

/// One CSV extract loaded into the store.
#[derive(Debug, Clone, Serialize)]
pub struct TableIngest {
    pub table: String,
    pub source: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub duration_ms: u64,
    pub validation: Option<TableValidation>,
}

#[derive(Debug, Default, Serialize)]
pub struct IngestResult {
    pub data_dir: PathBuf,
    pub tables: Vec<TableIngest>,
    /// Per-file failures; ingestion continues past them.
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl IngestResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|table| table.rows).sum()
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResult {
    pub database: PathBuf,
    pub report: SummaryReport,
    pub exported_csv: Option<PathBuf>,
}
