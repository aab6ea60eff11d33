//! Where the aggregation engine reads fact tables from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;

use vpa_ingest::read_csv_frame;
use vpa_model::FactTable;

use crate::error::{Result, SummaryError};

/// Read access to the raw fact tables.
///
/// A table that cannot be produced is reported as
/// [`SummaryError::SourceUnavailable`]; implementations never substitute an
/// empty frame for a missing table.
pub trait FactSource {
    fn load(&self, table: FactTable) -> Result<DataFrame>;
}

/// Fact tables already held in memory.
#[derive(Debug, Clone, Default)]
pub struct FrameSource {
    frames: BTreeMap<FactTable, DataFrame>,
}

impl FrameSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(mut self, table: FactTable, df: DataFrame) -> Self {
        self.insert(table, df);
        self
    }

    pub fn insert(&mut self, table: FactTable, df: DataFrame) {
        self.frames.insert(table, df);
    }
}

impl FactSource for FrameSource {
    fn load(&self, table: FactTable) -> Result<DataFrame> {
        self.frames
            .get(&table)
            .cloned()
            .ok_or_else(|| SummaryError::SourceUnavailable {
                table: table.table_name().to_string(),
                message: "no frame registered".to_string(),
            })
    }
}

/// Reads `<dir>/<table>.csv` for each fact table.
#[derive(Debug, Clone)]
pub struct CsvFactSource {
    dir: PathBuf,
}

impl CsvFactSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, table: FactTable) -> PathBuf {
        self.dir.join(format!("{}.csv", table.table_name()))
    }
}

impl FactSource for CsvFactSource {
    fn load(&self, table: FactTable) -> Result<DataFrame> {
        read_csv_frame(&self.path_for(table)).map_err(|e| SummaryError::SourceUnavailable {
            table: table.table_name().to_string(),
            message: e.to_string(),
        })
    }
}

impl<S: FactSource + ?Sized> FactSource for &S {
    fn load(&self, table: FactTable) -> Result<DataFrame> {
        (**self).load(table)
    }
}
