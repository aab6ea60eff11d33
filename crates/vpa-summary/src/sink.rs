//! Destination for the finished summary.

use std::cell::RefCell;
use std::collections::BTreeMap;

use polars::prelude::DataFrame;

use vpa_model::LoadMode;

use crate::error::{Result, SummaryError};

/// Write access to the summary's destination table.
pub trait SummarySink {
    /// Persist `df` under `table`, returning the number of rows written.
    ///
    /// Failures are reported as [`SummaryError::PersistenceFailure`].
    fn persist(&self, table: &str, df: &DataFrame, mode: LoadMode) -> Result<usize>;
}

impl<K: SummarySink + ?Sized> SummarySink for &K {
    fn persist(&self, table: &str, df: &DataFrame, mode: LoadMode) -> Result<usize> {
        (**self).persist(table, df, mode)
    }
}

/// Keeps the last persisted frame per table in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: RefCell<BTreeMap<String, DataFrame>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<DataFrame> {
        self.tables.borrow().get(name).cloned()
    }
}

impl SummarySink for MemorySink {
    fn persist(&self, table: &str, df: &DataFrame, mode: LoadMode) -> Result<usize> {
        let rows = df.height();
        let mut tables = self.tables.borrow_mut();
        if mode == LoadMode::Append
            && let Some(existing) = tables.get_mut(table)
        {
            existing
                .vstack_mut(df)
                .map_err(|e| SummaryError::PersistenceFailure {
                    table: table.to_string(),
                    message: e.to_string(),
                })?;
        } else {
            tables.insert(table.to_string(), df.clone());
        }
        Ok(rows)
    }
}
