//! SQLite-backed table store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use polars::prelude::{Column, DataFrame};
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use tracing::{debug, info};

use vpa_model::LoadMode;

use crate::convert::{column_from_values, sql_type, to_sql_value};
use crate::error::{Result, StoreError};

/// A single SQLite database holding raw fact tables and summaries.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Quote an identifier for use in SQL text.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// `timeout` bounds how long a statement waits on a locked database.
    pub fn open(path: &Path, timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(timeout)?;
        debug!(path = %path.display(), "opened database");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// A private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: None,
        })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// User tables, sorted by name.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        self.ensure_exists(table)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Write `df` to `table` in one transaction.
    ///
    /// `Replace` drops any existing table first; `Append` creates the table
    /// when missing and inserts after existing rows. Returns rows written.
    pub fn write_frame(&self, table: &str, df: &DataFrame, mode: LoadMode) -> Result<usize> {
        if df.width() == 0 {
            return Err(StoreError::NoColumns {
                table: table.to_string(),
            });
        }

        let quoted = quote_ident(table);
        let columns = df.get_columns();
        let definitions = columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(c.name()), sql_type(c.dtype())))
            .collect::<Vec<_>>()
            .join(", ");
        let names = columns
            .iter()
            .map(|c| quote_ident(c.name()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|idx| format!("?{idx}"))
            .collect::<Vec<_>>()
            .join(", ");

        let tx = self.conn.unchecked_transaction()?;
        if mode == LoadMode::Replace {
            tx.execute(&format!("DROP TABLE IF EXISTS {quoted}"), [])?;
        }
        tx.execute(
            &format!("CREATE TABLE IF NOT EXISTS {quoted} ({definitions})"),
            [],
        )?;
        {
            let mut insert =
                tx.prepare(&format!("INSERT INTO {quoted} ({names}) VALUES ({placeholders})"))?;
            let mut row = Vec::with_capacity(columns.len());
            for idx in 0..df.height() {
                row.clear();
                for column in columns {
                    row.push(to_sql_value(column.get(idx)?));
                }
                insert.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        info!(table = %table, rows = df.height(), mode = %mode, "wrote table");
        Ok(df.height())
    }

    /// Read a whole table into a DataFrame.
    ///
    /// Column types are inferred from the stored values (see
    /// [`column_from_values`]).
    pub fn read_table(&self, table: &str) -> Result<DataFrame> {
        let declared = self.declared_types(table)?;
        let quoted = quote_ident(table);
        let mut stmt = self.conn.prepare(&format!("SELECT * FROM {quoted}"))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (idx, column) in values.iter_mut().enumerate() {
                column.push(row.get::<_, Value>(idx)?);
            }
        }

        let columns: Vec<Column> = names
            .iter()
            .zip(&values)
            .map(|(name, column)| {
                let declared = declared
                    .iter()
                    .find(|(n, _)| n == name)
                    .map_or("", |(_, t)| t.as_str());
                column_from_values(name, column, declared)
            })
            .collect();
        let df = DataFrame::new(columns)?;
        debug!(table = %table, rows = df.height(), columns = df.width(), "read table");
        Ok(df)
    }

    fn declared_types(&self, table: &str) -> Result<Vec<(String, String)>> {
        self.ensure_exists(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let columns = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    fn ensure_exists(&self, table: &str) -> Result<()> {
        if self.table_exists(table)? {
            Ok(())
        } else {
            Err(StoreError::TableNotFound {
                table: table.to_string(),
            })
        }
    }
}
