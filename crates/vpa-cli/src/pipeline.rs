//! Ingest and summary stages behind the `vpa` subcommands.
//!
//! 1. **Ingest**: read every CSV extract in the data directory, validate it,
//!    and load it into the SQLite store under its file stem
//! 2. **Summary**: aggregate the fact tables in the store, resolve missing
//!    values, compute metrics and persist the summary table

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use polars::prelude::{CsvWriter, SerWriter};
use tracing::{info, info_span, warn};

use vpa_ingest::{list_csv_files, read_csv_frame, table_name_for, validate_frame};
use vpa_model::{LoadMode, PipelineConfig};
use vpa_store::SqliteStore;
use vpa_summary::SummaryPipeline;

use crate::types::{IngestResult, SummaryResult, TableIngest};

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Load every CSV extract in `data_dir` into `store`.
///
/// A file that fails to read or write is recorded in
/// [`IngestResult::errors`] and the remaining files are still processed. A
/// missing directory is recorded the same way.
pub fn ingest(
    data_dir: &Path,
    store: &SqliteStore,
    config: &PipelineConfig,
    mode: LoadMode,
    progress: &ProgressBar,
) -> IngestResult {
    let span = info_span!("ingest", data_dir = %data_dir.display());
    let _guard = span.enter();
    let start = Instant::now();
    let mut result = IngestResult {
        data_dir: data_dir.to_path_buf(),
        ..IngestResult::default()
    };

    let files = match list_csv_files(data_dir) {
        Ok(files) => files,
        Err(error) => {
            warn!(%error, "no extracts to ingest");
            result.errors.push(error.to_string());
            return result;
        }
    };
    if files.is_empty() {
        warn!("no CSV files found in data directory");
    }
    progress.set_length(files.len() as u64);

    for path in files {
        let Some(table) = table_name_for(&path) else {
            result
                .errors
                .push(format!("{}: cannot derive a table name", path.display()));
            progress.inc(1);
            continue;
        };
        progress.set_message(table.clone());
        match ingest_file(&path, &table, store, config, mode) {
            Ok(ingested) => result.tables.push(ingested),
            Err(error) => {
                warn!(table = %table, error = %format!("{error:#}"), "failed to ingest table");
                result.errors.push(format!("{}: {error:#}", path.display()));
            }
        }
        progress.inc(1);
    }

    result.duration_ms = millis(start.elapsed());
    info!(
        tables = result.tables.len(),
        rows = result.total_rows(),
        failed = result.errors.len(),
        duration_ms = result.duration_ms,
        "ingestion complete"
    );
    result
}

fn ingest_file(
    path: &Path,
    table: &str,
    store: &SqliteStore,
    config: &PipelineConfig,
    mode: LoadMode,
) -> Result<TableIngest> {
    let start = Instant::now();
    let df = read_csv_frame(path).with_context(|| format!("read {}", path.display()))?;
    let validation = config
        .etl
        .validate_after_load
        .then(|| validate_frame(&df, table, &config.etl, &config.data_quality));
    store
        .write_frame(table, &df, mode)
        .with_context(|| format!("write table {table}"))?;
    let duration_ms = millis(start.elapsed());
    info!(table = %table, rows = df.height(), duration_ms, "ingested table");
    Ok(TableIngest {
        table: table.to_string(),
        source: path.to_path_buf(),
        rows: df.height(),
        columns: df.width(),
        duration_ms,
        validation,
    })
}

// ============================================================================
// Stage 2: Summary
// ============================================================================

/// Options for the summary stage beyond the configuration file.
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    pub output_table: Option<String>,
    pub export_csv: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

/// Build the vendor summary from the fact tables in `store` and persist it
/// back into the same database.
pub fn summarize(
    store: &SqliteStore,
    database: &Path,
    config: &PipelineConfig,
    options: &SummaryOptions,
) -> Result<SummaryResult> {
    let mut pipeline = SummaryPipeline::new(config);
    if let Some(table) = &options.output_table {
        pipeline = pipeline.with_output_table(table.clone());
    }

    let outcome = pipeline.run(store, store)?;

    let exported_csv = match &options.export_csv {
        Some(path) if !outcome.report.empty => {
            let mut frame = outcome.frame.clone();
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            CsvWriter::new(file)
                .include_header(true)
                .finish(&mut frame)
                .with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), rows = frame.height(), "exported summary");
            Some(path.clone())
        }
        _ => None,
    };

    let result = SummaryResult {
        database: database.to_path_buf(),
        report: outcome.report,
        exported_csv,
    };
    if let Some(path) = &options.report {
        write_report(path, &result)?;
    }
    Ok(result)
}

/// Write the run report as pretty JSON.
pub fn write_report(path: &Path, result: &SummaryResult) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer_pretty(file, result)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
