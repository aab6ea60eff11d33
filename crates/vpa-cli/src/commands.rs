//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use vpa_cli::pipeline::{SummaryOptions, ingest, summarize};
use vpa_cli::types::{IngestResult, SummaryResult};
use vpa_model::{LoadMode, PipelineConfig};
use vpa_store::SqliteStore;

use crate::cli::{Cli, IngestArgs, SummaryArgs};

const DEFAULT_CONFIG: &str = "config/pipeline.toml";

/// Load the configuration named on the command line, the default file when
/// present, or the built-in defaults; then apply CLI overrides.
pub fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("load configuration {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).is_file() => {
            PipelineConfig::load(Path::new(DEFAULT_CONFIG))
                .with_context(|| format!("load configuration {DEFAULT_CONFIG}"))?
        }
        None => PipelineConfig::default(),
    };
    if let Some(database) = &cli.database {
        config.database.path = database.clone();
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
    Ok(config)
}

fn open_store(config: &PipelineConfig) -> Result<SqliteStore> {
    SqliteStore::open(&config.database.path, config.database.timeout())
        .with_context(|| format!("open database {}", config.database.path.display()))
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("  Ingesting {bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    bar
}

fn ingest_with(store: &SqliteStore, config: &PipelineConfig, args: &IngestArgs) -> IngestResult {
    let data_dir: PathBuf = args
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.raw_data_dir.clone());
    let mode = args.load_mode.map_or(config.etl.load_mode, LoadMode::from);
    let progress = progress_bar();
    let result = ingest(&data_dir, store, config, mode, &progress);
    progress.finish_and_clear();
    result
}

fn summary_options(args: &SummaryArgs) -> SummaryOptions {
    SummaryOptions {
        output_table: args.output_table.clone(),
        export_csv: args.export_csv.clone(),
        report: args.report.clone(),
    }
}

pub fn run_ingest(config: &PipelineConfig, args: &IngestArgs) -> Result<IngestResult> {
    let store = open_store(config)?;
    Ok(ingest_with(&store, config, args))
}

pub fn run_summary(config: &PipelineConfig, args: &SummaryArgs) -> Result<SummaryResult> {
    let store = open_store(config)?;
    summarize(
        &store,
        &config.database.path,
        config,
        &summary_options(args),
    )
}

pub fn run_all(
    config: &PipelineConfig,
    ingest_args: &IngestArgs,
    summary_args: &SummaryArgs,
) -> Result<(IngestResult, SummaryResult)> {
    let store = open_store(config)?;
    let ingested = ingest_with(&store, config, ingest_args);
    let summary = summarize(
        &store,
        &config.database.path,
        config,
        &summary_options(summary_args),
    )?;
    Ok((ingested, summary))
}

pub fn print_config(config: &PipelineConfig) -> Result<()> {
    let rendered = config.to_toml_string().context("render configuration")?;
    print!("{rendered}");
    Ok(())
}
