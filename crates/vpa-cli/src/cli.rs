//! CLI argument definitions for the `vpa` pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use vpa_model::LoadMode;

#[derive(Parser)]
#[command(
    name = "vpa",
    version,
    about = "Vendor performance analysis - ingest extracts and build the vendor summary",
    long_about = "Load vendor purchase, sales and invoice CSV extracts into SQLite and build\n\
                  a per-vendor/brand performance summary with profitability metrics."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pipeline configuration file (default: config/pipeline.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides database.path).
    #[arg(long = "database", value_name = "PATH", global = true)]
    pub database: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and logging.level).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr (overrides logging.file).
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the CSV extracts into the database.
    Ingest(IngestArgs),

    /// Build the vendor summary table from the loaded fact tables.
    Summary(SummaryArgs),

    /// Ingest, then build the summary.
    Run(RunArgs),

    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Args, Clone, Default)]
pub struct IngestArgs {
    /// Directory with the raw CSV extracts (overrides data.raw_data_dir).
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Replace or append to existing tables (overrides etl.load_mode).
    #[arg(long = "load-mode", value_enum)]
    pub load_mode: Option<LoadModeArg>,
}

#[derive(Args, Clone, Default)]
pub struct SummaryArgs {
    /// Destination table (overrides output.summary_table).
    #[arg(long = "output-table", value_name = "NAME")]
    pub output_table: Option<String>,

    /// Also write the summary to a CSV file.
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Write a JSON run report.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Args, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub ingest: IngestArgs,

    #[command(flatten)]
    pub summary: SummaryArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LoadModeArg {
    Replace,
    Append,
}

impl From<LoadModeArg> for LoadMode {
    fn from(value: LoadModeArg) -> Self {
        match value {
            LoadModeArg::Replace => LoadMode::Replace,
            LoadModeArg::Append => LoadMode::Append,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
