//! Vendor performance analysis CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use vpa_cli::logging::{LogConfig, LogFormat, init_logging, parse_level_filter};
use vpa_model::PipelineConfig;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{load_config, print_config, run_all, run_ingest, run_summary};
use crate::summary::{print_ingest_summary, print_summary_result};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };
    let log_config = log_config_from_cli(&cli, &config);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match &cli.command {
        Command::Ingest(args) => match run_ingest(&config, args) {
            Ok(result) => {
                print_ingest_summary(&result);
                i32::from(result.has_errors())
            }
            Err(error) => fail(&error),
        },
        Command::Summary(args) => match run_summary(&config, args) {
            Ok(result) => {
                print_summary_result(&result);
                0
            }
            Err(error) => fail(&error),
        },
        Command::Run(args) => match run_all(&config, &args.ingest, &args.summary) {
            Ok((ingested, summary)) => {
                print_ingest_summary(&ingested);
                print_summary_result(&summary);
                i32::from(ingested.has_errors())
            }
            Err(error) => fail(&error),
        },
        Command::Config => match print_config(&config) {
            Ok(()) => 0,
            Err(error) => fail(&error),
        },
    };
    std::process::exit(exit_code);
}

fn fail(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration with precedence
/// `--log-level` > `-v/-q` > `RUST_LOG` > `logging.level` > default.
fn log_config_from_cli(cli: &Cli, config: &PipelineConfig) -> LogConfig {
    let mut log_config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    log_config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if !cli.verbosity.is_present()
        && let Some(level) = config.logging.level.as_deref().and_then(parse_level_filter)
    {
        log_config.level_filter = level;
    }
    if let Some(level) = cli.log_level {
        log_config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    log_config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    log_config.log_file = config.logging.file.clone();
    log_config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => log_config.log_file.is_none() && io::stderr().is_terminal(),
    };
    log_config
}
