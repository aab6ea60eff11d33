//! Tests for loading pipeline configuration files.

use std::fs;

use vpa_model::{ConfigError, FillStrategy, LoadMode, PipelineConfig};

const SAMPLE: &str = r#"
[database]
path = "inventory.db"
timeout_secs = 5

[data]
raw_data_dir = "data"

[etl]
load_mode = "append"
min_row_counts = { purchases = 10 }

[missing_values]
numeric_strategy = "median"

[missing_values.column_overrides]
FreightCost = "flag"
Description = "drop"

[metrics.stock_turnover]
zero_replacement = 2.5

[output]
summary_table = "vendor_summary_v2"

[logging]
level = "debug"
file = "logs/pipeline.log"
"#;

#[test]
fn loads_file_and_resolves_relative_paths() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("pipeline.toml");
    fs::write(&path, SAMPLE).expect("write config");

    let config = PipelineConfig::load(&path).expect("load config");

    assert_eq!(config.database.path, dir.path().join("inventory.db"));
    assert_eq!(config.database.timeout().as_secs(), 5);
    assert_eq!(config.data.raw_data_dir, dir.path().join("data"));
    assert_eq!(
        config.logging.file.as_deref(),
        Some(dir.path().join("logs/pipeline.log").as_path())
    );
    assert_eq!(config.etl.load_mode, LoadMode::Append);
    assert!(config.etl.validate_after_load);
    assert_eq!(config.etl.min_row_counts.get("purchases"), Some(&10));
    assert_eq!(config.output.summary_table, "vendor_summary_v2");
}

#[test]
fn partial_metric_table_keeps_remaining_defaults() {
    let config = PipelineConfig::from_toml_str(SAMPLE).expect("parse config");

    assert_eq!(config.metrics.stock_turnover.zero_replacement, 2.5);
    assert_eq!(config.metrics.stock_turnover.decimal_places, 4);
    assert_eq!(config.metrics.profit_margin.zero_replacement, 1.0);
    assert_eq!(config.metrics.profit_margin.decimal_places, 2);
}

#[test]
fn strategies_follow_override_precedence() {
    let config = PipelineConfig::from_toml_str(SAMPLE).expect("parse config");
    let missing = &config.missing_values;

    assert_eq!(missing.strategy_for("FreightCost", true), FillStrategy::Flag);
    assert_eq!(missing.strategy_for("Description", false), FillStrategy::Drop);
    assert_eq!(
        missing.strategy_for("TotalSalesDollars", true),
        FillStrategy::Median
    );
    assert_eq!(
        missing.strategy_for("VendorName", false),
        FillStrategy::Unknown
    );
}

#[test]
fn unknown_strategy_names_the_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[missing_values]\nnumeric_strategy = \"average\"\n")
        .expect("write config");

    let err = PipelineConfig::load(&path).expect_err("unknown strategy must fail");

    assert!(matches!(err, ConfigError::Toml { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = PipelineConfig::load(&dir.path().join("absent.toml"))
        .expect_err("missing file must fail");
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn effective_config_serializes_back_to_toml() {
    let config = PipelineConfig::from_toml_str(SAMPLE).expect("parse config");
    let rendered = config.to_toml_string().expect("render config");
    let reparsed = PipelineConfig::from_toml_str(&rendered).expect("reparse config");
    assert_eq!(reparsed, config);
}

#[test]
fn shipped_config_is_valid() {
    let path =
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/pipeline.toml");
    let config = PipelineConfig::load(&path).unwrap();

    assert_eq!(config.etl.load_mode, LoadMode::Replace);
    assert_eq!(config.output.summary_table, "vendor_sales_summary");
    assert_eq!(config.missing_values.strategy_for("Volume", true), FillStrategy::Median);
    assert!(config.database.path.ends_with("data/inventory.db"));
}
