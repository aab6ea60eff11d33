//! Pipeline configuration.
//!
//! The configuration is an immutable value: it is loaded once per run and
//! passed by reference into every stage. Every key is optional in the TOML
//! file; missing keys fall back to the defaults documented on each field.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::options::{FillStrategy, LoadMode};

const MAX_DECIMAL_PLACES: u32 = 15;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub database: DatabaseConfig,
    pub data: DataConfig,
    pub etl: EtlConfig,
    pub data_quality: DataQualityConfig,
    pub missing_values: MissingValueConfig,
    pub metrics: MetricsConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file. Default: `inventory.db`.
    pub path: PathBuf,
    /// Busy timeout applied to the connection. Default: 30 seconds.
    pub timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("inventory.db"),
            timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the raw CSV extracts. Default: `data`.
    pub raw_data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub load_mode: LoadMode,
    /// Validate each table after reading it. Default: true.
    pub validate_after_load: bool,
    /// Minimum expected row counts per table; shortfalls are warnings.
    pub min_row_counts: BTreeMap<String, usize>,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            load_mode: LoadMode::Replace,
            validate_after_load: true,
            min_row_counts: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataQualityConfig {
    /// Columns whose null cells are reported during ingestion.
    pub required_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissingValueConfig {
    /// Strategy for numeric columns without an override. Default: `zero`.
    pub numeric_strategy: FillStrategy,
    /// Strategy for non-numeric columns without an override. Default: `unknown`.
    pub text_strategy: FillStrategy,
    /// Per-column strategies; these win over the type-based defaults.
    pub column_overrides: BTreeMap<String, FillStrategy>,
}

impl Default for MissingValueConfig {
    fn default() -> Self {
        Self {
            numeric_strategy: FillStrategy::Zero,
            text_strategy: FillStrategy::Unknown,
            column_overrides: BTreeMap::new(),
        }
    }
}

impl MissingValueConfig {
    /// Strategy for a column: explicit override, then the type-based default.
    #[must_use]
    pub fn strategy_for(&self, column: &str, is_numeric: bool) -> FillStrategy {
        if let Some(strategy) = self.column_overrides.get(column) {
            return *strategy;
        }
        if is_numeric {
            self.numeric_strategy
        } else {
            self.text_strategy
        }
    }
}

/// Zero-denominator substitution and rounding for one derived metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPolicy {
    /// Used as the denominator when the natural denominator is zero.
    #[serde(default = "default_zero_replacement")]
    pub zero_replacement: f64,
    pub decimal_places: u32,
}

fn default_zero_replacement() -> f64 {
    1.0
}

impl MetricPolicy {
    #[must_use]
    pub const fn new(zero_replacement: f64, decimal_places: u32) -> Self {
        Self {
            zero_replacement,
            decimal_places,
        }
    }

    fn validate(&self, key: &str) -> Result<()> {
        if !self.zero_replacement.is_finite() || self.zero_replacement == 0.0 {
            return Err(ConfigError::Invalid {
                key: format!("{key}.zero_replacement"),
                message: format!(
                    "must be a finite, non-zero number (got {})",
                    self.zero_replacement
                ),
            });
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ConfigError::Invalid {
                key: format!("{key}.decimal_places"),
                message: format!(
                    "must be at most {MAX_DECIMAL_PLACES} (got {})",
                    self.decimal_places
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Default: replacement 1, 2 decimal places.
    #[serde(deserialize_with = "policy_or_default::profit_margin")]
    pub profit_margin: MetricPolicy,
    /// Default: replacement 1, 4 decimal places.
    #[serde(deserialize_with = "policy_or_default::stock_turnover")]
    pub stock_turnover: MetricPolicy,
    /// Default: replacement 1, 4 decimal places.
    #[serde(deserialize_with = "policy_or_default::sales_to_purchase_ratio")]
    pub sales_to_purchase_ratio: MetricPolicy,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            profit_margin: MetricPolicy::new(1.0, 2),
            stock_turnover: MetricPolicy::new(1.0, 4),
            sales_to_purchase_ratio: MetricPolicy::new(1.0, 4),
        }
    }
}

/// Partial metric tables (`[metrics.stock_turnover] zero_replacement = 2`)
/// keep the per-metric default for whichever key is absent.
mod policy_or_default {
    use serde::{Deserialize, Deserializer};

    use super::MetricPolicy;

    #[derive(Deserialize)]
    struct PartialPolicy {
        zero_replacement: Option<f64>,
        decimal_places: Option<u32>,
    }

    fn merge<'de, D>(deserializer: D, fallback: MetricPolicy) -> Result<MetricPolicy, D::Error>
    where
        D: Deserializer<'de>,
    {
        let partial = PartialPolicy::deserialize(deserializer)?;
        Ok(MetricPolicy {
            zero_replacement: partial
                .zero_replacement
                .unwrap_or(fallback.zero_replacement),
            decimal_places: partial.decimal_places.unwrap_or(fallback.decimal_places),
        })
    }

    pub fn profit_margin<'de, D: Deserializer<'de>>(d: D) -> Result<MetricPolicy, D::Error> {
        merge(d, MetricPolicy::new(1.0, 2))
    }

    pub fn stock_turnover<'de, D: Deserializer<'de>>(d: D) -> Result<MetricPolicy, D::Error> {
        merge(d, MetricPolicy::new(1.0, 4))
    }

    pub fn sales_to_purchase_ratio<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<MetricPolicy, D::Error> {
        merge(d, MetricPolicy::new(1.0, 4))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination table for the vendor summary. Default: `vendor_sales_summary`.
    pub summary_table: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary_table: "vendor_sales_summary".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no CLI flag overrides it (`error` .. `trace`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Log file path; logs go to stderr when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl PipelineConfig {
    /// Load and validate a configuration file.
    ///
    /// Relative paths inside the file are resolved against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.with_base_dir(base_dir))
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Toml {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve relative database, data and log paths against `base_dir`.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        };
        resolve(&mut self.database.path);
        resolve(&mut self.data.raw_data_dir);
        if let Some(file) = self.logging.file.as_mut() {
            resolve(file);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.metrics.profit_margin.validate("metrics.profit_margin")?;
        self.metrics
            .stock_turnover
            .validate("metrics.stock_turnover")?;
        self.metrics
            .sales_to_purchase_ratio
            .validate("metrics.sales_to_purchase_ratio")?;
        if self.output.summary_table.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "output.summary_table".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = PipelineConfig::from_toml_str("").expect("parse empty config");
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.metrics.profit_margin.decimal_places, 2);
        assert_eq!(config.metrics.stock_turnover.decimal_places, 4);
        assert_eq!(config.output.summary_table, "vendor_sales_summary");
    }

    #[test]
    fn override_beats_type_default() {
        let mut missing = MissingValueConfig::default();
        missing
            .column_overrides
            .insert("FreightCost".to_string(), FillStrategy::Median);
        assert_eq!(
            missing.strategy_for("FreightCost", true),
            FillStrategy::Median
        );
        assert_eq!(missing.strategy_for("TotalSalesDollars", true), FillStrategy::Zero);
        assert_eq!(missing.strategy_for("VendorName", false), FillStrategy::Unknown);
    }

    #[test]
    fn zero_replacement_of_zero_is_rejected() {
        let err = PipelineConfig::from_toml_str(
            "[metrics.profit_margin]\nzero_replacement = 0.0\n",
        )
        .expect_err("zero replacement must be rejected");
        assert!(err.to_string().contains("metrics.profit_margin.zero_replacement"));
    }
}
