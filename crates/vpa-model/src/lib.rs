//! Shared model types for the vendor performance pipeline.
//!
//! - **config**: the immutable [`PipelineConfig`] loaded once per run
//! - **options**: fill strategies and load modes
//! - **schema**: fact tables and summary column names

pub mod config;
pub mod error;
pub mod options;
pub mod schema;

pub use config::{
    DataConfig, DataQualityConfig, DatabaseConfig, EtlConfig, LoggingConfig, MetricPolicy,
    MetricsConfig, MissingValueConfig, OutputConfig, PipelineConfig,
};
pub use error::{ConfigError, Result};
pub use options::{FillStrategy, LoadMode, UNKNOWN_SENTINEL};
pub use schema::FactTable;
