//! Vendor summary core: aggregation, missing-value resolution, metrics.
//!
//! - **aggregate**: join freight, purchase and sales aggregates per vendor/brand
//! - **missing**: per-column null resolution driven by configuration
//! - **normalize**: `Volume` cast and identity text trimming
//! - **metrics**: derived profitability columns with zero-denominator policy
//! - **pipeline**: the staged run, its timings and report
//! - **source** / **sink**: where fact tables come from and where the summary goes

pub mod aggregate;
pub mod error;
pub mod fingerprint;
mod frame;
pub mod metrics;
pub mod missing;
pub mod normalize;
pub mod pipeline;
pub mod sink;
pub mod source;

pub use aggregate::{FactFrames, aggregate, build_vendor_summary};
pub use error::{PipelineError, Result, Stage, SummaryError};
pub use fingerprint::frame_fingerprint;
pub use metrics::{METRIC_INPUTS, compute_metrics, denominator, round_to};
pub use missing::{ColumnResolution, MissingValueReport, resolve_missing_values};
pub use normalize::{cast_volume, trim_identity_columns};
pub use pipeline::{StageTiming, SummaryOutcome, SummaryPipeline, SummaryReport};
pub use sink::{MemorySink, SummarySink};
pub use source::{CsvFactSource, FactSource, FrameSource};
