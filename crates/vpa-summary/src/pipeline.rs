//! Summary orchestrator.
//!
//! Runs the linear stage sequence
//! `Aggregate -> Resolve -> Compute -> Persist`. An empty aggregate ends the
//! run early with a warning and nothing is persisted. Any stage failure
//! aborts the run as a [`PipelineError`] naming the stage; nothing is retried.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{error, info, info_span, warn};

use vpa_model::{LoadMode, MetricsConfig, MissingValueConfig, PipelineConfig};

use crate::aggregate::build_vendor_summary;
use crate::error::{PipelineError, Result, Stage};
use crate::fingerprint::frame_fingerprint;
use crate::metrics::compute_metrics;
use crate::missing::{MissingValueReport, resolve_missing_values};
use crate::normalize::{cast_volume, trim_identity_columns};
use crate::sink::SummarySink;
use crate::source::FactSource;

/// Wall-clock time spent in one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTiming {
    pub stage: Stage,
    pub duration_ms: u64,
}

impl StageTiming {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Serializable account of one summary run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub started_at: DateTime<Utc>,
    pub output_table: String,
    pub load_mode: LoadMode,
    /// True when the aggregate was empty and later stages were skipped.
    pub empty: bool,
    pub rows: usize,
    pub columns: usize,
    pub rows_written: usize,
    pub stages: Vec<StageTiming>,
    pub missing_values: MissingValueReport,
    /// SHA-256 of the final frame; `None` for empty runs.
    pub fingerprint: Option<String>,
}

impl SummaryReport {
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(StageTiming::duration).sum()
    }

    #[must_use]
    pub fn timing(&self, stage: Stage) -> Option<&StageTiming> {
        self.stages.iter().find(|timing| timing.stage == stage)
    }
}

/// Result of a successful run: the final frame and its report.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub frame: DataFrame,
    pub report: SummaryReport,
}

/// Configured summary run.
#[derive(Debug, Clone)]
pub struct SummaryPipeline {
    missing_values: MissingValueConfig,
    metrics: MetricsConfig,
    output_table: String,
    load_mode: LoadMode,
}

impl SummaryPipeline {
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            missing_values: config.missing_values.clone(),
            metrics: config.metrics.clone(),
            output_table: config.output.summary_table.clone(),
            load_mode: config.etl.load_mode,
        }
    }

    /// Persist to `table` instead of the configured summary table.
    #[must_use]
    pub fn with_output_table(mut self, table: impl Into<String>) -> Self {
        self.output_table = table.into();
        self
    }

    #[must_use]
    pub fn with_load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }

    #[must_use]
    pub fn output_table(&self) -> &str {
        &self.output_table
    }

    /// Build, clean, enrich and persist the vendor summary.
    pub fn run<S, K>(&self, source: &S, sink: &K) -> Result<SummaryOutcome, PipelineError>
    where
        S: FactSource + ?Sized,
        K: SummarySink + ?Sized,
    {
        let started_at = Utc::now();
        let mut stages = Vec::with_capacity(Stage::ALL.len());
        info!(table = %self.output_table, mode = %self.load_mode, "starting vendor summary");

        let summary = timed(Stage::Aggregate, &mut stages, || build_vendor_summary(source))?;

        if summary.height() == 0 {
            warn!("vendor summary is empty; check that the raw data was ingested");
            return Ok(SummaryOutcome {
                report: SummaryReport {
                    started_at,
                    output_table: self.output_table.clone(),
                    load_mode: self.load_mode,
                    empty: true,
                    rows: 0,
                    columns: summary.width(),
                    rows_written: 0,
                    stages,
                    missing_values: MissingValueReport::default(),
                    fingerprint: None,
                },
                frame: summary,
            });
        }

        let (resolved, missing_values) =
            timed(Stage::Resolve, &mut stages, || self.resolve(summary))?;
        let enriched = timed(Stage::Compute, &mut stages, || {
            compute_metrics(&resolved, &self.metrics)
        })?;
        let rows_written = timed(Stage::Persist, &mut stages, || {
            sink.persist(&self.output_table, &enriched, self.load_mode)
        })?;

        let fingerprint =
            frame_fingerprint(&enriched).map_err(|e| PipelineError::new(Stage::Persist, e))?;
        let report = SummaryReport {
            started_at,
            output_table: self.output_table.clone(),
            load_mode: self.load_mode,
            empty: false,
            rows: enriched.height(),
            columns: enriched.width(),
            rows_written,
            stages,
            missing_values,
            fingerprint: Some(fingerprint),
        };
        info!(
            table = %report.output_table,
            rows = report.rows,
            columns = report.columns,
            duration_ms = millis(report.total_duration()),
            "vendor summary complete"
        );
        Ok(SummaryOutcome {
            frame: enriched,
            report,
        })
    }

    fn resolve(&self, mut df: DataFrame) -> Result<(DataFrame, MissingValueReport)> {
        cast_volume(&mut df)?;
        let (mut resolved, report) = resolve_missing_values(&df, &self.missing_values)?;
        trim_identity_columns(&mut resolved)?;
        Ok((resolved, report))
    }
}

/// Run one stage inside its span, recording its duration.
fn timed<T>(
    stage: Stage,
    stages: &mut Vec<StageTiming>,
    run: impl FnOnce() -> Result<T>,
) -> Result<T, PipelineError> {
    let span = info_span!("stage", stage = %stage);
    let _guard = span.enter();
    let start = Instant::now();
    let result = run();
    let duration_ms = millis(start.elapsed());
    stages.push(StageTiming { stage, duration_ms });
    match result {
        Ok(value) => {
            info!(duration_ms, "stage finished");
            Ok(value)
        }
        Err(source) => {
            error!(error = %source, duration_ms, "stage failed");
            Err(PipelineError::new(stage, source))
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
