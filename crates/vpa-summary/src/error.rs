//! Error types for the summary pipeline.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use vpa_model::FillStrategy;

/// Linear stages of a summary run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Aggregate,
    Resolve,
    Compute,
    Persist,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Self::Aggregate,
        Self::Resolve,
        Self::Compute,
        Self::Persist,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggregate => "aggregate",
            Self::Resolve => "resolve",
            Self::Compute => "compute",
            Self::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the summary stages and their collaborators.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// A fact table could not be read, or lacks a column the engine needs.
    #[error("fact table '{table}' unavailable: {message}")]
    SourceUnavailable { table: String, message: String },

    /// A column required by a stage is absent from the working frame.
    #[error("{stage} stage requires column '{column}', which is missing")]
    SchemaViolation { stage: Stage, column: String },

    /// `mean`/`median` was configured for a column without numeric values.
    #[error("cannot apply '{strategy}' fill to non-numeric column '{column}'")]
    NonNumericFill {
        column: String,
        strategy: FillStrategy,
    },

    /// Writing the summary to its destination failed.
    #[error("failed to persist table '{table}': {message}")]
    PersistenceFailure { table: String, message: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for SummaryError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// A stage failure, carrying the stage it aborted.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: SummaryError,
}

impl PipelineError {
    #[must_use]
    pub fn new(stage: Stage, source: SummaryError) -> Self {
        Self { stage, source }
    }
}

/// Result type for summary operations.
pub type Result<T, E = SummaryError> = std::result::Result<T, E>;
