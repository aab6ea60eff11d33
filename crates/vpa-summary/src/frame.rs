//! Small DataFrame helpers shared by the stages.

use polars::prelude::{DataFrame, DataType};

use crate::error::{Result, SummaryError, Stage};

/// Whether values of `dtype` take part in numeric fills and metrics.
pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

pub(crate) fn is_integer(dtype: &DataType) -> bool {
    is_numeric(dtype) && !matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Fail with a schema violation naming the first absent column.
pub(crate) fn require_columns(df: &DataFrame, stage: Stage, columns: &[&str]) -> Result<()> {
    match columns.iter().find(|name| df.column(name).is_err()) {
        Some(missing) => Err(SummaryError::SchemaViolation {
            stage,
            column: (*missing).to_string(),
        }),
        None => Ok(()),
    }
}
