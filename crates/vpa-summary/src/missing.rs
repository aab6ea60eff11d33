//! Missing-value resolver.
//!
//! Every column with nulls gets one [`FillStrategy`]: an explicit
//! `column_overrides` entry wins, otherwise numeric columns use
//! `numeric_strategy` and everything else uses `text_strategy`.
//!
//! Fill values for `mean` and `median` come from the column's own non-null
//! values in the frame as it entered the resolver, so the order in which
//! columns are visited never changes a fill.

use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use vpa_model::{FillStrategy, MissingValueConfig, UNKNOWN_SENTINEL};

use crate::error::{Result, SummaryError};
use crate::frame::is_numeric;

/// What the resolver did to one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnResolution {
    pub column: String,
    pub nulls: usize,
    pub strategy: FillStrategy,
    /// Rendered fill value; `None` when nulls were left in place.
    pub fill: Option<String>,
}

/// Per-run summary of null handling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MissingValueReport {
    /// Nulls across all columns before resolution.
    pub total_nulls: usize,
    pub columns: Vec<ColumnResolution>,
}

impl MissingValueReport {
    /// Nulls still present after resolution (`drop`/`flag` columns).
    #[must_use]
    pub fn remaining_nulls(&self) -> usize {
        self.columns
            .iter()
            .filter(|resolution| resolution.fill.is_none())
            .map(|resolution| resolution.nulls)
            .sum()
    }

    /// Columns left with nulls under the `drop` strategy.
    pub fn drop_candidates(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|resolution| resolution.strategy == FillStrategy::Drop)
            .map(|resolution| resolution.column.as_str())
    }
}

/// Resolve null cells column by column.
///
/// Columns without nulls are skipped. Overrides naming absent columns are
/// logged and ignored. Rows are never removed.
pub fn resolve_missing_values(
    df: &DataFrame,
    config: &MissingValueConfig,
) -> Result<(DataFrame, MissingValueReport)> {
    for column in config.column_overrides.keys() {
        if df.column(column).is_err() {
            warn!(column = %column, "missing-value override names an absent column");
        }
    }

    let mut report = MissingValueReport::default();
    let mut fills = Vec::new();

    for column in df.get_columns() {
        let nulls = column.null_count();
        if nulls == 0 {
            continue;
        }
        let name = column.name().to_string();
        let numeric = is_numeric(column.dtype());
        let strategy = config.strategy_for(&name, numeric);

        let (expr, fill) = fill_expr(column, strategy)?.unzip();
        match strategy {
            FillStrategy::Drop => {
                warn!(column = %name, nulls, "column has nulls marked for dropping");
            }
            FillStrategy::Flag => {
                debug!(column = %name, nulls, "nulls left in place for flagging");
            }
            _ => {
                debug!(
                    column = %name,
                    nulls,
                    strategy = %strategy,
                    fill = fill.as_deref().unwrap_or_default(),
                    "filled nulls"
                );
            }
        }
        if let Some(expr) = expr {
            fills.push(expr);
        }

        report.total_nulls += nulls;
        report.columns.push(ColumnResolution {
            column: name,
            nulls,
            strategy,
            fill,
        });
    }

    if report.total_nulls > 0 {
        info!(
            nulls = report.total_nulls,
            columns = report.columns.len(),
            remaining = report.remaining_nulls(),
            "handled missing values"
        );
    }

    let resolved = if fills.is_empty() {
        df.clone()
    } else {
        df.clone().lazy().with_columns(fills).collect()?
    };
    Ok((resolved, report))
}

/// Build the fill expression for one column and its rendered fill value.
fn fill_expr(column: &Column, strategy: FillStrategy) -> Result<Option<(Expr, String)>> {
    let name = column.name().as_str();
    let numeric = is_numeric(column.dtype());

    if strategy.requires_numeric() && !numeric {
        return Err(SummaryError::NonNumericFill {
            column: name.to_string(),
            strategy,
        });
    }

    let filled = match strategy {
        FillStrategy::Zero if numeric => (col(name).fill_null(lit(0)), "0".to_string()),
        FillStrategy::Zero => (
            col(name).cast(DataType::String).fill_null(lit("0")),
            "0".to_string(),
        ),
        FillStrategy::Mean | FillStrategy::Median => {
            let series = column.as_materialized_series();
            let statistic = if strategy == FillStrategy::Mean {
                series.mean()
            } else {
                series.median()
            };
            let value = statistic.unwrap_or_else(|| {
                warn!(
                    column = %name,
                    strategy = %strategy,
                    "column has no values, filling with 0"
                );
                0.0
            });
            (col(name).fill_null(lit(value)), value.to_string())
        }
        FillStrategy::Unknown => (
            col(name)
                .cast(DataType::String)
                .fill_null(lit(UNKNOWN_SENTINEL)),
            UNKNOWN_SENTINEL.to_string(),
        ),
        FillStrategy::Drop | FillStrategy::Flag => return Ok(None),
    };
    Ok(Some(filled))
}
