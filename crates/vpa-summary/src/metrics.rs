//! Derived profitability metrics.
//!
//! | Column                    | Formula                                             |
//! |---------------------------|-----------------------------------------------------|
//! | `GrossProfit`             | `TotalSalesDollars - TotalPurchaseDollars`          |
//! | `ProfitMargin`            | `GrossProfit / denom(TotalSalesDollars) * 100`      |
//! | `StockTurnover`           | `TotalSalesQuantity / denom(TotalPurchaseQuantity)` |
//! | `Sales_To_Purchase_Ratio` | `TotalSalesDollars / denom(TotalPurchaseDollars)`   |
//!
//! `denom(x)` is `x` unless it is zero, in which case the metric's
//! configured `zero_replacement` is used. Only the denominator is ever
//! substituted. `GrossProfit` is exact; the ratios are rounded half-to-even
//! to each metric's `decimal_places`. A null input yields a null metric.

use polars::prelude::*;
use tracing::info;

use vpa_model::schema::{
    GROSS_PROFIT, PROFIT_MARGIN, SALES_TO_PURCHASE_RATIO, STOCK_TURNOVER,
    TOTAL_PURCHASE_DOLLARS, TOTAL_PURCHASE_QUANTITY, TOTAL_SALES_DOLLARS, TOTAL_SALES_QUANTITY,
};
use vpa_model::{MetricPolicy, MetricsConfig};

use crate::error::{Result, Stage};
use crate::frame::require_columns;

/// Columns read by [`compute_metrics`].
pub const METRIC_INPUTS: [&str; 4] = [
    TOTAL_SALES_DOLLARS,
    TOTAL_PURCHASE_DOLLARS,
    TOTAL_SALES_QUANTITY,
    TOTAL_PURCHASE_QUANTITY,
];

/// The natural denominator, or `zero_replacement` when it is zero.
#[must_use]
pub fn denominator(value: f64, zero_replacement: f64) -> f64 {
    if value == 0.0 { zero_replacement } else { value }
}

/// Round half-to-even at `places` decimals.
#[must_use]
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(places).unwrap_or(i32::MAX));
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / factor
}

fn ratio(numerator: f64, denom: f64, policy: &MetricPolicy, scale: f64) -> f64 {
    round_to(
        numerator / denominator(denom, policy.zero_replacement) * scale,
        policy.decimal_places,
    )
}

fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// Append the four metric columns, replacing any existing ones.
///
/// Fails with a schema violation when an input column is absent.
pub fn compute_metrics(df: &DataFrame, config: &MetricsConfig) -> Result<DataFrame> {
    require_columns(df, Stage::Compute, &METRIC_INPUTS)?;

    let sales_dollars = float_values(df, TOTAL_SALES_DOLLARS)?;
    let purchase_dollars = float_values(df, TOTAL_PURCHASE_DOLLARS)?;
    let sales_quantity = float_values(df, TOTAL_SALES_QUANTITY)?;
    let purchase_quantity = float_values(df, TOTAL_PURCHASE_QUANTITY)?;

    let rows = df.height();
    let mut gross_profit = Vec::with_capacity(rows);
    let mut profit_margin = Vec::with_capacity(rows);
    let mut stock_turnover = Vec::with_capacity(rows);
    let mut sales_to_purchase = Vec::with_capacity(rows);

    for idx in 0..rows {
        let profit = match (sales_dollars[idx], purchase_dollars[idx]) {
            (Some(sales), Some(purchases)) => Some(sales - purchases),
            _ => None,
        };
        gross_profit.push(profit);
        profit_margin.push(
            profit
                .zip(sales_dollars[idx])
                .map(|(p, s)| ratio(p, s, &config.profit_margin, 100.0)),
        );
        stock_turnover.push(
            sales_quantity[idx]
                .zip(purchase_quantity[idx])
                .map(|(s, p)| ratio(s, p, &config.stock_turnover, 1.0)),
        );
        sales_to_purchase.push(
            sales_dollars[idx]
                .zip(purchase_dollars[idx])
                .map(|(s, p)| ratio(s, p, &config.sales_to_purchase_ratio, 1.0)),
        );
    }

    let mut out = df.clone();
    out.with_column(Column::new(GROSS_PROFIT.into(), gross_profit))?;
    out.with_column(Column::new(PROFIT_MARGIN.into(), profit_margin))?;
    out.with_column(Column::new(STOCK_TURNOVER.into(), stock_turnover))?;
    out.with_column(Column::new(SALES_TO_PURCHASE_RATIO.into(), sales_to_purchase))?;

    info!(rows, "calculated metrics");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominator_uses_replacement() {
        assert_eq!(denominator(0.0, 1.0), 1.0);
        assert_eq!(denominator(-0.0, 2.5), 2.5);
        assert_eq!(denominator(4.0, 1.0), 4.0);
    }

    #[test]
    fn rounds_half_to_even() {
        assert_eq!(round_to(16.666_666, 2), 16.67);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(-100_000.0, 2), -100_000.0);
        assert_eq!(round_to(2.5, 0), 2.0);
    }

    #[test]
    fn missing_input_is_a_schema_violation() {
        let df = DataFrame::new(vec![
            Column::new(TOTAL_SALES_DOLLARS.into(), vec![1.0]),
            Column::new(TOTAL_PURCHASE_DOLLARS.into(), vec![1.0]),
            Column::new(TOTAL_SALES_QUANTITY.into(), vec![1.0]),
        ])
        .unwrap();
        let err = compute_metrics(&df, &MetricsConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::SummaryError::SchemaViolation { stage: Stage::Compute, ref column }
                if column == TOTAL_PURCHASE_QUANTITY
        ));
    }
}
