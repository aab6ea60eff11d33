//! Aggregation query engine.
//!
//! Builds three pre-aggregated views and left-joins them into one row per
//! (vendor, brand) that appears in the purchase aggregate:
//!
//! - **freight**: `vendor_invoice` grouped by vendor, `Freight` summed
//! - **purchases**: `purchases` with `PurchasePrice > 0`, inner-joined to
//!   `purchase_prices` on brand, grouped by vendor/brand identity and price
//! - **sales**: `sales` grouped by (`VendorNo`, `Brand`)
//!
//! Each side is unique on its join key before joining, so the joins never
//! duplicate purchase rows.

use polars::prelude::*;
use tracing::{debug, info};

use vpa_model::FactTable;
use vpa_model::schema::{
    ACTUAL_PRICE, BRAND, DESCRIPTION, DOLLARS, EXCISE_TAX, FREIGHT, FREIGHT_COST, PRICE,
    PURCHASE_PRICE, QUANTITY, SALES_DOLLARS, SALES_PRICE, SALES_QUANTITY, SUMMARY_COLUMNS,
    TOTAL_EXCISE_TAX, TOTAL_PURCHASE_DOLLARS, TOTAL_PURCHASE_QUANTITY, TOTAL_SALES_DOLLARS,
    TOTAL_SALES_PRICE, TOTAL_SALES_QUANTITY, VENDOR_NAME, VENDOR_NO, VENDOR_NUMBER, VOLUME,
};

use crate::error::{Result, SummaryError};
use crate::frame::{is_integer, is_numeric};
use crate::source::FactSource;

/// Monetary columns, always aggregated as floats.
const MONEY_COLUMNS: [&str; 7] = [
    PURCHASE_PRICE,
    DOLLARS,
    PRICE,
    FREIGHT,
    SALES_DOLLARS,
    SALES_PRICE,
    EXCISE_TAX,
];

const QUANTITY_COLUMNS: [&str; 2] = [QUANTITY, SALES_QUANTITY];

const KEY_COLUMNS: [&str; 3] = [VENDOR_NUMBER, VENDOR_NO, BRAND];

/// The raw fact tables, loaded and checked for the columns the engine reads.
#[derive(Debug, Clone)]
pub struct FactFrames {
    pub purchases: DataFrame,
    pub purchase_prices: DataFrame,
    pub sales: DataFrame,
    pub vendor_invoice: DataFrame,
}

impl FactFrames {
    /// Load all four fact tables, failing fast on the first unavailable one.
    pub fn load<S: FactSource + ?Sized>(source: &S) -> Result<Self> {
        Ok(Self {
            purchases: load_table(source, FactTable::Purchases)?,
            purchase_prices: load_table(source, FactTable::PurchasePrices)?,
            sales: load_table(source, FactTable::Sales)?,
            vendor_invoice: load_table(source, FactTable::VendorInvoice)?,
        })
    }
}

fn load_table<S: FactSource + ?Sized>(source: &S, table: FactTable) -> Result<DataFrame> {
    let df = source.load(table)?;
    if let Some(missing) = table
        .required_columns()
        .iter()
        .find(|name| df.column(name).is_err())
    {
        return Err(SummaryError::SourceUnavailable {
            table: table.table_name().to_string(),
            message: format!("missing required column '{missing}'"),
        });
    }
    debug!(table = %table, rows = df.height(), columns = df.width(), "loaded fact table");
    Ok(df)
}

/// Read the fact tables from `source` and build the vendor summary.
pub fn build_vendor_summary<S: FactSource + ?Sized>(source: &S) -> Result<DataFrame> {
    let frames = FactFrames::load(source)?;
    aggregate(&frames)
}

/// Join the three aggregates into the vendor summary, ordered by
/// `TotalPurchaseDollars` descending (ties by vendor, then brand).
///
/// Columns follow [`SUMMARY_COLUMNS`]. Sales and freight columns are null
/// where a purchase key has no matching activity.
pub fn aggregate(frames: &FactFrames) -> Result<DataFrame> {
    if frames.purchases.height() == 0 || frames.purchase_prices.height() == 0 {
        debug!("purchase inputs are empty, nothing to aggregate");
        return empty_summary();
    }

    let purchases = purchase_summary(
        conform(&frames.purchases),
        conform(&frames.purchase_prices),
    );
    let sales = sales_summary(conform(&frames.sales));
    let freight = freight_summary(conform(&frames.vendor_invoice));

    let summary = purchases
        .join(
            sales,
            [col(VENDOR_NUMBER), col(BRAND)],
            [col(VENDOR_NO), col(BRAND)],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            freight,
            [col(VENDOR_NUMBER)],
            [col(VENDOR_NUMBER)],
            JoinArgs::new(JoinType::Left),
        )
        .select(SUMMARY_COLUMNS.iter().map(|name| col(*name)).collect::<Vec<_>>())
        .sort_by_exprs(
            [col(TOTAL_PURCHASE_DOLLARS), col(VENDOR_NUMBER), col(BRAND)],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, false, false])
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;

    info!(
        rows = summary.height(),
        columns = summary.width(),
        "vendor summary aggregated"
    );
    Ok(summary)
}

fn freight_summary(invoices: LazyFrame) -> LazyFrame {
    invoices
        .group_by_stable([col(VENDOR_NUMBER)])
        .agg([sql_sum(FREIGHT).alias(FREIGHT_COST)])
}

fn purchase_summary(purchases: LazyFrame, prices: LazyFrame) -> LazyFrame {
    let prices = prices.select([
        col(BRAND),
        col(PRICE).alias(ACTUAL_PRICE),
        col(VOLUME),
    ]);
    purchases
        .select([
            col(VENDOR_NUMBER),
            col(VENDOR_NAME),
            col(BRAND),
            col(DESCRIPTION),
            col(PURCHASE_PRICE),
            col(QUANTITY),
            col(DOLLARS),
        ])
        .filter(col(PURCHASE_PRICE).gt(lit(0.0)))
        .join(
            prices,
            [col(BRAND)],
            [col(BRAND)],
            JoinArgs::new(JoinType::Inner),
        )
        .group_by_stable([
            col(VENDOR_NUMBER),
            col(VENDOR_NAME),
            col(BRAND),
            col(DESCRIPTION),
            col(PURCHASE_PRICE),
            col(VOLUME),
            col(ACTUAL_PRICE),
        ])
        .agg([
            sql_sum(QUANTITY).alias(TOTAL_PURCHASE_QUANTITY),
            sql_sum(DOLLARS).alias(TOTAL_PURCHASE_DOLLARS),
        ])
}

fn sales_summary(sales: LazyFrame) -> LazyFrame {
    sales
        .group_by_stable([col(VENDOR_NO), col(BRAND)])
        .agg([
            sql_sum(SALES_QUANTITY).alias(TOTAL_SALES_QUANTITY),
            sql_sum(SALES_DOLLARS).alias(TOTAL_SALES_DOLLARS),
            sql_sum(SALES_PRICE).alias(TOTAL_SALES_PRICE),
            sql_sum(EXCISE_TAX).alias(TOTAL_EXCISE_TAX),
        ])
}

/// Group sum that stays null when every value in the group is null.
fn sql_sum(name: &str) -> Expr {
    when(col(name).null_count().lt(col(name).len()))
        .then(col(name).sum())
        .otherwise(lit(NULL))
}

/// Align column types across sources so joins and sums are well defined.
///
/// Keys become `Int64` unless they hold text; money becomes `Float64`;
/// quantities stay integral when they already are.
fn conform(df: &DataFrame) -> LazyFrame {
    let mut casts = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        let dtype = column.dtype();
        if KEY_COLUMNS.contains(&name) {
            let text_key = matches!(dtype, DataType::String) && df.height() > 0;
            if !text_key && dtype != &DataType::Int64 {
                casts.push(col(name).cast(DataType::Int64));
            }
        } else if MONEY_COLUMNS.contains(&name) {
            if dtype != &DataType::Float64 {
                casts.push(col(name).cast(DataType::Float64));
            }
        } else if QUANTITY_COLUMNS.contains(&name) && !is_integer(dtype) {
            let target = if is_numeric(dtype) || df.height() > 0 {
                DataType::Float64
            } else {
                DataType::Int64
            };
            casts.push(col(name).cast(target));
        }
    }
    df.clone().lazy().with_columns(casts)
}

fn empty_summary() -> Result<DataFrame> {
    let columns = SUMMARY_COLUMNS
        .iter()
        .map(|name| {
            let dtype = match *name {
                VENDOR_NUMBER | BRAND => DataType::Int64,
                VENDOR_NAME | DESCRIPTION => DataType::String,
                _ => DataType::Float64,
            };
            Column::new_empty((*name).into(), &dtype)
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}
