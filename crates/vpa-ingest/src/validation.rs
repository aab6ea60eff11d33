//! Post-load table validation.
//!
//! Validation never rejects a table: shortfalls are logged as warnings and
//! returned in [`TableValidation`] so callers can report them.

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{info, warn};

use vpa_model::{DataQualityConfig, EtlConfig, FactTable};

/// Outcome of validating one loaded table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableValidation {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
    /// Configured minimum row count, when the table is below it.
    pub below_minimum: Option<usize>,
    /// Required-quality columns that contain nulls, with their null counts.
    pub null_columns: Vec<(String, usize)>,
    /// Expected extract columns absent from a known fact table.
    pub missing_columns: Vec<String>,
}

impl TableValidation {
    #[must_use]
    pub fn warning_count(&self) -> usize {
        usize::from(self.below_minimum.is_some())
            + self.null_columns.len()
            + self.missing_columns.len()
    }
}

/// Columns from `expected` that are not present in `df`.
pub fn missing_columns(df: &DataFrame, expected: &[&str]) -> Vec<String> {
    expected
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| (*name).to_string())
        .collect()
}

/// Validate a loaded table against row-count, null, and layout expectations.
pub fn validate_frame(
    df: &DataFrame,
    table: &str,
    etl: &EtlConfig,
    quality: &DataQualityConfig,
) -> TableValidation {
    let mut validation = TableValidation {
        table: table.to_string(),
        rows: df.height(),
        columns: df.width(),
        ..TableValidation::default()
    };

    if let Some(&minimum) = etl.min_row_counts.get(table)
        && df.height() < minimum
    {
        warn!(
            table = %table,
            rows = df.height(),
            expected_min = minimum,
            "table has fewer rows than expected"
        );
        validation.below_minimum = Some(minimum);
    }

    for name in &quality.required_columns {
        let Ok(column) = df.column(name) else {
            continue;
        };
        let nulls = column.null_count();
        if nulls > 0 {
            warn!(table = %table, column = %name, nulls, "required column has null values");
            validation.null_columns.push((name.clone(), nulls));
        }
    }

    if let Some(fact) = FactTable::from_table_name(table) {
        validation.missing_columns = missing_columns(df, fact.expected_columns());
        if !validation.missing_columns.is_empty() {
            warn!(
                table = %table,
                missing = ?validation.missing_columns,
                "extract is missing expected columns"
            );
        }
    }

    info!(
        table = %table,
        rows = validation.rows,
        columns = validation.columns,
        "validated table"
    );
    validation
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use polars::prelude::{Column, DataFrame};

    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("VendorNumber".into(), vec![Some(1i64), None, Some(3)]),
            Column::new("Freight".into(), vec![1.5f64, 2.0, 0.25]),
        ])
        .expect("build frame")
    }

    #[test]
    fn reports_short_tables_and_null_required_columns() {
        let etl = EtlConfig {
            min_row_counts: BTreeMap::from([("vendor_invoice".to_string(), 5)]),
            ..EtlConfig::default()
        };
        let quality = DataQualityConfig {
            required_columns: vec!["VendorNumber".to_string(), "Absent".to_string()],
        };

        let validation = validate_frame(&frame(), "vendor_invoice", &etl, &quality);

        assert_eq!(validation.rows, 3);
        assert_eq!(validation.columns, 2);
        assert_eq!(validation.below_minimum, Some(5));
        assert_eq!(validation.null_columns, vec![("VendorNumber".to_string(), 1)]);
        assert!(validation.missing_columns.contains(&"Approval".to_string()));
        assert!(!validation.missing_columns.contains(&"Freight".to_string()));
    }

    #[test]
    fn unknown_tables_skip_layout_check() {
        let validation = validate_frame(
            &frame(),
            "begin_inventory",
            &EtlConfig::default(),
            &DataQualityConfig::default(),
        );
        assert!(validation.missing_columns.is_empty());
        assert_eq!(validation.warning_count(), 0);
    }
}
