use polars::prelude::*;
use proptest::prelude::*;

use vpa_model::{MetricPolicy, MetricsConfig};
use vpa_summary::{compute_metrics, denominator, round_to};

fn floats(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(Option::unwrap)
        .collect()
}

/// Amounts with a healthy share of exact zeros.
fn amount() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        4 => -1.0e6..1.0e6f64,
    ]
}

fn policy() -> impl Strategy<Value = MetricPolicy> {
    (prop_oneof![Just(1.0), 0.5..10.0f64], 0u32..6).prop_map(|(zero_replacement, places)| {
        MetricPolicy::new(zero_replacement, places)
    })
}

proptest! {
    #[test]
    fn metrics_follow_zero_substitution_laws(
        rows in prop::collection::vec((amount(), amount(), amount(), amount()), 1..40),
        margin in policy(),
        turnover in policy(),
        ratio in policy(),
    ) {
        let config = MetricsConfig {
            profit_margin: margin,
            stock_turnover: turnover,
            sales_to_purchase_ratio: ratio,
        };
        let df = DataFrame::new(vec![
            Column::new("TotalSalesDollars".into(), rows.iter().map(|r| r.0).collect::<Vec<_>>()),
            Column::new("TotalPurchaseDollars".into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
            Column::new("TotalSalesQuantity".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
            Column::new("TotalPurchaseQuantity".into(), rows.iter().map(|r| r.3).collect::<Vec<_>>()),
        ])
        .unwrap();

        let out = compute_metrics(&df, &config).unwrap();
        prop_assert_eq!(out.height(), rows.len());

        let gross = floats(&out, "GrossProfit");
        let margins = floats(&out, "ProfitMargin");
        let turnovers = floats(&out, "StockTurnover");
        let ratios = floats(&out, "Sales_To_Purchase_Ratio");

        for (idx, &(sales, purchases, sold, bought)) in rows.iter().enumerate() {
            prop_assert_eq!(gross[idx], sales - purchases);

            let margin_denom = if sales == 0.0 { margin.zero_replacement } else { sales };
            prop_assert_eq!(
                margins[idx],
                round_to((sales - purchases) / margin_denom * 100.0, margin.decimal_places)
            );

            let turnover_denom = if bought == 0.0 { turnover.zero_replacement } else { bought };
            prop_assert_eq!(turnovers[idx], round_to(sold / turnover_denom, turnover.decimal_places));

            prop_assert_eq!(
                ratios[idx],
                round_to(sales / denominator(purchases, ratio.zero_replacement), ratio.decimal_places)
            );

            prop_assert!(margins[idx].is_finite());
            prop_assert!(turnovers[idx].is_finite());
            prop_assert!(ratios[idx].is_finite());
        }
    }

    #[test]
    fn rounding_is_within_half_a_unit(value in -1.0e6..1.0e6f64, places in 0u32..6) {
        let rounded = round_to(value, places);
        let unit = 10f64.powi(-(places as i32));
        prop_assert!((rounded - value).abs() <= unit / 2.0 + 1e-9);
    }
}

#[test]
fn integer_totals_are_accepted() {
    let df = DataFrame::new(vec![
        Column::new("TotalSalesDollars".into(), vec![0.0, 50.0]),
        Column::new("TotalPurchaseDollars".into(), vec![10.0, 0.0]),
        Column::new("TotalSalesQuantity".into(), vec![7i64, 0]),
        Column::new("TotalPurchaseQuantity".into(), vec![0i64, 3]),
    ])
    .unwrap();

    let out = compute_metrics(&df, &MetricsConfig::default()).unwrap();

    assert_eq!(floats(&out, "GrossProfit"), vec![-10.0, 50.0]);
    assert_eq!(floats(&out, "ProfitMargin"), vec![-1000.0, 100.0]);
    assert_eq!(floats(&out, "StockTurnover"), vec![7.0, 0.0]);
    assert_eq!(floats(&out, "Sales_To_Purchase_Ratio"), vec![0.0, 50.0]);
}

#[test]
fn ties_round_half_to_even() {
    let df = DataFrame::new(vec![
        Column::new("TotalSalesDollars".into(), vec![800.0, 800.0]),
        Column::new("TotalPurchaseDollars".into(), vec![799.0, 797.0]),
        Column::new("TotalSalesQuantity".into(), vec![1i64, 3]),
        Column::new("TotalPurchaseQuantity".into(), vec![32i64, 32]),
    ])
    .unwrap();

    let out = compute_metrics(&df, &MetricsConfig::default()).unwrap();

    assert_eq!(floats(&out, "GrossProfit"), vec![1.0, 3.0]);
    assert_eq!(floats(&out, "ProfitMargin"), vec![0.12, 0.38]);
    assert_eq!(floats(&out, "StockTurnover"), vec![0.0312, 0.0938]);
    assert_eq!(floats(&out, "Sales_To_Purchase_Ratio"), vec![1.0013, 1.0038]);
}

#[test]
fn whole_number_precision_rounds_margins_to_even() {
    let config = MetricsConfig {
        profit_margin: MetricPolicy::new(1.0, 0),
        ..MetricsConfig::default()
    };
    let df = DataFrame::new(vec![
        Column::new("TotalSalesDollars".into(), vec![8.0, 8.0, 5.0]),
        Column::new("TotalPurchaseDollars".into(), vec![7.0, 5.0, 8.0]),
        Column::new("TotalSalesQuantity".into(), vec![0i64, 0, 0]),
        Column::new("TotalPurchaseQuantity".into(), vec![1i64, 1, 1]),
    ])
    .unwrap();

    let out = compute_metrics(&df, &config).unwrap();

    assert_eq!(floats(&out, "ProfitMargin"), vec![12.0, 38.0, -60.0]);
}
