//! End-to-end tests: CSV extracts -> SQLite -> vendor summary.

use std::fs;
use std::path::Path;
use std::time::Duration;

use indicatif::ProgressBar;
use tempfile::TempDir;

use vpa_cli::pipeline::{SummaryOptions, ingest, summarize};
use vpa_model::{LoadMode, PipelineConfig};
use vpa_store::SqliteStore;

fn write_extracts(dir: &Path) {
    fs::write(
        dir.join("purchases.csv"),
        "InventoryId,Store,Brand,Description,Size,VendorNumber,VendorName,PONumber,PODate,\
         ReceivingDate,InvoiceDate,PayDate,PurchasePrice,Quantity,Dollars,Classification\n\
         69_MOUNTMEND_8412,69,8412,Tequila Ocho Plata Fresno,750mL,105,ALTAMAR BRANDS LLC   ,\
         8124,2023-12-21,2024-01-02,2024-01-04,2024-02-16,35.71,6,214.26,1\n\
         30_CULCHETH_5255,30,5255,TGI Fridays Ultimte Mudslide,1.75L,4466,AMERICAN VINTAGE BEVERAGE  ,\
         8137,2023-12-22,2024-01-01,2024-01-07,2024-02-21,9.35,4,37.40,1\n\
         34_PITMERDEN_5215,34,5215,TGI Fridays Long Island Iced,1.75L,4466,AMERICAN VINTAGE BEVERAGE  ,\
         8137,2023-12-22,2024-01-02,2024-01-07,2024-02-21,9.41,5,47.05,1\n\
         1_HARDERSFIELD_5255,1,5255,TGI Fridays Ultimte Mudslide,1.75L,4466,AMERICAN VINTAGE BEVERAGE  ,\
         8169,2023-12-24,2024-01-02,2024-01-09,2024-02-16,0,3,0,1\n",
    )
    .unwrap();
    fs::write(
        dir.join("purchase_prices.csv"),
        "Brand,Description,Price,Size,Volume,Classification,PurchasePrice,VendorNumber,VendorName\n\
         8412,Tequila Ocho Plata Fresno,49.99,750mL,750,1,35.71,105,ALTAMAR BRANDS LLC\n\
         5255,TGI Fridays Ultimte Mudslide,12.99,1.75L,1750,1,9.35,4466,AMERICAN VINTAGE BEVERAGE\n\
         5215,TGI Fridays Long Island Iced,12.99,1.75L,1750,1,9.41,4466,AMERICAN VINTAGE BEVERAGE\n",
    )
    .unwrap();
    fs::write(
        dir.join("sales.csv"),
        "InventoryId,Store,Brand,Description,Size,SalesQuantity,SalesDollars,SalesPrice,SalesDate,\
         Volume,Classification,ExciseTax,VendorNo,VendorName\n\
         1_HARDERSFIELD_8412,1,8412,Tequila Ocho Plata Fresno,750mL,1,49.99,49.99,2024-01-01,750,1,0.79,105,ALTAMAR BRANDS LLC\n\
         1_HARDERSFIELD_8412,1,8412,Tequila Ocho Plata Fresno,750mL,2,99.98,49.99,2024-01-02,750,1,1.57,105,ALTAMAR BRANDS LLC\n\
         1_HARDERSFIELD_5255,1,5255,TGI Fridays Ultimte Mudslide,1.75L,3,38.97,12.99,2024-01-02,1750,1,1.84,4466,AMERICAN VINTAGE BEVERAGE\n",
    )
    .unwrap();
    fs::write(
        dir.join("vendor_invoice.csv"),
        "VendorNumber,VendorName,InvoiceDate,PONumber,PODate,PayDate,Quantity,Dollars,Freight,Approval\n\
         105,ALTAMAR BRANDS LLC,2024-01-04,8124,2023-12-21,2024-02-16,6,214.26,3.47,None\n\
         4466,AMERICAN VINTAGE BEVERAGE,2024-01-07,8137,2023-12-22,2024-02-21,9,84.45,0.44,None\n\
         4466,AMERICAN VINTAGE BEVERAGE,2024-01-09,8169,2023-12-24,2024-02-16,3,28.05,0.17,None\n",
    )
    .unwrap();
}

fn setup() -> (TempDir, PipelineConfig) {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir(&data_dir).unwrap();
    write_extracts(&data_dir);
    let mut config = PipelineConfig::default();
    config.data.raw_data_dir = data_dir;
    config.database.path = dir.path().join("inventory.db");
    (dir, config)
}

fn open(config: &PipelineConfig) -> SqliteStore {
    SqliteStore::open(&config.database.path, Duration::from_secs(5)).unwrap()
}

#[test]
fn ingest_loads_every_extract_and_continues_past_failures() {
    let (_dir, config) = setup();
    fs::write(config.data.raw_data_dir.join("begin_inventory.csv"), "").unwrap();
    let store = open(&config);

    let result = ingest(
        &config.data.raw_data_dir,
        &store,
        &config,
        LoadMode::Replace,
        &ProgressBar::hidden(),
    );

    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert!(result.errors[0].contains("begin_inventory.csv"));
    let tables: Vec<&str> = result.tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(
        tables,
        vec!["purchase_prices", "purchases", "sales", "vendor_invoice"]
    );
    assert_eq!(store.row_count("purchases").unwrap(), 4);
    assert_eq!(result.total_rows(), 13);
    let invoice = result
        .tables
        .iter()
        .find(|t| t.table == "vendor_invoice")
        .unwrap();
    assert_eq!(invoice.validation.as_ref().unwrap().warning_count(), 0);
}

#[test]
fn missing_data_directory_is_reported() {
    let (dir, config) = setup();
    let store = open(&config);

    let result = ingest(
        &dir.path().join("absent"),
        &store,
        &config,
        LoadMode::Replace,
        &ProgressBar::hidden(),
    );

    assert!(result.has_errors());
    assert!(result.tables.is_empty());
}

#[test]
fn summary_is_persisted_exported_and_reproducible() {
    let (dir, config) = setup();
    let store = open(&config);
    ingest(
        &config.data.raw_data_dir,
        &store,
        &config,
        LoadMode::Replace,
        &ProgressBar::hidden(),
    );
    let options = SummaryOptions {
        output_table: None,
        export_csv: Some(dir.path().join("summary.csv")),
        report: Some(dir.path().join("report.json")),
    };

    let first = summarize(&store, &config.database.path, &config, &options).unwrap();
    let second = summarize(&store, &config.database.path, &config, &options).unwrap();

    assert_eq!(first.report.rows, 3);
    assert_eq!(first.report.rows_written, 3);
    assert_eq!(first.report.fingerprint, second.report.fingerprint);
    assert_eq!(store.row_count("vendor_sales_summary").unwrap(), 3);

    let persisted = store.read_table("vendor_sales_summary").unwrap();
    let names: Vec<Option<&str>> = persisted
        .column("VendorName")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        names,
        vec![
            Some("ALTAMAR BRANDS LLC"),
            Some("AMERICAN VINTAGE BEVERAGE"),
            Some("AMERICAN VINTAGE BEVERAGE"),
        ]
    );
    let freight: Vec<Option<f64>> = persisted
        .column("FreightCost")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(freight, vec![Some(3.47), Some(0.61), Some(0.61)]);

    let exported = fs::read_to_string(dir.path().join("summary.csv")).unwrap();
    assert!(exported.starts_with("VendorNumber,VendorName,Brand,Description"));
    assert_eq!(exported.lines().count(), 4);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["report"]["rows"], 3);
    assert_eq!(report["report"]["load_mode"], "replace");
    assert_eq!(report["report"]["stages"].as_array().unwrap().len(), 4);
}

#[test]
fn summary_without_fact_tables_fails() {
    let (_dir, config) = setup();
    let store = open(&config);

    let error = summarize(
        &store,
        &config.database.path,
        &config,
        &SummaryOptions::default(),
    )
    .unwrap_err();

    assert!(format!("{error:#}").contains("aggregate stage failed"));
}
