//! Fact tables and the column names of the vendor summary.
//!
//! Column names follow the source extracts exactly (mixed case, no
//! normalization), so they double as SQL column names in the store.

use std::fmt;

pub const VENDOR_NUMBER: &str = "VendorNumber";
pub const VENDOR_NAME: &str = "VendorName";
pub const VENDOR_NO: &str = "VendorNo";
pub const BRAND: &str = "Brand";
pub const DESCRIPTION: &str = "Description";
pub const PURCHASE_PRICE: &str = "PurchasePrice";
pub const PRICE: &str = "Price";
pub const VOLUME: &str = "Volume";
pub const QUANTITY: &str = "Quantity";
pub const DOLLARS: &str = "Dollars";
pub const FREIGHT: &str = "Freight";
pub const SALES_QUANTITY: &str = "SalesQuantity";
pub const SALES_DOLLARS: &str = "SalesDollars";
pub const SALES_PRICE: &str = "SalesPrice";
pub const EXCISE_TAX: &str = "ExciseTax";

pub const ACTUAL_PRICE: &str = "ActualPrice";
pub const TOTAL_PURCHASE_QUANTITY: &str = "TotalPurchaseQuantity";
pub const TOTAL_PURCHASE_DOLLARS: &str = "TotalPurchaseDollars";
pub const TOTAL_SALES_QUANTITY: &str = "TotalSalesQuantity";
pub const TOTAL_SALES_DOLLARS: &str = "TotalSalesDollars";
pub const TOTAL_SALES_PRICE: &str = "TotalSalesPrice";
pub const TOTAL_EXCISE_TAX: &str = "TotalExciseTax";
pub const FREIGHT_COST: &str = "FreightCost";

pub const GROSS_PROFIT: &str = "GrossProfit";
pub const PROFIT_MARGIN: &str = "ProfitMargin";
pub const STOCK_TURNOVER: &str = "StockTurnover";
pub const SALES_TO_PURCHASE_RATIO: &str = "Sales_To_Purchase_Ratio";

/// Columns of the joined summary, in output order.
pub const SUMMARY_COLUMNS: [&str; 14] = [
    VENDOR_NUMBER,
    VENDOR_NAME,
    BRAND,
    DESCRIPTION,
    PURCHASE_PRICE,
    VOLUME,
    ACTUAL_PRICE,
    TOTAL_PURCHASE_QUANTITY,
    TOTAL_PURCHASE_DOLLARS,
    TOTAL_SALES_QUANTITY,
    TOTAL_SALES_DOLLARS,
    TOTAL_SALES_PRICE,
    TOTAL_EXCISE_TAX,
    FREIGHT_COST,
];

/// Derived metric columns appended after the summary columns.
pub const METRIC_COLUMNS: [&str; 4] = [
    GROSS_PROFIT,
    PROFIT_MARGIN,
    STOCK_TURNOVER,
    SALES_TO_PURCHASE_RATIO,
];

/// Identity text columns that get whitespace trimming during resolution.
pub const TEXT_IDENTITY_COLUMNS: [&str; 2] = [VENDOR_NAME, DESCRIPTION];

/// Raw extract tables consumed by the aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FactTable {
    Purchases,
    Sales,
    VendorInvoice,
    PurchasePrices,
}

impl FactTable {
    pub const ALL: [FactTable; 4] = [
        Self::Purchases,
        Self::Sales,
        Self::VendorInvoice,
        Self::PurchasePrices,
    ];

    /// Table (and CSV file stem) name.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Purchases => "purchases",
            Self::Sales => "sales",
            Self::VendorInvoice => "vendor_invoice",
            Self::PurchasePrices => "purchase_prices",
        }
    }

    #[must_use]
    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|table| table.table_name().eq_ignore_ascii_case(name.trim()))
    }

    /// Columns the aggregation engine reads from this table.
    #[must_use]
    pub const fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::Purchases => &[
                VENDOR_NUMBER,
                VENDOR_NAME,
                BRAND,
                DESCRIPTION,
                PURCHASE_PRICE,
                QUANTITY,
                DOLLARS,
            ],
            Self::Sales => &[
                VENDOR_NO,
                BRAND,
                SALES_QUANTITY,
                SALES_DOLLARS,
                SALES_PRICE,
                EXCISE_TAX,
            ],
            Self::VendorInvoice => &[VENDOR_NUMBER, FREIGHT],
            Self::PurchasePrices => &[BRAND, PRICE, VOLUME],
        }
    }

    /// Full column layout of the raw extract.
    ///
    /// Missing columns here are reported at ingestion but only
    /// [`required_columns`](Self::required_columns) are fatal.
    #[must_use]
    pub const fn expected_columns(self) -> &'static [&'static str] {
        match self {
            Self::Purchases => &[
                "InventoryId",
                "Store",
                BRAND,
                DESCRIPTION,
                "Size",
                VENDOR_NUMBER,
                VENDOR_NAME,
                "PONumber",
                "PODate",
                "ReceivingDate",
                "InvoiceDate",
                "PayDate",
                PURCHASE_PRICE,
                QUANTITY,
                DOLLARS,
                "Classification",
            ],
            Self::Sales => &[
                "InventoryId",
                "Store",
                BRAND,
                DESCRIPTION,
                "Size",
                SALES_QUANTITY,
                SALES_DOLLARS,
                SALES_PRICE,
                "SalesDate",
                VOLUME,
                "Classification",
                EXCISE_TAX,
                VENDOR_NO,
                VENDOR_NAME,
            ],
            Self::VendorInvoice => &[
                VENDOR_NUMBER,
                VENDOR_NAME,
                "InvoiceDate",
                "PONumber",
                "PODate",
                "PayDate",
                QUANTITY,
                DOLLARS,
                FREIGHT,
                "Approval",
            ],
            Self::PurchasePrices => &[
                BRAND,
                DESCRIPTION,
                PRICE,
                "Size",
                VOLUME,
                "Classification",
                PURCHASE_PRICE,
                VENDOR_NUMBER,
                VENDOR_NAME,
            ],
        }
    }
}

impl fmt::Display for FactTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_columns_are_part_of_expected_layout() {
        for table in FactTable::ALL {
            for column in table.required_columns() {
                assert!(
                    table.expected_columns().contains(column),
                    "{table}: {column} missing from expected layout"
                );
            }
        }
    }

    #[test]
    fn table_names_resolve_back() {
        assert_eq!(
            FactTable::from_table_name("Vendor_Invoice"),
            Some(FactTable::VendorInvoice)
        );
        assert_eq!(FactTable::from_table_name("begin_inventory"), None);
    }
}
