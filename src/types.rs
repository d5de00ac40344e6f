use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One line as it appears in an outlet's source file. Everything is kept as
/// an optional string here; the loader is responsible for coercing the
/// numeric columns and tolerating whatever the export put in them.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Total Before Tax")]
    pub total_before_tax: Option<String>,
    #[serde(rename = "Total After Tax")]
    pub total_after_tax: Option<String>,
    // Present in sales exports only; returns exports omit the column.
    #[serde(rename = "Tax", default)]
    pub tax: Option<String>,
}

/// A cleaned transaction line tagged with the outlet it came from.
///
/// Invariants maintained by the loader: `outlet` is always a catalog key,
/// the numeric fields are finite and never NaN, and when the returns
/// variant is active they are additionally non-negative.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub outlet: String,
    pub description: Option<String>,
    pub total_before_tax: f64,
    pub total_after_tax: f64,
    pub tax: f64,
}

impl TransactionRecord {
    /// Display form of the description; blank descriptions stay a distinct
    /// group in rankings rather than being dropped.
    pub fn description_label(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => "(no description)",
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ItemRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Description")]
    #[tabled(rename = "Description")]
    pub description: String,
    #[serde(rename = "TotalAfterTax")]
    #[tabled(rename = "TotalAfterTax")]
    pub total_after_tax: String,
}

/// One slice of the cross-tabulated ranking: a top-N description broken
/// down into the subtotal contributed by a single outlet.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ItemOutletRow {
    #[serde(rename = "Description")]
    #[tabled(rename = "Description")]
    pub description: String,
    #[serde(rename = "Outlet")]
    #[tabled(rename = "Outlet")]
    pub outlet: String,
    #[serde(rename = "TotalAfterTax")]
    #[tabled(rename = "TotalAfterTax")]
    pub total_after_tax: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct OutletSummaryRow {
    #[serde(rename = "Outlet")]
    #[tabled(rename = "Outlet")]
    pub outlet: String,
    #[serde(rename = "TotalBeforeTax")]
    #[tabled(rename = "TotalBeforeTax")]
    pub total_before_tax: String,
    #[serde(rename = "TotalAfterTax")]
    #[tabled(rename = "TotalAfterTax")]
    pub total_after_tax: String,
}

/// Full-detail dump of the current view, one row per transaction line.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DetailRow {
    #[serde(rename = "Outlet")]
    #[tabled(rename = "Outlet")]
    pub outlet: String,
    #[serde(rename = "Description")]
    #[tabled(rename = "Description")]
    pub description: String,
    #[serde(rename = "TotalBeforeTax")]
    #[tabled(rename = "TotalBeforeTax")]
    pub total_before_tax: String,
    #[serde(rename = "TotalAfterTax")]
    #[tabled(rename = "TotalAfterTax")]
    pub total_after_tax: String,
    #[serde(rename = "Tax")]
    #[tabled(rename = "Tax")]
    pub tax: String,
}

/// Scalar totals over the current view. `total_tax` is only populated when
/// the active variant includes the tax column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarTotals {
    pub total_before_tax: f64,
    pub total_after_tax: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub selection: String,
    pub row_count: usize,
    pub outlet_count: usize,
    pub totals: ScalarTotals,
}
