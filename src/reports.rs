// Pure aggregation over the combined dataset.
//
// Every function here is stateless: it takes a view (the full dataset or a
// filtered slice) and returns freshly computed values. Nothing raises on
// malformed or empty input; empty views aggregate to zeros and empty
// tables, matching the loader's coerce-to-zero policy.
use crate::catalog::Selection;
use crate::types::{
    DetailRow, ItemOutletRow, ItemRankingRow, OutletSummaryRow, ScalarTotals, SummaryStats,
    TransactionRecord,
};
use crate::util::format_number;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Narrow the combined dataset to the current selection. "All" is the
/// identity; a specific outlet matches the injected tag exactly, and an
/// outlet with no rows simply yields an empty view.
pub fn filter_view(data: &[TransactionRecord], selection: &Selection) -> Vec<TransactionRecord> {
    match selection {
        Selection::All => data.to_vec(),
        Selection::Outlet(name) => data.iter().filter(|r| r.outlet == *name).cloned().collect(),
    }
}

pub fn scalar_totals(view: &[TransactionRecord], include_tax: bool) -> ScalarTotals {
    ScalarTotals {
        total_before_tax: view.iter().map(|r| r.total_before_tax).sum(),
        total_after_tax: view.iter().map(|r| r.total_after_tax).sum(),
        total_tax: if include_tax {
            Some(view.iter().map(|r| r.tax).sum())
        } else {
            None
        },
    }
}

/// Sum after-tax value per item description and keep the `top_n` largest.
///
/// Blank descriptions aggregate into their own group rather than being
/// dropped. Order among exact ties follows first appearance in the view.
pub fn rank_items(view: &[TransactionRecord], top_n: usize) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();
    for r in view {
        let label = r.description_label().to_string();
        if !sums.contains_key(&label) {
            order.push(label.clone());
        }
        *sums.entry(label).or_insert(0.0) += r.total_after_tax;
    }
    let mut ranked: Vec<(String, f64)> = order
        .into_iter()
        .map(|label| {
            let sum = sums[&label];
            (label, sum)
        })
        .collect();
    // Stable sort keeps first-appearance order among equal sums.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(top_n);
    ranked
}

/// Cross-tabulate the global top-N descriptions by outlet: the ranking is
/// computed over the whole view first, then each ranked description is
/// expanded into per-outlet subtotals. Outlets with no rows for a
/// description do not appear in its breakdown.
pub fn item_outlet_breakdown(
    view: &[TransactionRecord],
    top_n: usize,
) -> Vec<(String, String, f64)> {
    let ranked = rank_items(view, top_n);
    let top_set: HashSet<&str> = ranked.iter().map(|(d, _)| d.as_str()).collect();

    let mut per_outlet: HashMap<(String, String), f64> = HashMap::new();
    for r in view {
        let label = r.description_label();
        if !top_set.contains(label) {
            continue;
        }
        *per_outlet
            .entry((label.to_string(), r.outlet.clone()))
            .or_insert(0.0) += r.total_after_tax;
    }

    let mut rows: Vec<(String, String, f64)> = Vec::new();
    for (description, _) in &ranked {
        let mut slices: Vec<(String, f64)> = per_outlet
            .iter()
            .filter(|((d, _), _)| d == description)
            .map(|((_, outlet), sum)| (outlet.clone(), *sum))
            .collect();
        slices.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        for (outlet, sum) in slices {
            rows.push((description.clone(), outlet, sum));
        }
    }
    rows
}

/// Per-outlet subtotals over the full combined dataset, sorted descending
/// by after-tax total. Every outlet that contributed at least one row is
/// present, even if its sums are zero.
pub fn outlet_totals(data: &[TransactionRecord]) -> Vec<(String, f64, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (f64, f64)> = HashMap::new();
    for r in data {
        if !sums.contains_key(&r.outlet) {
            order.push(r.outlet.clone());
        }
        let e = sums.entry(r.outlet.clone()).or_insert((0.0, 0.0));
        e.0 += r.total_before_tax;
        e.1 += r.total_after_tax;
    }
    let mut rows: Vec<(String, f64, f64)> = order
        .into_iter()
        .map(|outlet| {
            let (before, after) = sums[&outlet];
            (outlet, before, after)
        })
        .collect();
    rows.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
    rows
}

pub fn item_ranking_rows(ranked: &[(String, f64)]) -> Vec<ItemRankingRow> {
    ranked
        .iter()
        .enumerate()
        .map(|(idx, (description, sum))| ItemRankingRow {
            rank: idx + 1,
            description: description.clone(),
            total_after_tax: format_number(*sum, 2),
        })
        .collect()
}

pub fn item_outlet_rows(breakdown: &[(String, String, f64)]) -> Vec<ItemOutletRow> {
    breakdown
        .iter()
        .map(|(description, outlet, sum)| ItemOutletRow {
            description: description.clone(),
            outlet: outlet.clone(),
            total_after_tax: format_number(*sum, 2),
        })
        .collect()
}

pub fn outlet_summary_rows(totals: &[(String, f64, f64)]) -> Vec<OutletSummaryRow> {
    totals
        .iter()
        .map(|(outlet, before, after)| OutletSummaryRow {
            outlet: outlet.clone(),
            total_before_tax: format_number(*before, 2),
            total_after_tax: format_number(*after, 2),
        })
        .collect()
}

pub fn detail_rows(view: &[TransactionRecord]) -> Vec<DetailRow> {
    view.iter()
        .map(|r| DetailRow {
            outlet: r.outlet.clone(),
            description: r.description_label().to_string(),
            total_before_tax: format_number(r.total_before_tax, 2),
            total_after_tax: format_number(r.total_after_tax, 2),
            tax: format_number(r.tax, 2),
        })
        .collect()
}

pub fn generate_summary(
    view: &[TransactionRecord],
    selection: &Selection,
    include_tax: bool,
) -> SummaryStats {
    let outlets: HashSet<&str> = view.iter().map(|r| r.outlet.as_str()).collect();
    SummaryStats {
        selection: selection.label().to_string(),
        row_count: view.len(),
        outlet_count: outlets.len(),
        totals: scalar_totals(view, include_tax),
    }
}
