//! Pure aggregation over sales records.
//!
//! Everything here is a total function of its inputs: records are borrowed
//! immutably, nothing is cached, and identical inputs give identical outputs.
//! Absent `sales`/`profit` values are skipped, never counted as zero, and a
//! zero sales total yields a zero margin instead of NaN.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{CategoryTotals, DashboardMetrics, SalesRecord, Selection, Totals};

pub mod monthly;

pub use monthly::{daily_sales, monthly_sales};

/// Records of `category` whose sub-category is in `sub_categories`, in input order.
///
/// An empty `sub_categories` slice selects nothing.
pub fn filter<'a>(
    records: &'a [SalesRecord],
    category: &str,
    sub_categories: &[String],
) -> Vec<&'a SalesRecord> {
    if sub_categories.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| r.category == category && sub_categories.iter().any(|s| *s == r.sub_category))
        .collect()
}

/// [`filter`] driven by a [`Selection`].
pub fn filter_selection<'a>(records: &'a [SalesRecord], selection: &Selection) -> Vec<&'a SalesRecord> {
    filter(records, &selection.category, &selection.sub_categories)
}

/// Sum present `sales` and `profit` values.
pub fn totals<'a, I>(records: I) -> Totals
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    records.into_iter().fold(Totals::default(), |mut acc, r| {
        if let Some(sales) = r.sales {
            acc.sales += sales;
        }
        if let Some(profit) = r.profit {
            acc.profit += profit;
        }
        acc
    })
}

/// Profit as a percentage of sales; `0.0` when `total_sales` is zero.
pub fn profit_margin(total_sales: f64, total_profit: f64) -> f64 {
    if total_sales == 0.0 {
        return 0.0;
    }
    let margin = total_profit / total_sales * 100.0;
    if margin.is_finite() { margin } else { 0.0 }
}

/// Selected margin minus overall margin, in percentage points.
pub fn margin_delta(selected_margin: f64, overall_margin: f64) -> f64 {
    selected_margin - overall_margin
}

/// Scalar metrics for `selection`, compared against the whole collection.
pub fn dashboard_metrics(records: &[SalesRecord], selection: &Selection) -> DashboardMetrics {
    let selected = totals(filter_selection(records, selection));
    let overall = totals(records);

    let profit_margin_pct = profit_margin(selected.sales, selected.profit);
    let overall_margin = profit_margin(overall.sales, overall.profit);

    DashboardMetrics {
        total_sales: selected.sales,
        total_profit: selected.profit,
        profit_margin: profit_margin_pct,
        overall_margin,
        margin_delta: margin_delta(profit_margin_pct, overall_margin),
    }
}

/// Distinct categories in first-seen order.
pub fn categories(records: &[SalesRecord]) -> Vec<String> {
    distinct(records.iter().map(|r| r.category.as_str()))
}

/// Distinct sub-categories of `category`, in first-seen order.
pub fn sub_categories(records: &[SalesRecord], category: &str) -> Vec<String> {
    distinct(
        records
            .iter()
            .filter(|r| r.category == category)
            .map(|r| r.sub_category.as_str()),
    )
}

/// Per-category totals, sorted by category name.
pub fn category_totals(records: &[SalesRecord]) -> Vec<CategoryTotals> {
    let mut map: BTreeMap<&str, (Totals, usize)> = BTreeMap::new();
    for r in records {
        let entry = map.entry(r.category.as_str()).or_default();
        entry.0 = add(entry.0, totals(std::iter::once(r)));
        entry.1 += 1;
    }

    map.into_iter()
        .map(|(category, (totals, record_count))| CategoryTotals {
            category: category.to_string(),
            totals,
            record_count,
        })
        .collect()
}

fn add(a: Totals, b: Totals) -> Totals {
    Totals {
        sales: a.sales + b.sales,
        profit: a.profit + b.profit,
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(category: &str, sub: &str, sales: Option<f64>, profit: Option<f64>) -> SalesRecord {
        SalesRecord::new(category, sub, None, sales, profit)
    }

    fn furniture_scenario() -> Vec<SalesRecord> {
        vec![
            rec("Furniture", "Chairs", Some(100.0), Some(20.0)),
            rec("Furniture", "Tables", Some(50.0), Some(-10.0)),
            rec("Office Supplies", "Paper", Some(30.0), Some(5.0)),
        ]
    }

    fn subs(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn furniture_scenario_metrics() {
        let records = furniture_scenario();
        let chosen = subs(&["Chairs", "Tables"]);

        let filtered = filter(&records, "Furniture", &chosen);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0], &records[0]);
        assert_eq!(filtered[1], &records[1]);

        let t = totals(filtered.iter().copied());
        assert!((t.sales - 150.0).abs() < 1e-9);
        assert!((t.profit - 10.0).abs() < 1e-9);

        let margin = profit_margin(t.sales, t.profit);
        assert!((margin - 6.6667).abs() < 1e-3);

        let overall = totals(&records);
        let overall_margin = profit_margin(overall.sales, overall.profit);
        assert!((overall_margin - 8.3333).abs() < 1e-3);

        let delta = margin_delta(margin, overall_margin);
        assert!((delta - (-1.6667)).abs() < 1e-3);
    }

    #[test]
    fn dashboard_metrics_matches_individual_operations() {
        let records = furniture_scenario();
        let selection = Selection::new("Furniture", ["Chairs", "Tables"]);
        let m = dashboard_metrics(&records, &selection);
        assert!((m.total_sales - 150.0).abs() < 1e-9);
        assert!((m.total_profit - 10.0).abs() < 1e-9);
        assert!((m.profit_margin - 20.0 / 3.0).abs() < 1e-9);
        assert!((m.overall_margin - 25.0 / 3.0).abs() < 1e-9);
        assert!((m.margin_delta - (20.0 / 3.0 - 25.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_selection_yields_zeroes() {
        let records = furniture_scenario();
        assert!(filter(&records, "Furniture", &[]).is_empty());

        let selection = Selection::new("Furniture", Vec::<String>::new());
        let m = dashboard_metrics(&records, &selection);
        assert_eq!(m.total_sales, 0.0);
        assert_eq!(m.total_profit, 0.0);
        assert_eq!(m.profit_margin, 0.0);
        assert!((m.margin_delta + m.overall_margin).abs() < 1e-12);
    }

    #[test]
    fn filter_requires_matching_category() {
        let records = furniture_scenario();
        // "Paper" exists, but under a different category.
        assert!(filter(&records, "Furniture", &subs(&["Paper"])).is_empty());
    }

    #[test]
    fn filter_is_idempotent() {
        let records = furniture_scenario();
        let chosen = subs(&["Chairs"]);
        let once: Vec<SalesRecord> = filter(&records, "Furniture", &chosen).into_iter().cloned().collect();
        let twice: Vec<SalesRecord> = filter(&once, "Furniture", &chosen).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn totals_skip_absent_values() {
        let records = vec![
            rec("A", "x", Some(10.0), None),
            rec("A", "x", None, Some(-4.0)),
            rec("A", "x", Some(2.5), Some(1.0)),
        ];
        let t = totals(&records);
        assert!((t.sales - 12.5).abs() < 1e-12);
        assert!((t.profit - (-3.0)).abs() < 1e-12);
        assert_eq!(totals(&Vec::<SalesRecord>::new()), Totals::default());
    }

    #[test]
    fn margin_zero_guard_and_self_delta() {
        for profit in [0.0, 5.0, -12.0] {
            assert_eq!(profit_margin(0.0, profit), 0.0);
        }
        for m in [0.0, 6.5, -3.25] {
            assert_eq!(margin_delta(m, m), 0.0);
        }
    }

    #[test]
    fn categories_and_sub_categories_keep_first_seen_order() {
        let records = vec![
            rec("Technology", "Phones", None, None),
            rec("Furniture", "Tables", None, None),
            rec("Furniture", "Chairs", None, None),
            rec("Technology", "Phones", None, None),
            rec("Furniture", "Tables", None, None),
        ];
        assert_eq!(categories(&records), vec!["Technology", "Furniture"]);
        assert_eq!(sub_categories(&records, "Furniture"), vec!["Tables", "Chairs"]);
        assert!(sub_categories(&records, "Missing").is_empty());
    }

    #[test]
    fn category_totals_are_sorted_by_name() {
        let rows = category_totals(&furniture_scenario());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Furniture");
        assert_eq!(rows[0].record_count, 2);
        assert!((rows[0].totals.sales - 150.0).abs() < 1e-12);
        assert_eq!(rows[1].category, "Office Supplies");
        assert!((rows[1].totals.profit - 5.0).abs() < 1e-12);
    }
}
