//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - aggregated in-memory on every selection change
//! - exported to CSV/JSON
//! - rendered by both the CLI reports and the TUI

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One transaction line from the sales CSV.
///
/// Numeric and date fields are `None` when the source value was empty or
/// unparseable. Aggregations skip absent values rather than treating them as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub category: String,
    pub sub_category: String,
    pub order_date: Option<NaiveDate>,
    pub sales: Option<f64>,
    pub profit: Option<f64>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
}

impl SalesRecord {
    /// Convenience constructor for the five core fields.
    pub fn new(
        category: impl Into<String>,
        sub_category: impl Into<String>,
        order_date: Option<NaiveDate>,
        sales: Option<f64>,
        profit: Option<f64>,
    ) -> Self {
        Self {
            category: category.into(),
            sub_category: sub_category.into(),
            order_date,
            sales,
            profit,
            order_id: None,
            product_name: None,
        }
    }
}

/// The user's current filter: one category plus a set of its sub-categories.
///
/// Sub-categories keep insertion order (the order the options were offered in)
/// and never contain duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub category: String,
    pub sub_categories: Vec<String>,
}

impl Selection {
    pub fn new<I, S>(category: impl Into<String>, sub_categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self {
            category: category.into(),
            sub_categories: Vec::new(),
        };
        for sub in sub_categories {
            selection.insert(sub.into());
        }
        selection
    }

    pub fn contains(&self, sub_category: &str) -> bool {
        self.sub_categories.iter().any(|s| s == sub_category)
    }

    /// Add a sub-category; returns `false` if it was already selected.
    pub fn insert(&mut self, sub_category: String) -> bool {
        if self.contains(&sub_category) {
            return false;
        }
        self.sub_categories.push(sub_category);
        true
    }

    /// Flip membership of a sub-category; returns the new membership.
    pub fn toggle(&mut self, sub_category: &str) -> bool {
        if let Some(idx) = self.sub_categories.iter().position(|s| s == sub_category) {
            self.sub_categories.remove(idx);
            false
        } else {
            self.sub_categories.push(sub_category.to_string());
            true
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sub_categories.is_empty()
    }
}

/// Calendar month key, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year 0, so consecutive months differ by one.
    pub fn ordinal(self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }

    pub fn from_ordinal(ordinal: i32) -> Self {
        Self {
            year: ordinal.div_euclid(12),
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Summed sales/profit over a record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub sales: f64,
    pub profit: f64,
}

/// Per-category totals row (the "group by category" view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub category: String,
    pub totals: Totals,
    pub record_count: usize,
}

/// Scalar metrics shown for a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_sales: f64,
    pub total_profit: f64,
    /// Profit margin (%) of the selection.
    pub profit_margin: f64,
    /// Profit margin (%) of the whole dataset.
    pub overall_margin: f64,
    /// `profit_margin - overall_margin`, in percentage points.
    pub margin_delta: f64,
}

/// Resolved run configuration (CLI args + environment).
#[derive(Debug, Clone)]
pub struct DashConfig {
    pub csv_path: PathBuf,
    /// Requested category; `None` means "first category in the file".
    pub category: Option<String>,
    /// Requested sub-categories; empty means "all of the category" unless
    /// `select_none` is set.
    pub sub_categories: Vec<String>,
    pub select_none: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_records: Option<PathBuf>,
    pub export_monthly: Option<PathBuf>,
    pub export_metrics: Option<PathBuf>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_FILE),
            category: None,
            sub_categories: Vec::new(),
            select_none: false,
            plot: true,
            plot_width: 80,
            plot_height: 20,
            export_records: None,
            export_monthly: None,
            export_metrics: None,
        }
    }
}

/// Portable JSON snapshot of one dashboard computation.
///
/// Written by `--export-metrics`; the schema is stable so downstream scripts
/// can diff runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsFile {
    pub tool: String,
    pub source: String,
    pub selection: Selection,
    pub records_selected: usize,
    pub metrics: DashboardMetrics,
    pub monthly: Vec<MonthlyPoint>,
}

/// One row of the monthly sales series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`.
    pub month: String,
    pub sales: f64,
}

/// Data file used when neither `--csv` nor `DASH_CSV` is set.
pub const DEFAULT_CSV_FILE: &str = "Superstore_Sales_utf8.csv";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_dedupes_and_toggles() {
        let mut sel = Selection::new("Furniture", ["Chairs", "Tables", "Chairs"]);
        assert_eq!(sel.sub_categories, vec!["Chairs", "Tables"]);

        assert!(!sel.toggle("Chairs"));
        assert_eq!(sel.sub_categories, vec!["Tables"]);
        assert!(sel.toggle("Chairs"));
        assert!(sel.contains("Chairs"));
    }

    #[test]
    fn year_month_orders_chronologically() {
        let a = YearMonth::new(2022, 12);
        let b = YearMonth::new(2023, 1);
        assert!(a < b);
        assert_eq!(b.to_string(), "2023-01");
        assert_eq!(
            YearMonth::of(NaiveDate::from_ymd_opt(2023, 2, 17).unwrap()),
            YearMonth::new(2023, 2)
        );
    }

    #[test]
    fn year_month_ordinals_are_contiguous() {
        let dec = YearMonth::new(2022, 12);
        let jan = YearMonth::new(2023, 1);
        assert_eq!(jan.ordinal() - dec.ordinal(), 1);
        assert_eq!(YearMonth::from_ordinal(jan.ordinal()), jan);
        assert_eq!(YearMonth::from_ordinal(dec.ordinal()), dec);
    }
}
