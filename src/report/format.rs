//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use chrono::NaiveDate;

use crate::aggregate::profit_margin;
use crate::app::pipeline::DashboardView;
use crate::domain::{CategoryTotals, SalesRecord, YearMonth};
use crate::io::ingest::IngestedData;

/// Header block describing the loaded file.
pub fn format_ingest_summary(data: &IngestedData, source: &str) -> String {
    let mut out = String::new();

    out.push_str("=== dash - Superstore sales dashboard ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        data.rows_read,
        data.stats.n_records,
        data.row_errors.len()
    ));
    out.push_str(&format!(
        "Dates: {} .. {}\n",
        fmt_opt_date(data.stats.first_date),
        fmt_opt_date(data.stats.last_date)
    ));

    let s = &data.stats;
    if s.missing_date + s.missing_sales + s.missing_profit > 0 {
        out.push_str(&format!(
            "Missing values: order_date={} sales={} profit={}\n",
            s.missing_date, s.missing_sales, s.missing_profit
        ));
    }
    out
}

/// The three headline metrics plus the margin delta.
pub fn format_metrics(view: &DashboardView) -> String {
    let m = &view.metrics;
    let mut out = String::new();

    out.push_str(&format!("Category: {}\n", view.selection.category));
    if view.selection.is_empty() {
        out.push_str("Sub-categories: (none)\n");
    } else {
        out.push_str(&format!("Sub-categories: {}\n", view.selection.sub_categories.join(", ")));
    }
    out.push_str(&format!("Records: {}\n", view.filtered.len()));
    out.push('\n');
    out.push_str(&format!("{:<15} {:>16}\n", "Total Sales", fmt_currency(m.total_sales)));
    out.push_str(&format!("{:<15} {:>16}\n", "Total Profit", fmt_currency(m.total_profit)));
    out.push_str(&format!(
        "{:<15} {:>16}  ({} vs overall {})\n",
        "Profit Margin",
        fmt_percent(m.profit_margin),
        fmt_delta(m.margin_delta),
        fmt_percent(m.overall_margin),
    ));

    if view.filtered.is_empty() {
        out.push_str("\nNo data available for the selected filters.\n");
    }
    out
}

/// Monthly sales table (`YYYY-MM  $amount`).
pub fn format_monthly_table(monthly: &[(YearMonth, f64)]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<8} {:>16}\n", "month", "sales"));
    out.push_str(&format!("{:-<8} {:-<16}\n", "", ""));
    for (month, sales) in monthly {
        out.push_str(&format!("{:<8} {:>16}\n", month.to_string(), fmt_currency(*sales)));
    }
    if monthly.is_empty() {
        out.push_str("(no dated records)\n");
    }
    out
}

/// Daily sales table (`YYYY-MM-DD  $amount`).
pub fn format_daily_table(daily: &[(NaiveDate, f64)]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<10} {:>16}\n", "date", "sales"));
    out.push_str(&format!("{:-<10} {:-<16}\n", "", ""));
    for (date, sales) in daily {
        out.push_str(&format!("{:<10} {:>16}\n", date.to_string(), fmt_currency(*sales)));
    }
    if daily.is_empty() {
        out.push_str("(no dated records)\n");
    }
    out
}

/// Per-category totals with margin.
pub fn format_category_table(rows: &[CategoryTotals]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<20} {:>8} {:>16} {:>16} {:>9}\n",
        "category", "records", "sales", "profit", "margin"
    ));
    out.push_str(&format!("{:-<20} {:-<8} {:-<16} {:-<16} {:-<9}\n", "", "", "", "", ""));
    for row in rows {
        out.push_str(&format!(
            "{:<20} {:>8} {:>16} {:>16} {:>9}\n",
            truncate(&row.category, 20),
            row.record_count,
            fmt_currency(row.totals.sales),
            fmt_currency(row.totals.profit),
            fmt_percent(profit_margin(row.totals.sales, row.totals.profit)),
        ));
    }
    out
}

/// The sub-category options for one category, one per line.
pub fn format_sub_category_list(category: &str, sub_categories: &[String]) -> String {
    let mut out = format!("{category}:\n");
    for sub in sub_categories {
        out.push_str(&format!("  - {sub}\n"));
    }
    out
}

/// First `limit` records as a fixed-width table.
pub fn format_records_table(records: &[SalesRecord], limit: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<16} {:<10} {:<16} {:<14} {:>12} {:>12}\n",
            "order_id", "date", "category", "sub_category", "sales", "profit"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<16} {:-<10} {:-<16} {:-<14} {:-<12} {:-<12}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in records.iter().take(limit) {
        out.push_str(
            format!(
                "{:<16} {:<10} {:<16} {:<14} {:>12} {:>12}\n",
                truncate(r.order_id.as_deref().unwrap_or("-"), 16),
                fmt_opt_date(r.order_date),
                truncate(&r.category, 16),
                truncate(&r.sub_category, 14),
                r.sales.map(fmt_currency).unwrap_or_else(|| "-".to_string()),
                r.profit.map(fmt_currency).unwrap_or_else(|| "-".to_string()),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if records.len() > limit {
        out.push_str(&format!("... {} more\n", records.len() - limit));
    }
    out
}

/// `$1,234.56`, `-$12.00`.
pub fn fmt_currency(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", v.abs());
    let (int_part, frac_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac_part}")
}

/// `6.67%`.
pub fn fmt_percent(v: f64) -> String {
    format!("{v:.2}%")
}

/// Signed percentage-point delta: `+1.23%`, `-1.67%`.
pub fn fmt_delta(v: f64) -> String {
    // Avoid printing "-0.00%".
    let v = if v.abs() < 0.005 { 0.0 } else { v };
    format!("{v:+.2}%")
}

fn fmt_opt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
