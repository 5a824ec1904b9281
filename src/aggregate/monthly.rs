//! Time-series aggregation: sales per calendar month and per day.
//!
//! Both are explicit key-extraction + fold into a `BTreeMap`, so output is
//! chronological without a separate sort. Only keys that occur in the input
//! are emitted; empty months/days are gaps, not zero entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{SalesRecord, YearMonth};

/// Sum of `sales` per `(year, month)` of `order_date`, oldest first.
///
/// Records without an order date are skipped. A dated record with absent sales
/// still makes its month appear (contributing `0.0`).
pub fn monthly_sales<'a, I>(records: I) -> Vec<(YearMonth, f64)>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    fold_by_key(records, YearMonth::of)
}

/// Sum of `sales` per order date, oldest first.
pub fn daily_sales<'a, I>(records: I) -> Vec<(NaiveDate, f64)>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    fold_by_key(records, |date| date)
}

fn fold_by_key<'a, I, K, F>(records: I, key: F) -> Vec<(K, f64)>
where
    I: IntoIterator<Item = &'a SalesRecord>,
    K: Ord,
    F: Fn(NaiveDate) -> K,
{
    let mut buckets: BTreeMap<K, f64> = BTreeMap::new();
    for r in records {
        let Some(date) = r.order_date else { continue };
        *buckets.entry(key(date)).or_insert(0.0) += r.sales.unwrap_or(0.0);
    }
    buckets.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(y: i32, m: u32, d: u32, sales: Option<f64>) -> SalesRecord {
        SalesRecord::new("Furniture", "Chairs", NaiveDate::from_ymd_opt(y, m, d), sales, None)
    }

    #[test]
    fn monthly_groups_and_orders() {
        let records = vec![
            dated(2023, 2, 1, Some(5.0)),
            dated(2023, 1, 5, Some(10.0)),
            dated(2023, 1, 20, Some(20.0)),
        ];
        let out = monthly_sales(&records);
        assert_eq!(
            out,
            vec![(YearMonth::new(2023, 1), 30.0), (YearMonth::new(2023, 2), 5.0)]
        );
    }

    #[test]
    fn monthly_leaves_gaps_and_skips_undated() {
        let records = vec![
            dated(2023, 1, 5, Some(10.0)),
            dated(2023, 3, 9, Some(7.0)),
            SalesRecord::new("Furniture", "Chairs", None, Some(1000.0), None),
        ];
        let out = monthly_sales(&records);
        let months: Vec<YearMonth> = out.iter().map(|(m, _)| *m).collect();
        assert_eq!(months, vec![YearMonth::new(2023, 1), YearMonth::new(2023, 3)]);
        assert_eq!(out.iter().map(|(_, s)| s).sum::<f64>(), 17.0);
    }

    #[test]
    fn monthly_crosses_year_boundary() {
        let records = vec![dated(2024, 1, 2, Some(1.0)), dated(2023, 12, 30, Some(2.0))];
        let out = monthly_sales(&records);
        assert_eq!(out[0].0, YearMonth::new(2023, 12));
        assert_eq!(out[1].0, YearMonth::new(2024, 1));
    }

    #[test]
    fn dated_record_without_sales_keeps_its_month() {
        let records = vec![dated(2023, 4, 1, None)];
        assert_eq!(monthly_sales(&records), vec![(YearMonth::new(2023, 4), 0.0)]);
    }

    #[test]
    fn daily_sums_same_day() {
        let records = vec![
            dated(2023, 1, 5, Some(10.0)),
            dated(2023, 1, 5, Some(2.5)),
            dated(2023, 1, 4, Some(1.0)),
        ];
        let out = daily_sales(&records);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], (NaiveDate::from_ymd_opt(2023, 1, 4).unwrap(), 1.0));
        assert_eq!(out[1].1, 12.5);
    }
}
