//! CSV ingest and normalization.
//!
//! This module turns a "Superstore"-style sales export into clean
//! `SalesRecord`s that are safe to aggregate.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Lenient values**: unparseable numbers and dates become absent, they never fail the row
//! - **Row-level validation** for the grouping keys (skip bad rows, but report what happened)
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::SalesRecord;
use crate::error::{AppError, EXIT_NO_DATA};

/// Columns every input file must carry (after header normalization).
pub const REQUIRED_COLUMNS: [&str; 5] = ["category", "sub_category", "order_date", "sales", "profit"];

/// Summary stats about the records that survived ingest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStats {
    pub n_records: usize,
    pub missing_date: usize,
    pub missing_sales: usize,
    pub missing_profit: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized records + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<SalesRecord>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load and normalize a sales CSV from disk.
pub fn load_sales_records(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    info!(path = %path.display(), "loading sales CSV");
    read_sales_records(file)
}

/// Normalize sales rows from any reader (file, stdin, in-memory buffer).
pub fn read_sales_records<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), "skipped malformed rows");
        for err in row_errors.iter().take(5) {
            debug!(line = err.line, "{}", err.message);
        }
    }

    if records.is_empty() {
        return Err(AppError::new(EXIT_NO_DATA, "No valid rows remain after normalization."));
    }

    let stats = compute_stats(&records);
    info!(
        rows_read,
        records = stats.n_records,
        missing_date = stats.missing_date,
        missing_sales = stats.missing_sales,
        missing_profit = stats.missing_profit,
        "ingest complete"
    );

    Ok(IngestedData {
        records,
        stats,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on duplicate headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !header_map.contains_key(*name))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let list = missing
        .iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(AppError::input(format!("Missing required column(s): {list}")))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<SalesRecord, String> {
    let category = get_required(record, header_map, "category")?.to_string();
    let sub_category = get_required(record, header_map, "sub_category")?.to_string();

    let order_date = get_optional(record, header_map, "order_date").and_then(parse_date);

    // Sales are non-negative by contract; a negative value is treated like garbage.
    let sales = parse_amount(get_optional(record, header_map, "sales")).filter(|v| *v >= 0.0);
    let profit = parse_amount(get_optional(record, header_map, "profit"));

    Ok(SalesRecord {
        category,
        sub_category,
        order_date,
        sales,
        profit,
        order_id: get_optional(record, header_map, "order_id").map(str::to_string),
        product_name: get_optional(record, header_map, "product_name").map(str::to_string),
    })
}

fn compute_stats(records: &[SalesRecord]) -> DatasetStats {
    let mut stats = DatasetStats {
        n_records: records.len(),
        ..DatasetStats::default()
    };

    for r in records {
        match r.order_date {
            Some(d) => {
                stats.first_date = Some(stats.first_date.map_or(d, |f| f.min(d)));
                stats.last_date = Some(stats.last_date.map_or(d, |l| l.max(d)));
            }
            None => stats.missing_date += 1,
        }
        if r.sales.is_none() {
            stats.missing_sales += 1;
        }
        if r.profit.is_none() {
            stats.missing_profit += 1;
        }
    }

    stats
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse an order date, returning `None` for anything unrecognized.
///
/// Superstore exports use US month-first dates (`1/31/2023`); ISO dates and a
/// couple of timestamp shapes are accepted as well. Two-digit US years
/// (`1/31/23`) map 00-69 to 20xx and 70-99 to 19xx.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];
    const SHORT_YEAR_FMTS: [&str; 2] = ["%m/%d/%y", "%m/%d/%y %H:%M"];

    let s = s.trim();
    let parsed = DATE_FMTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FMTS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()))
        });

    // chrono's `%Y` also accepts `23`; only trust it for four-digit years.
    if let Some(d) = parsed.filter(|d| d.year() >= 1000) {
        return Some(d);
    }

    SHORT_YEAR_FMTS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()))
    })
}

/// Parse a money amount such as `261.96`, `$1,044.63` or `-$3.50`.
pub fn parse_amount(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };
    let body = body.strip_prefix('$').unwrap_or(body);
    let cleaned: String = body.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    let v = cleaned.parse::<f64>().ok()?;
    let v = if negative { -v } else { v };
    if v.is_finite() { Some(v) } else { None }
}
