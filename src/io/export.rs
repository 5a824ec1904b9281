//! Export dashboard results to CSV/JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::{MetricsFile, SalesRecord, YearMonth};
use crate::error::AppError;

/// Write the selected records to a CSV file, preserving input order.
pub fn write_records_csv(path: &Path, records: &[&SalesRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["order_id", "order_date", "category", "sub_category", "product_name", "sales", "profit"])
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writer
            .write_record([
                r.order_id.clone().unwrap_or_default(),
                r.order_date.map(|d| d.to_string()).unwrap_or_default(),
                r.category.clone(),
                r.sub_category.clone(),
                r.product_name.clone().unwrap_or_default(),
                r.sales.map(|v| format!("{v:.4}")).unwrap_or_default(),
                r.profit.map(|v| format!("{v:.4}")).unwrap_or_default(),
            ])
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;

    info!(path = %path.display(), rows = records.len(), "exported records");
    Ok(())
}

/// Write the monthly sales series to a two-column CSV.
pub fn write_monthly_csv(path: &Path, monthly: &[(YearMonth, f64)]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create monthly CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["month", "sales"])
        .map_err(|e| AppError::input(format!("Failed to write monthly CSV header: {e}")))?;
    for (month, sales) in monthly {
        writer
            .write_record([month.to_string(), format!("{sales:.4}")])
            .map_err(|e| AppError::input(format!("Failed to write monthly CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush monthly CSV: {e}")))?;

    info!(path = %path.display(), rows = monthly.len(), "exported monthly sales");
    Ok(())
}

/// Write a metrics snapshot as pretty JSON.
pub fn write_metrics_json(path: &Path, metrics: &MetricsFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create metrics JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, metrics)
        .map_err(|e| AppError::input(format!("Failed to write metrics JSON: {e}")))?;

    info!(path = %path.display(), "exported metrics");
    Ok(())
}
