//! Shared "dashboard pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> selection resolution -> filter -> metrics -> monthly series
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::debug;

use crate::aggregate;
use crate::domain::{DashConfig, DashboardMetrics, MetricsFile, MonthlyPoint, SalesRecord, Selection, YearMonth};
use crate::error::{AppError, EXIT_NO_DATA};
use crate::io::ingest::{IngestedData, load_sales_records};

/// Everything a front-end needs to render one selection.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub selection: Selection,
    pub filtered: Vec<SalesRecord>,
    pub metrics: DashboardMetrics,
    pub monthly: Vec<(YearMonth, f64)>,
}

/// Load the configured CSV.
pub fn load(config: &DashConfig) -> Result<IngestedData, AppError> {
    load_sales_records(&config.csv_path)
}

/// Turn the requested category/sub-categories into a concrete selection.
///
/// - no category requested: the first category in the data
/// - no sub-categories requested: every sub-category of that category
/// - `select_none`: an explicitly empty selection
///
/// Names match case-insensitively and resolve to the spelling used in the data.
pub fn resolve_selection(
    records: &[SalesRecord],
    category: Option<&str>,
    sub_categories: &[String],
    select_none: bool,
) -> Result<Selection, AppError> {
    let categories = aggregate::categories(records);
    if categories.is_empty() {
        return Err(AppError::new(EXIT_NO_DATA, "Dataset has no categories."));
    }

    let category = match category {
        Some(wanted) => find_ignore_case(&categories, wanted).ok_or_else(|| {
            AppError::input(format!(
                "Unknown category '{wanted}'. Available: {}",
                categories.join(", ")
            ))
        })?,
        None => categories[0].clone(),
    };

    let available = aggregate::sub_categories(records, &category);
    let chosen = if select_none {
        Vec::new()
    } else if sub_categories.is_empty() {
        available.clone()
    } else {
        sub_categories
            .iter()
            .map(|wanted| {
                find_ignore_case(&available, wanted).ok_or_else(|| {
                    AppError::input(format!(
                        "Unknown sub-category '{wanted}' for category '{category}'. Available: {}",
                        available.join(", ")
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    debug!(category = %category, sub_categories = ?chosen, "resolved selection");
    Ok(Selection::new(category, chosen))
}

/// Resolve the selection named in `config` against `records`.
pub fn selection_from_config(records: &[SalesRecord], config: &DashConfig) -> Result<Selection, AppError> {
    resolve_selection(
        records,
        config.category.as_deref(),
        &config.sub_categories,
        config.select_none,
    )
}

/// Compute the full view for a selection. Never fails: empty selections give zeroes.
pub fn build_view(records: &[SalesRecord], selection: &Selection) -> DashboardView {
    let filtered: Vec<SalesRecord> = aggregate::filter_selection(records, selection)
        .into_iter()
        .cloned()
        .collect();
    let metrics = aggregate::dashboard_metrics(records, selection);
    let monthly = aggregate::monthly_sales(&filtered);

    DashboardView {
        selection: selection.clone(),
        filtered,
        metrics,
        monthly,
    }
}

/// Snapshot a view for JSON export.
pub fn metrics_file(view: &DashboardView, source: &str) -> MetricsFile {
    MetricsFile {
        tool: "dash".to_string(),
        source: source.to_string(),
        selection: view.selection.clone(),
        records_selected: view.filtered.len(),
        metrics: view.metrics,
        monthly: view
            .monthly
            .iter()
            .map(|(month, sales)| MonthlyPoint {
                month: month.to_string(),
                sales: *sales,
            })
            .collect(),
    }
}

fn find_ignore_case(options: &[String], wanted: &str) -> Option<String> {
    let wanted = wanted.trim();
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(wanted))
        .cloned()
}
