//! Selection state behind the TUI widgets.
//!
//! Kept free of terminal types so key handling can be tested without a backend.
//! Every mutation recomputes the dashboard view from the in-memory records.

use tracing::debug;

use crate::aggregate;
use crate::app::pipeline::{self, DashboardView};
use crate::domain::{SalesRecord, Selection};
use crate::error::AppError;

pub struct DashboardState {
    records: Vec<SalesRecord>,
    categories: Vec<String>,
    category_idx: usize,
    /// Sub-category options of the current category.
    options: Vec<String>,
    cursor: usize,
    view: DashboardView,
}

impl DashboardState {
    /// Start from an already-resolved selection.
    pub fn new(records: Vec<SalesRecord>, selection: Selection) -> Result<Self, AppError> {
        let categories = aggregate::categories(&records);
        let category_idx = categories
            .iter()
            .position(|c| *c == selection.category)
            .ok_or_else(|| AppError::input(format!("Unknown category '{}'.", selection.category)))?;
        let options = aggregate::sub_categories(&records, &selection.category);
        let view = pipeline::build_view(&records, &selection);

        Ok(Self {
            records,
            categories,
            category_idx,
            options,
            cursor: 0,
            view,
        })
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn selection(&self) -> &Selection {
        &self.view.selection
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn category_idx(&self) -> usize {
        self.category_idx
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Move to the next (`delta > 0`) or previous category, wrapping around.
    ///
    /// The new category starts with all of its sub-categories selected.
    pub fn shift_category(&mut self, delta: i32) {
        let n = self.categories.len();
        if n == 0 {
            return;
        }
        self.category_idx = if delta >= 0 {
            (self.category_idx + 1) % n
        } else {
            (self.category_idx + n - 1) % n
        };

        let category = self.categories[self.category_idx].clone();
        self.options = aggregate::sub_categories(&self.records, &category);
        self.cursor = 0;
        self.apply(Selection::new(category, self.options.clone()));
    }

    pub fn move_cursor(&mut self, delta: i32) {
        if self.options.is_empty() {
            return;
        }
        let last = self.options.len() - 1;
        self.cursor = if delta >= 0 {
            (self.cursor + 1).min(last)
        } else {
            self.cursor.saturating_sub(1)
        };
    }

    /// Toggle the sub-category under the cursor; returns its new membership.
    pub fn toggle_current(&mut self) -> Option<bool> {
        let sub = self.options.get(self.cursor)?.clone();
        let mut selection = self.view.selection.clone();
        let selected = selection.toggle(&sub);
        // Keep the option order stable regardless of toggle order.
        selection.sub_categories = self
            .options
            .iter()
            .filter(|o| selection.contains(o))
            .cloned()
            .collect();
        self.apply(selection);
        Some(selected)
    }

    pub fn select_all(&mut self) {
        let selection = Selection::new(self.view.selection.category.clone(), self.options.clone());
        self.apply(selection);
    }

    pub fn select_none(&mut self) {
        let selection = Selection::new(self.view.selection.category.clone(), Vec::<String>::new());
        self.apply(selection);
    }

    fn apply(&mut self, selection: Selection) {
        debug!(category = %selection.category, n_subs = selection.sub_categories.len(), "recomputing view");
        self.view = pipeline::build_view(&self.records, &selection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<SalesRecord> {
        vec![
            SalesRecord::new("Furniture", "Chairs", None, Some(100.0), Some(20.0)),
            SalesRecord::new("Furniture", "Tables", None, Some(50.0), Some(-10.0)),
            SalesRecord::new("Office Supplies", "Paper", None, Some(30.0), Some(5.0)),
        ]
    }

    fn state() -> DashboardState {
        let sel = Selection::new("Furniture", ["Chairs", "Tables"]);
        DashboardState::new(records(), sel).unwrap()
    }

    #[test]
    fn toggling_recomputes_metrics() {
        let mut st = state();
        assert!((st.view().metrics.total_sales - 150.0).abs() < 1e-9);

        // Cursor starts on "Chairs".
        assert_eq!(st.toggle_current(), Some(false));
        assert_eq!(st.selection().sub_categories, vec!["Tables"]);
        assert!((st.view().metrics.total_sales - 50.0).abs() < 1e-9);

        assert_eq!(st.toggle_current(), Some(true));
        assert_eq!(st.selection().sub_categories, vec!["Chairs", "Tables"]);
    }

    #[test]
    fn switching_category_selects_all_of_it() {
        let mut st = state();
        st.shift_category(1);
        assert_eq!(st.selection().category, "Office Supplies");
        assert_eq!(st.options(), ["Paper".to_string()]);
        assert!((st.view().metrics.total_sales - 30.0).abs() < 1e-9);

        // Wraps back around.
        st.shift_category(1);
        assert_eq!(st.selection().category, "Furniture");
        st.shift_category(-1);
        assert_eq!(st.selection().category, "Office Supplies");
    }

    #[test]
    fn none_and_all() {
        let mut st = state();
        st.select_none();
        assert!(st.view().filtered.is_empty());
        assert_eq!(st.view().metrics.profit_margin, 0.0);

        st.select_all();
        assert_eq!(st.view().filtered.len(), 2);
    }

    #[test]
    fn cursor_is_clamped() {
        let mut st = state();
        st.move_cursor(-1);
        assert_eq!(st.cursor(), 0);
        st.move_cursor(1);
        st.move_cursor(1);
        assert_eq!(st.cursor(), 1);
    }
}
