//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings pane for choosing a category and toggling its
//! sub-categories, then renders the headline metrics and a monthly sales chart
//! for the current selection.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::info;

use crate::domain::{DashConfig, YearMonth};
use crate::error::AppError;
use crate::report::{fmt_currency, fmt_delta, fmt_percent};

mod plotters_chart;
pub mod state;

use plotters_chart::SalesPlottersChart;
use state::DashboardState;

/// Where `e` writes the selected records.
const EXPORT_FILE: &str = "dash_export.csv";

/// Start the TUI.
pub fn run(config: DashConfig) -> Result<(), AppError> {
    // Load before touching the terminal so input errors print normally.
    let data = crate::app::pipeline::load(&config)?;
    let selection = crate::app::pipeline::selection_from_config(&data.records, &config)?;
    let source = config.csv_path.display().to_string();
    let state = DashboardState::new(data.records, selection)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App {
        state,
        source,
        status: format!("Loaded {} records.", data.stats.n_records),
    };
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    state: DashboardState,
    source: String,
    status: String,
}

impl App {
    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => {
                self.state.shift_category(-1);
                self.status = format!("category: {}", self.state.selection().category);
            }
            KeyCode::Right => {
                self.state.shift_category(1);
                self.status = format!("category: {}", self.state.selection().category);
            }
            KeyCode::Up => self.state.move_cursor(-1),
            KeyCode::Down => self.state.move_cursor(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let cursor = self.state.cursor();
                if let Some(selected) = self.state.toggle_current() {
                    let name = self.state.options().get(cursor).cloned().unwrap_or_default();
                    self.status = if selected {
                        format!("+ {name}")
                    } else {
                        format!("- {name}")
                    };
                }
            }
            KeyCode::Char('a') => {
                self.state.select_all();
                self.status = "Selected all sub-categories.".to_string();
            }
            KeyCode::Char('n') => {
                self.state.select_none();
                self.status = "Cleared sub-category selection.".to_string();
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    fn export(&mut self) {
        let path = PathBuf::from(EXPORT_FILE);
        let rows: Vec<_> = self.state.view().filtered.iter().collect();
        self.status = match crate::io::export::write_records_csv(&path, &rows) {
            Ok(()) => {
                info!(path = %path.display(), "tui export");
                format!("Wrote {} rows to {}", rows.len(), path.display())
            }
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let view = self.state.view();
        let lines = vec![
            Line::from(vec![
                Span::styled("dash", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" - {}", self.source)),
            ]),
            Line::from(Span::styled(
                format!(
                    "records: {} | selected: {} | months: {}",
                    self.state.record_count(),
                    view.filtered.len(),
                    view.monthly.len(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(area);

        self.draw_settings(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(columns[1]);

        self.draw_metrics(frame, right[0]);
        self.draw_chart(frame, right[1]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let n = self.state.categories().len();
        let category = Paragraph::new(format!(
            "< {} >  ({}/{n})",
            self.state.selection().category,
            self.state.category_idx() + 1
        ))
        .block(Block::default().title("Category").borders(Borders::ALL));
        frame.render_widget(category, chunks[0]);

        let selection = self.state.selection();
        let items: Vec<ListItem> = self
            .state
            .options()
            .iter()
            .map(|sub| {
                let mark = if selection.contains(sub) { "[x]" } else { "[ ]" };
                ListItem::new(format!("{mark} {sub}"))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Sub-categories").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.state.cursor()));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    fn draw_metrics(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let m = &self.state.view().metrics;
        let delta_color = if m.margin_delta < 0.0 { Color::Red } else { Color::Green };

        let lines = vec![
            Line::from(vec![
                Span::styled("Total Sales   ", Style::default().fg(Color::Gray)),
                Span::styled(fmt_currency(m.total_sales), Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(vec![
                Span::styled("Total Profit  ", Style::default().fg(Color::Gray)),
                Span::styled(fmt_currency(m.total_profit), Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(vec![
                Span::styled("Profit Margin ", Style::default().fg(Color::Gray)),
                Span::styled(fmt_percent(m.profit_margin), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(fmt_delta(m.margin_delta), Style::default().fg(delta_color)),
                Span::styled(
                    format!(" vs overall {}", fmt_percent(m.overall_margin)),
                    Style::default().fg(Color::Gray),
                ),
            ]),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().title("Metrics").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Sales Over Time (monthly)").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let view = self.state.view();
        let message = if view.filtered.is_empty() {
            Some("No data available for the selected filters.")
        } else if view.monthly.is_empty() {
            Some("Selected records have no valid order dates.")
        } else {
            None
        };
        if let Some(message) = message {
            let msg = Paragraph::new(message).style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let (series, x_bounds, y_bounds) = chart_series(&view.monthly);

        let widget = SalesPlottersChart {
            series: &series,
            x_bounds,
            y_bounds,
            x_label: "month",
            y_label: "sales ($)",
            fmt_x: month_label,
            fmt_y: fmt_axis_y,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ category  ↑/↓ move  space toggle  a all  n none  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Monthly points on a month-ordinal x axis, plus padded bounds anchored at zero sales.
///
/// Months without records are not in the series, so the line bridges them while
/// the axis keeps their slot.
fn chart_series(monthly: &[(YearMonth, f64)]) -> (Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let series: Vec<(f64, f64)> = monthly
        .iter()
        .map(|&(month, sales)| (f64::from(month.ordinal()), sales))
        .collect();

    let first = series.first().map_or(0.0, |&(x, _)| x);
    let last = series.last().map_or(0.0, |&(x, _)| x);
    let x_bounds = [first - 0.5, last + 0.5];

    let y_max = series.iter().map(|&(_, y)| y).fold(0.0_f64, f64::max);
    let y_bounds = if y_max.is_finite() && y_max > 0.0 {
        [0.0, y_max * 1.05]
    } else {
        [0.0, 1.0]
    };

    (series, x_bounds, y_bounds)
}

/// Label whole month ordinals with `YYYY-MM`; blank elsewhere.
fn month_label(v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 0.25 {
        return String::new();
    }
    YearMonth::from_ordinal(idx as i32).to_string()
}

fn fmt_axis_y(v: f64) -> String {
    if v.abs() >= 1_000.0 {
        format!("{:.1}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_series_keeps_gap_months_apart() {
        let monthly = vec![
            (YearMonth::new(2023, 1), 100.0),
            (YearMonth::new(2023, 3), 200.0),
        ];
        let (series, x, y) = chart_series(&monthly);
        let jan = f64::from(YearMonth::new(2023, 1).ordinal());
        assert_eq!(series, vec![(jan, 100.0), (jan + 2.0, 200.0)]);
        assert_eq!(x, [jan - 0.5, jan + 2.5]);
        assert_eq!(y, [0.0, 210.0]);
    }

    #[test]
    fn month_labels_only_on_whole_months() {
        let feb = f64::from(YearMonth::new(2023, 2).ordinal());
        assert_eq!(month_label(feb), "2023-02");
        assert_eq!(month_label(feb + 1.0), "2023-03");
        assert_eq!(month_label(feb + 0.5), "");
    }

    #[test]
    fn y_axis_abbreviates_thousands() {
        assert_eq!(fmt_axis_y(2500.0), "2.5k");
        assert_eq!(fmt_axis_y(42.0), "42");
    }
}
