//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - monthly totals: `o`, joined by a `-` line
//! - category bars: `#`

use crate::domain::{CategoryTotals, YearMonth};
use crate::report::fmt_currency;

/// Render monthly sales as a line chart.
///
/// Months are spaced evenly along x by position in the series, so gaps in the
/// data are not stretched out.
pub fn render_monthly_plot(monthly: &[(YearMonth, f64)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (monthly.first(), monthly.last()) else {
        return "Monthly sales: (no data)\n".to_string();
    };

    let (y_min, y_max) = y_range(monthly);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let x_max = (monthly.len() - 1).max(1) as f64;

    let mut grid = vec![vec![' '; width]; height];

    let cells: Vec<(usize, usize)> = monthly
        .iter()
        .enumerate()
        .map(|(i, &(_, sales))| {
            (
                map_x(i as f64, x_max, width),
                map_y(sales, y_min, y_max, height),
            )
        })
        .collect();

    // Line first so points overlay it.
    for pair in cells.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        draw_line(&mut grid, x0, y0, x1, y1, '-');
    }
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Monthly sales: {} .. {} | y=[{}, {}]\n",
        first.0,
        last.0,
        fmt_currency(y_min),
        fmt_currency(y_max)
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

/// Render per-category sales as horizontal bars scaled to the largest category.
pub fn render_category_bars(rows: &[CategoryTotals], width: usize) -> String {
    let label_width = rows
        .iter()
        .map(|r| r.category.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);
    let bar_width = width.saturating_sub(label_width + 2).max(10);
    let max_sales = rows.iter().map(|r| r.totals.sales).fold(0.0_f64, f64::max);

    let mut out = String::new();
    for row in rows {
        let len = if max_sales > 0.0 {
            ((row.totals.sales.max(0.0) / max_sales) * bar_width as f64).round() as usize
        } else {
            0
        };
        let label: String = row.category.chars().take(label_width).collect();
        out.push_str(&format!(
            "{label:<label_width$} |{} {}\n",
            "#".repeat(len),
            fmt_currency(row.totals.sales)
        ));
    }
    out
}

fn y_range(monthly: &[(YearMonth, f64)]) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in monthly {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if !min_y.is_finite() || !max_y.is_finite() {
        return (0.0, 1.0);
    }
    if max_y <= min_y {
        // Flat series: give it a band so the line sits mid-chart.
        return (min_y - 1.0, max_y + 1.0);
    }
    (min_y, max_y)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
