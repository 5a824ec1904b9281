//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dash", version, about = "Superstore sales dashboard (category / sub-category metrics)")]
pub struct Cli {
    /// Sales CSV (defaults to $DASH_CSV, then ./Superstore_Sales_utf8.csv).
    #[arg(short = 'f', long, global = true, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Emit debug logs on stderr.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print total sales, total profit and profit margin (with delta) for a selection.
    Summary(SelectArgs),
    /// Print monthly sales for a selection.
    Monthly(SelectArgs),
    /// Print per-day sales for a selection.
    Daily(SelectionArgs),
    /// Print per-category totals and the sub-categories of each category.
    Categories(PlotArgs),
    /// Print the first records of a selection.
    Table(TableArgs),
    /// Launch the interactive TUI.
    ///
    /// Uses the same pipeline as `dash summary`, but lets you change the
    /// selection with the keyboard.
    Tui(SelectArgs),
}

/// Which records to aggregate.
#[derive(Debug, Args, Clone, Default)]
pub struct SelectionArgs {
    /// Category to select (default: the first category in the file).
    #[arg(short = 'c', long)]
    pub category: Option<String>,

    /// Sub-category to include; repeat for several (default: all of the category).
    #[arg(short = 's', long = "sub-category", value_name = "NAME")]
    pub sub_categories: Vec<String>,

    /// Select no sub-categories at all.
    #[arg(long, conflicts_with = "sub_categories")]
    pub none: bool,
}

/// Terminal chart options.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options shared by `summary`, `monthly` and `tui`.
#[derive(Debug, Args, Clone)]
pub struct SelectArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub plot: PlotArgs,

    /// Export the selected records to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the monthly sales series to CSV.
    #[arg(long = "export-monthly")]
    pub export_monthly: Option<PathBuf>,

    /// Export metrics + monthly series to JSON.
    #[arg(long = "export-metrics")]
    pub export_metrics: Option<PathBuf>,
}

/// Options for `table`.
#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Number of rows to print.
    #[arg(short = 'n', long, default_value_t = 20)]
    pub rows: usize,
}
