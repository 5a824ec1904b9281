//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - resolves which CSV to read
//! - runs the dashboard pipeline
//! - prints reports/plots
//! - writes optional exports

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{Level, debug};

use crate::cli::{Command, PlotArgs, SelectArgs, SelectionArgs, TableArgs};
use crate::domain::{DEFAULT_CSV_FILE, DashConfig};
use crate::error::AppError;

pub mod pipeline;

/// Environment variable naming the default sales CSV.
pub const CSV_ENV_VAR: &str = "DASH_CSV";

/// Entry point for the `dash` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `dash` and `dash -c Furniture` to behave like `dash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let is_tui = matches!(cli.command, Command::Tui(_));
    init_logging(cli.verbose, is_tui);

    let csv_path = resolve_csv_path(cli.csv)?;
    debug!(path = %csv_path.display(), "using sales CSV");

    match cli.command {
        Command::Summary(args) => handle_summary(config_from_args(csv_path, &args)),
        Command::Monthly(args) => handle_monthly(config_from_args(csv_path, &args)),
        Command::Daily(args) => handle_daily(csv_path, &args),
        Command::Categories(args) => handle_categories(csv_path, &args),
        Command::Table(args) => handle_table(csv_path, &args),
        Command::Tui(args) => crate::tui::run(config_from_args(csv_path, &args)),
    }
}

/// Install the stderr `tracing` subscriber.
///
/// The TUI owns the terminal, so it only gets a subscriber when explicitly
/// asked for with `--verbose`.
fn init_logging(verbose: bool, is_tui: bool) {
    if is_tui && !verbose {
        return;
    }
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `--csv`, then `$DASH_CSV`, then `./Superstore_Sales_utf8.csv`, then an interactive picker.
fn resolve_csv_path(cli_csv: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(path) = cli_csv {
        return Ok(path);
    }
    if let Ok(path) = std::env::var(CSV_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path.trim()));
        }
    }

    let default = PathBuf::from(DEFAULT_CSV_FILE);
    if default.exists() || !std::io::stdin().is_terminal() {
        return Ok(default);
    }
    crate::cli::picker::prompt_for_csv_path()
}

fn handle_summary(config: DashConfig) -> Result<(), AppError> {
    let data = pipeline::load(&config)?;
    let selection = pipeline::selection_from_config(&data.records, &config)?;
    let view = pipeline::build_view(&data.records, &selection);

    let source = config.csv_path.display().to_string();
    println!("{}", crate::report::format_ingest_summary(&data, &source));
    println!("{}", crate::report::format_metrics(&view));

    if config.plot && !view.monthly.is_empty() {
        println!(
            "{}",
            crate::plot::render_monthly_plot(&view.monthly, config.plot_width, config.plot_height)
        );
    }

    write_exports(&config, &view)
}

fn handle_monthly(config: DashConfig) -> Result<(), AppError> {
    let data = pipeline::load(&config)?;
    let selection = pipeline::selection_from_config(&data.records, &config)?;
    let view = pipeline::build_view(&data.records, &selection);

    println!(
        "Monthly sales for {} / {}\n",
        view.selection.category,
        describe_subs(&view.selection.sub_categories)
    );
    println!("{}", crate::report::format_monthly_table(&view.monthly));

    if config.plot && !view.monthly.is_empty() {
        println!(
            "{}",
            crate::plot::render_monthly_plot(&view.monthly, config.plot_width, config.plot_height)
        );
    }

    write_exports(&config, &view)
}

fn handle_daily(csv_path: PathBuf, args: &SelectionArgs) -> Result<(), AppError> {
    let data = crate::io::load_sales_records(&csv_path)?;
    let selection = selection_from_args(&data.records, args)?;
    let filtered = crate::aggregate::filter_selection(&data.records, &selection);
    let daily = crate::aggregate::daily_sales(filtered);

    println!(
        "Daily sales for {} / {}\n",
        selection.category,
        describe_subs(&selection.sub_categories)
    );
    println!("{}", crate::report::format_daily_table(&daily));
    Ok(())
}

fn handle_categories(csv_path: PathBuf, args: &PlotArgs) -> Result<(), AppError> {
    let data = crate::io::load_sales_records(&csv_path)?;
    let rows = crate::aggregate::category_totals(&data.records);

    println!("{}", crate::report::format_category_table(&rows));
    if !args.no_plot {
        println!("{}", crate::plot::render_category_bars(&rows, args.width));
    }

    println!("Sub-categories:");
    for category in crate::aggregate::categories(&data.records) {
        let subs = crate::aggregate::sub_categories(&data.records, &category);
        print!("{}", crate::report::format_sub_category_list(&category, &subs));
    }
    Ok(())
}

fn handle_table(csv_path: PathBuf, args: &TableArgs) -> Result<(), AppError> {
    let data = crate::io::load_sales_records(&csv_path)?;
    let selection = selection_from_args(&data.records, &args.selection)?;
    let view = pipeline::build_view(&data.records, &selection);

    println!("{}", crate::report::format_records_table(&view.filtered, args.rows));
    Ok(())
}

fn write_exports(config: &DashConfig, view: &pipeline::DashboardView) -> Result<(), AppError> {
    if let Some(path) = &config.export_records {
        let rows: Vec<_> = view.filtered.iter().collect();
        crate::io::export::write_records_csv(path, &rows)?;
    }
    if let Some(path) = &config.export_monthly {
        crate::io::export::write_monthly_csv(path, &view.monthly)?;
    }
    if let Some(path) = &config.export_metrics {
        let file = pipeline::metrics_file(view, &source_label(&config.csv_path));
        crate::io::export::write_metrics_json(path, &file)?;
    }
    Ok(())
}

fn selection_from_args(
    records: &[crate::domain::SalesRecord],
    args: &SelectionArgs,
) -> Result<crate::domain::Selection, AppError> {
    pipeline::resolve_selection(records, args.category.as_deref(), &args.sub_categories, args.none)
}

pub fn config_from_args(csv_path: PathBuf, args: &SelectArgs) -> DashConfig {
    DashConfig {
        csv_path,
        category: args.selection.category.clone(),
        sub_categories: args.selection.sub_categories.clone(),
        select_none: args.selection.none,
        plot: !args.plot.no_plot,
        plot_width: args.plot.width,
        plot_height: args.plot.height,
        export_records: args.export.clone(),
        export_monthly: args.export_monthly.clone(),
        export_metrics: args.export_metrics.clone(),
    }
}

fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn describe_subs(subs: &[String]) -> String {
    if subs.is_empty() {
        "(none)".to_string()
    } else {
        subs.join(", ")
    }
}

/// Rewrite argv so `dash` defaults to `dash tui`.
///
/// Rules:
/// - `dash`                       -> `dash tui`
/// - `dash -c Furniture ...`      -> `dash tui -c Furniture ...`
/// - `dash --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // Global flags may come before the subcommand, so look at every token.
    if argv.iter().skip(1).any(|a| is_subcommand_name(a)) {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

fn is_subcommand_name(arg: &str) -> bool {
    matches!(arg, "summary" | "monthly" | "daily" | "categories" | "table" | "tui")
}
