//! End-to-end tests: write a real CSV to disk, then drive ingest, selection,
//! aggregation and exports the same way the `dash` commands do.

use std::fs;
use std::path::PathBuf;

use superstore_dash::aggregate;
use superstore_dash::app::pipeline;
use superstore_dash::domain::{MetricsFile, YearMonth};
use superstore_dash::io::{export, ingest};
use tempfile::TempDir;

const SALES_CSV: &str = "\
\u{feff}Order ID,Order Date,Category,Sub-Category,Product Name,Sales,Profit
CA-1,01/10/2023,Furniture,Chairs,Task Chair,$100.00,20
CA-2,02/03/2023,Furniture,Tables,Oak Table,50,-10
CA-3,01/15/2023,Office Supplies,Paper,Copy Paper,\"$30.00\",5
CA-4,03/01/2023,Furniture,Chairs,Stool,N/A,
CA-5,03/02/2023,,Chairs,Orphan,10,1
";

fn write_csv(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("sales.csv");
    fs::write(&path, SALES_CSV).unwrap();
    path
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-2
}

#[test]
fn furniture_selection_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir);

    let data = ingest::load_sales_records(&path).unwrap();
    assert_eq!(data.rows_read, 5);
    assert_eq!(data.stats.n_records, 4);
    assert_eq!(data.row_errors.len(), 1);
    assert_eq!(data.row_errors[0].line, 6);
    assert_eq!(data.stats.missing_sales, 1);
    assert_eq!(data.stats.missing_profit, 1);

    // Case-insensitive names resolve to the spelling in the file.
    let selection = pipeline::resolve_selection(&data.records, Some("furniture"), &[], false).unwrap();
    assert_eq!(selection.category, "Furniture");
    assert_eq!(selection.sub_categories, vec!["Chairs", "Tables"]);

    let view = pipeline::build_view(&data.records, &selection);
    assert_eq!(view.filtered.len(), 3);
    assert!(approx(view.metrics.total_sales, 150.0));
    assert!(approx(view.metrics.total_profit, 10.0));
    assert!(approx(view.metrics.profit_margin, 6.67));
    assert!(approx(view.metrics.overall_margin, 8.33));
    assert!(approx(view.metrics.margin_delta, -1.67));

    assert_eq!(
        view.monthly,
        vec![
            (YearMonth::new(2023, 1), 100.0),
            (YearMonth::new(2023, 2), 50.0),
            (YearMonth::new(2023, 3), 0.0),
        ]
    );
}

#[test]
fn empty_selection_reports_negative_overall_margin() {
    let dir = TempDir::new().unwrap();
    let data = ingest::load_sales_records(&write_csv(&dir)).unwrap();

    let selection = pipeline::resolve_selection(&data.records, None, &[], true).unwrap();
    let view = pipeline::build_view(&data.records, &selection);

    assert!(view.filtered.is_empty());
    assert!(view.monthly.is_empty());
    assert_eq!(view.metrics.total_sales, 0.0);
    assert_eq!(view.metrics.profit_margin, 0.0);
    assert!(approx(view.metrics.margin_delta, -view.metrics.overall_margin));
}

#[test]
fn exports_write_readable_files() {
    let dir = TempDir::new().unwrap();
    let data = ingest::load_sales_records(&write_csv(&dir)).unwrap();
    let selection =
        pipeline::resolve_selection(&data.records, Some("Furniture"), &["chairs".to_string()], false).unwrap();
    let view = pipeline::build_view(&data.records, &selection);

    let records_path = dir.path().join("records.csv");
    let rows: Vec<_> = view.filtered.iter().collect();
    export::write_records_csv(&records_path, &rows).unwrap();
    let txt = fs::read_to_string(&records_path).unwrap();
    let mut lines = txt.lines();
    assert_eq!(
        lines.next().unwrap(),
        "order_id,order_date,category,sub_category,product_name,sales,profit"
    );
    assert_eq!(lines.next().unwrap(), "CA-1,2023-01-10,Furniture,Chairs,Task Chair,100.0000,20.0000");
    assert_eq!(lines.next().unwrap(), "CA-4,2023-03-01,Furniture,Chairs,Stool,,");
    assert!(lines.next().is_none());

    // The exported records ingest again.
    let reloaded = ingest::load_sales_records(&records_path).unwrap();
    assert_eq!(reloaded.stats.n_records, 2);
    assert!(approx(aggregate::totals(&reloaded.records).sales, 100.0));

    let monthly_path = dir.path().join("monthly.csv");
    export::write_monthly_csv(&monthly_path, &view.monthly).unwrap();
    assert_eq!(
        fs::read_to_string(&monthly_path).unwrap(),
        "month,sales\n2023-01,100.0000\n2023-03,0.0000\n"
    );

    let metrics_path = dir.path().join("metrics.json");
    let snapshot = pipeline::metrics_file(&view, "sales.csv");
    export::write_metrics_json(&metrics_path, &snapshot).unwrap();
    let back: MetricsFile = serde_json::from_reader(fs::File::open(&metrics_path).unwrap()).unwrap();
    assert_eq!(back.selection, snapshot.selection);
    assert!(approx(back.metrics.profit_margin, 20.0));
    assert_eq!(back.records_selected, 2);
    assert_eq!(back.monthly.len(), 2);
    assert_eq!(back.monthly[0].month, "2023-01");
}

#[test]
fn input_errors_use_exit_code_two() {
    let dir = TempDir::new().unwrap();

    let err = ingest::load_sales_records(&dir.path().join("missing.csv")).unwrap_err();
    assert_eq!(err.exit_code(), 2);

    let no_profit = dir.path().join("no_profit.csv");
    fs::write(&no_profit, "Category,Sub-Category,Order Date,Sales\nFurniture,Chairs,2023-01-01,5\n").unwrap();
    let err = ingest::load_sales_records(&no_profit).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("profit"));

    let data = ingest::load_sales_records(&write_csv(&dir)).unwrap();
    let err = pipeline::resolve_selection(&data.records, Some("Toys"), &[], false).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("Office Supplies"));
}

#[test]
fn header_only_file_has_no_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "Category,Sub-Category,Order Date,Sales,Profit\n").unwrap();

    let err = ingest::load_sales_records(&path).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}
