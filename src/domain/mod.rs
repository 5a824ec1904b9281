//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - normalized sales rows (`SalesRecord`)
//! - the user's filter (`Selection`)
//! - aggregation outputs (`Totals`, `CategoryTotals`, `DashboardMetrics`, `YearMonth`)
//! - the resolved run configuration (`DashConfig`)

pub mod types;

pub use types::*;
