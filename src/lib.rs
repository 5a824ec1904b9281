//! `superstore-dash` library crate.
//!
//! The binary (`dash`) is a thin wrapper around this library so that:
//!
//! - the aggregation logic is testable without spawning processes
//! - the CLI reports and the TUI share one pipeline
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
