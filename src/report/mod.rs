//! Reporting utilities: metric blocks and tables for terminal output.

pub mod format;

pub use format::*;
