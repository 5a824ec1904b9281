//! Input/output helpers.
//!
//! - CSV ingest + normalization (`ingest`)
//! - record/monthly/metrics exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
