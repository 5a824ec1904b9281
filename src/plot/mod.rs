//! Terminal plotting (fixed-size ASCII grids).

pub mod ascii;

pub use ascii::*;
