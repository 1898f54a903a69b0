//! Reporting utilities: run summaries, metric and forecast tables.

pub mod format;

pub use format::*;
