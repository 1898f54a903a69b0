//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - request configuration (`ForecastConfig`, `Frequency`, `PlotKind`)
//! - decoded input (`RawTable`) and the regular series built from it (`TimeSeries`)
//! - model and forecast outputs (`PredictionRow`, `ForecastResult`, `Metrics`)

pub mod types;

pub use types::*;
