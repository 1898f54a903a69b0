//! `csv-forecast` library crate.
//!
//! The binary (`fcst`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - the request entry point (`app::pipeline::run_request`) can be embedded
//!   by other front-ends (HTTP handlers, notebooks, etc.)

pub mod app;
pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod series;
