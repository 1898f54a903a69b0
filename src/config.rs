//! Process-level settings read from the environment (and `.env`).
//!
//! - `FORECAST_LOG`: tracing filter directive (e.g. `info`, `csv_forecast=debug`)
//! - `FORECAST_INTERVAL_WIDTH`: prediction interval coverage in (0, 1)

use crate::domain::DEFAULT_INTERVAL_WIDTH;
use crate::error::PipelineError;

pub const LOG_ENV: &str = "FORECAST_LOG";
pub const INTERVAL_WIDTH_ENV: &str = "FORECAST_INTERVAL_WIDTH";

/// Filter used when neither `FORECAST_LOG` nor `--verbose` is given.
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_filter: Option<String>,
    pub interval_width: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: None,
            interval_width: DEFAULT_INTERVAL_WIDTH,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Result<Self, PipelineError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let log_filter = lookup(LOG_ENV).filter(|s| !s.trim().is_empty());

        let interval_width = match lookup(INTERVAL_WIDTH_ENV) {
            None => DEFAULT_INTERVAL_WIDTH,
            Some(raw) => parse_interval_width(&raw)?,
        };

        Ok(Self {
            log_filter,
            interval_width,
        })
    }

    /// Filter directive for the tracing subscriber.
    pub fn log_directive(&self, verbose: bool) -> String {
        match (&self.log_filter, verbose) {
            (Some(filter), _) => filter.clone(),
            (None, true) => "info".to_string(),
            (None, false) => DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn parse_interval_width(raw: &str) -> Result<f64, PipelineError> {
    let width: f64 = raw
        .trim()
        .parse()
        .map_err(|_| PipelineError::Config(format!("{INTERVAL_WIDTH_ENV} is not a number: '{raw}'")))?;
    if !(width > 0.0 && width < 1.0) {
        return Err(PipelineError::Config(format!(
            "{INTERVAL_WIDTH_ENV} must be strictly between 0 and 1, got {width}"
        )));
    }
    Ok(width)
}
