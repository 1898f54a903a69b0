//! Series preparation: `(date, target)` columns → regular, gap-free series.
//!
//! Steps, in order:
//!
//! 1. reject `date == target`
//! 2. parse dates (explicit `%Y%m` for six-digit codes, inference otherwise);
//!    rows with unparseable dates are dropped
//! 3. coerce the target to numbers; bad cells become missing
//! 4. resample to calendar periods by averaging, synthesizing empty periods
//! 5. fill missing periods with the mean of the present period values
//!
//! Mean imputation is deliberately simple and kept as-is so outputs stay
//! comparable with earlier runs.

pub mod resample;

use chrono::NaiveDate;

use crate::classify::{is_missing, looks_like_year_month_codes, parse_any, parse_number, parse_year_month_code};
use crate::domain::{Frequency, RawTable, SeriesPoint, TimeSeries};
use crate::error::PipelineError;

pub use resample::{Observation, resample_mean};

/// How the date column was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateParser {
    /// Six-digit `YYYYMM` codes.
    YearMonthCode,
    /// Per-cell inference.
    Inferred,
}

/// Row accounting for a preprocessing run.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessReport {
    pub date_parser: DateParser,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub missing_targets: usize,
    pub periods: usize,
    pub imputed_periods: usize,
}

/// Series plus the report describing how it was built.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    pub series: TimeSeries,
    pub report: PreprocessReport,
}

/// Build a regular series from two columns of `table`.
pub fn preprocess(
    table: &RawTable,
    date_column: &str,
    target_column: &str,
    frequency: Frequency,
) -> Result<TimeSeries, PipelineError> {
    preprocess_with_report(table, date_column, target_column, frequency).map(|p| p.series)
}

/// Same as [`preprocess`], also returning row accounting.
pub fn preprocess_with_report(
    table: &RawTable,
    date_column: &str,
    target_column: &str,
    frequency: Frequency,
) -> Result<Preprocessed, PipelineError> {
    if date_column == target_column {
        return Err(PipelineError::Config(format!(
            "date column and target column must differ (both are '{date_column}')"
        )));
    }
    let date_idx = require_column(table, date_column, "date")?;
    let target_idx = require_column(table, target_column, "target")?;

    let date_parser = if looks_like_year_month_codes(table, date_idx) {
        DateParser::YearMonthCode
    } else {
        DateParser::Inferred
    };

    let mut observations = Vec::with_capacity(table.row_count());
    let mut rows_dropped = 0usize;
    for row in &table.rows {
        let raw_date = row.get(date_idx).map(String::as_str).unwrap_or("");
        let date = match date_parser {
            DateParser::YearMonthCode => parse_year_month_code(raw_date),
            DateParser::Inferred => parse_any(raw_date),
        };
        let Some(date) = date else {
            rows_dropped += 1;
            continue;
        };
        let raw_value = row.get(target_idx).map(String::as_str).unwrap_or("");
        let value = if is_missing(raw_value) { None } else { parse_number(raw_value) };
        observations.push(Observation { date, value });
    }

    if observations.is_empty() {
        return Err(PipelineError::NoValidDates(date_column.to_string()));
    }
    if rows_dropped > 0 {
        tracing::warn!("Dropped {rows_dropped} row(s) with unparseable dates in column '{date_column}'");
    }

    let missing_targets = observations.iter().filter(|o| o.value.is_none()).count();
    if missing_targets == observations.len() {
        return Err(PipelineError::NoValidTarget(target_column.to_string()));
    }

    let periods = resample_mean(&observations, frequency)?;
    let (series, imputed_periods) = fill_with_mean(periods, frequency);

    if imputed_periods > 0 {
        tracing::warn!("Imputed {imputed_periods} empty period(s) with the series mean");
    }
    if series.len() < 2 {
        return Err(PipelineError::InsufficientData(series.len()));
    }

    tracing::info!(
        periods = series.len(),
        frequency = frequency.display_name(),
        rows_dropped,
        missing_targets,
        "series prepared"
    );

    Ok(Preprocessed {
        report: PreprocessReport {
            date_parser,
            rows_read: table.row_count(),
            rows_dropped,
            missing_targets,
            periods: series.len(),
            imputed_periods,
        },
        series,
    })
}

fn require_column(table: &RawTable, name: &str, what: &str) -> Result<usize, PipelineError> {
    table
        .column_index(name)
        .ok_or_else(|| PipelineError::Config(format!("{what} column '{name}' not found in the file")))
}

/// Replace missing period values with the mean of the present ones.
fn fill_with_mean(periods: Vec<(NaiveDate, Option<f64>)>, frequency: Frequency) -> (TimeSeries, usize) {
    let present: Vec<f64> = periods.iter().filter_map(|(_, v)| *v).collect();
    let mean = if present.is_empty() {
        0.0
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    };

    let imputed = periods.len() - present.len();
    let points = periods
        .into_iter()
        .map(|(ds, v)| SeriesPoint { ds, y: v.unwrap_or(mean) })
        .collect();

    (TimeSeries { frequency, points }, imputed)
}
