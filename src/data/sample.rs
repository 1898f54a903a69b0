//! Synthetic monthly sales sample with trend, seasonality and noise.
//!
//! The seasonal effect is constant within each period of the chosen cadence
//! (so a quarterly sample has four distinct levels per year). A small share of
//! target cells is left empty to exercise imputation.

use std::f64::consts::PI;
use std::path::Path;

use chrono::{Datelike, Months, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Frequency, RawTable};
use crate::error::AppError;

pub const SAMPLE_COLUMNS: [&str; 3] = ["date", "sales", "region"];

const REGIONS: [&str; 3] = ["north", "south", "west"];
const BASE_LEVEL: f64 = 100.0;
const MONTHLY_SLOPE: f64 = 0.8;
const SEASONAL_AMPLITUDE: f64 = 12.0;
const NOISE_SIGMA: f64 = 2.5;
const MISSING_PROB: f64 = 0.03;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub frequency: Frequency,
    pub count: usize,
    pub seed: u64,
    pub start: NaiveDate,
}

impl SampleConfig {
    pub fn new(frequency: Frequency, count: usize, seed: u64) -> Self {
        Self {
            frequency,
            count,
            seed,
            start: NaiveDate::from_ymd_opt(2015, 1, 15).unwrap_or_default(),
        }
    }
}

/// Generate `count` monthly rows.
pub fn generate_sample(config: &SampleConfig) -> Result<RawTable, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, NOISE_SIGMA)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(config.count);
    for i in 0..config.count {
        let date = config
            .start
            .checked_add_months(Months::new(i as u32))
            .ok_or_else(|| AppError::new(2, "Sample runs past the supported calendar range."))?;

        let level = BASE_LEVEL + MONTHLY_SLOPE * i as f64;
        let value = level + seasonal_effect(config.frequency, date) + normal.sample(&mut rng);
        let missing = rng.r#gen::<f64>() < MISSING_PROB;
        let region = REGIONS[rng.gen_range(0..REGIONS.len())];

        rows.push(vec![
            date.to_string(),
            if missing { String::new() } else { format!("{value:.2}") },
            region.to_string(),
        ]);
    }

    Ok(RawTable::new(
        SAMPLE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        rows,
    ))
}

/// Write a table as comma-separated CSV.
pub fn write_sample_csv(path: &Path, table: &RawTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    writer
        .write_record(&table.columns)
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV header: {e}")))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

/// Seasonal offset of the period containing `date`; zero for yearly cadence.
fn seasonal_effect(frequency: Frequency, date: NaiveDate) -> f64 {
    let ppy = frequency.periods_per_year();
    if ppy < 2 {
        return 0.0;
    }
    let slot = (date.month0() / frequency.months()) as f64;
    SEASONAL_AMPLITUDE * (2.0 * PI * (slot + 0.5) / ppy as f64).sin()
}
