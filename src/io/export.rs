//! Export predictions to CSV.
//!
//! One row per predicted period (in-sample and future), with the additive
//! components and the observed value where one exists. Meant to be easy to
//! consume in spreadsheets or downstream scripts.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{ComponentPoint, ForecastResult};
use crate::error::AppError;

pub const EXPORT_HEADER: &str = "ds,yhat,yhat_lower,yhat_upper,trend,yearly,holidays,actual";

/// Write the forecast CSV to `path`.
pub fn write_forecast_csv(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_forecast_rows(&mut out, result)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    tracing::info!(path = %path.display(), rows = result.full_forecast.len(), "forecast CSV written");
    Ok(())
}

/// Write the forecast CSV to any writer.
pub fn write_forecast_rows<W: Write>(out: &mut W, result: &ForecastResult) -> Result<(), AppError> {
    writeln!(out, "{EXPORT_HEADER}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let actual: HashMap<NaiveDate, f64> = result.historical.iter().map(|p| (p.ds, p.y)).collect();
    let yearly = by_date(result.seasonal_component.as_deref());
    let holidays = by_date(result.holiday_component.as_deref());

    for p in &result.full_forecast {
        let s = yearly.get(&p.ds).copied();
        let h = holidays.get(&p.ds).copied();
        writeln!(
            out,
            "{},{:.6},{:.6},{:.6},{:.6},{},{},{}",
            p.ds,
            p.yhat,
            p.yhat_lower,
            p.yhat_upper,
            p.trend,
            fmt_opt(s),
            fmt_opt(h),
            fmt_opt(actual.get(&p.ds).copied()),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

fn by_date(points: Option<&[ComponentPoint]>) -> HashMap<NaiveDate, f64> {
    points
        .unwrap_or_default()
        .iter()
        .map(|c| (c.ds, c.value))
        .collect()
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.6}")).unwrap_or_default()
}
