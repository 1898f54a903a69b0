//! Read/write result JSON files.
//!
//! Result JSON is the portable form of a finished forecast: the same
//! camelCase document `run_request` returns on success. `fcst plot` reloads it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::ForecastResult;
use crate::error::AppError;

/// Write a result JSON file.
pub fn write_result_json(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    tracing::info!(path = %path.display(), "result JSON written");
    Ok(())
}

/// Read a result JSON file.
pub fn read_result_json(path: &Path) -> Result<ForecastResult, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| AppError::new(2, format!("Invalid result JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastConfig, Frequency, SeriesPoint, TimeSeries};
    use chrono::NaiveDate;

    #[test]
    fn saved_result_reloads_for_plotting() {
        let mut ds = NaiveDate::from_ymd_opt(2019, 6, 30).unwrap();
        let mut points = Vec::new();
        for y in [3.0, 5.0, 4.0, 6.0, 5.0, 7.0] {
            points.push(SeriesPoint { ds, y });
            ds = Frequency::HalfYearly.next_period_end(ds).unwrap();
        }
        let series = TimeSeries {
            frequency: Frequency::HalfYearly,
            points,
        };
        let config = ForecastConfig {
            period: Frequency::HalfYearly,
            horizon: 2,
            ..ForecastConfig::default()
        };
        let result = crate::forecast::forecast(&series, &config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        write_result_json(&path, &result).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"fullForecast\""));
        assert!(text.contains("\"half_yearly\""));

        let loaded = read_result_json(&path).unwrap();
        assert_eq!(loaded.historical, result.historical);
        assert_eq!(loaded.forecast.len(), result.forecast.len());
        assert_eq!(loaded.metrics.rmse.is_some(), result.metrics.rmse.is_some());
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_result_json(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
