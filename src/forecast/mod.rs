//! Forecast orchestration: split, fit, predict, backtest, assemble.
//!
//! Steps:
//! 1. resolve the horizon (fixed five-year mapping or the configured count)
//! 2. positional 80/20 train/test split
//! 3. fit the seasonal model on `train`
//! 4. predict train history plus `horizon` periods past the end of training
//! 5. score predictions against `test` (left join on date)
//! 6. partition into future-only `forecast` and `full_forecast`

pub mod metrics;

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::domain::{
    ComponentPoint, ForecastConfig, ForecastPoint, ForecastResult, Frequency, PredictionRow, Split, TimeSeries,
};
use crate::error::PipelineError;
use crate::models::{AdditiveModel, SeasonalModel, SeasonalityConfig, future_dates};

pub use metrics::{MAPE_EPSILON, backtest_metrics, mae, mape, rmse};

/// Share of the series (by count, rounded down) used for training.
pub const TRAIN_FRACTION: f64 = 0.8;

/// Fewest training points a model is fitted on.
pub const MIN_TRAIN_POINTS: usize = 2;

/// Yearly seasonality needs at least this many points in the full series.
pub const MIN_POINTS_FOR_YEARLY: usize = 4;

/// Number of future periods to predict.
pub fn horizon(config: &ForecastConfig) -> usize {
    config.effective_horizon()
}

/// Split by position: leading 80% (rounded down) trains, the tail tests.
///
/// Training is padded up to `MIN_TRAIN_POINTS` when the series allows, so a
/// 2-point series trains on both points and has an empty test set.
pub fn split_series(series: &TimeSeries) -> Result<Split, PipelineError> {
    let n = series.len();
    let train_len = ((n as f64 * TRAIN_FRACTION).floor() as usize).max(MIN_TRAIN_POINTS).min(n);
    if train_len < MIN_TRAIN_POINTS {
        return Err(PipelineError::InsufficientTrainingData(train_len));
    }

    let (train, test) = series.points.split_at(train_len);
    Ok(Split {
        train: TimeSeries {
            frequency: series.frequency,
            points: train.to_vec(),
        },
        test: TimeSeries {
            frequency: series.frequency,
            points: test.to_vec(),
        },
    })
}

/// Model configuration derived from the request and the full series.
pub fn seasonality_config(series: &TimeSeries, config: &ForecastConfig) -> SeasonalityConfig {
    SeasonalityConfig {
        yearly: config.yearly_seasonality
            && series.len() >= MIN_POINTS_FOR_YEARLY
            && series.frequency != Frequency::Yearly,
        holidays: config.include_holidays,
        interval_width: config.interval_width,
    }
}

/// Forecast with the bundled additive model.
pub fn forecast(series: &TimeSeries, config: &ForecastConfig) -> Result<ForecastResult, PipelineError> {
    forecast_with(&AdditiveModel, series, config)
}

/// Forecast with any `SeasonalModel`.
pub fn forecast_with<M: SeasonalModel>(
    model: &M,
    series: &TimeSeries,
    config: &ForecastConfig,
) -> Result<ForecastResult, PipelineError> {
    if series.frequency != config.period {
        return Err(PipelineError::Config(format!(
            "series is {} but the request asks for {}",
            series.frequency.display_name(),
            config.period.display_name()
        )));
    }
    let Some(last_historical) = series.last_date() else {
        return Err(PipelineError::InsufficientData(0));
    };
    if series.len() < 2 {
        return Err(PipelineError::InsufficientData(series.len()));
    }

    let horizon = horizon(config);
    let split = split_series(series)?;
    let seasonality = seasonality_config(series, config);
    tracing::info!(
        train = split.train.len(),
        test = split.test.len(),
        horizon,
        yearly = seasonality.yearly,
        holidays = seasonality.holidays,
        "fitting seasonal model"
    );

    let dates = future_dates(&split.train, horizon)?;
    let predictions = guard_model(|| {
        let fitted = model.fit(&split.train, &seasonality)?;
        model.predict(&fitted, &dates)
    })?;

    let metrics = backtest_metrics(&split.test.points, &predictions);
    if let (Some(rmse), Some(mae), Some(mape)) = (metrics.rmse, metrics.mae, metrics.mape) {
        tracing::info!(rmse, mae, mape, "backtest metrics");
    }

    let full_forecast: Vec<ForecastPoint> = predictions.iter().map(ForecastPoint::from).collect();
    let forecast = full_forecast
        .iter()
        .filter(|p| p.ds > last_historical)
        .copied()
        .collect();

    Ok(ForecastResult {
        frequency: series.frequency,
        horizon,
        historical: series.points.clone(),
        train: split.train.points,
        test: split.test.points,
        forecast,
        full_forecast,
        seasonal_component: component(&predictions, |p| p.yearly),
        holiday_component: component(&predictions, |p| p.holidays),
        metrics,
    })
}

/// Run model code, turning panics into `PipelineError::Model`.
fn guard_model<T>(f: impl FnOnce() -> Result<T, PipelineError>) -> Result<T, PipelineError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "model panicked".to_string());
            tracing::error!(%message, "model panicked");
            Err(PipelineError::Model(message))
        }
    }
}

fn component(
    predictions: &[PredictionRow],
    value: impl Fn(&PredictionRow) -> Option<f64>,
) -> Option<Vec<ComponentPoint>> {
    predictions
        .iter()
        .map(|p| value(p).map(|v| ComponentPoint { ds: p.ds, value: v }))
        .collect()
}
