//! Seasonal forecasting models.
//!
//! The orchestrator only depends on the narrow `SeasonalModel` contract:
//! fit on a training series, then predict arbitrary dates. Any implementation
//! that honours it can be swapped in; `AdditiveModel` is the bundled one.

pub mod additive;
pub mod holidays;

use chrono::NaiveDate;

use crate::domain::{PredictionRow, TimeSeries};
use crate::error::PipelineError;

pub use additive::{AdditiveFit, AdditiveModel};
pub use holidays::HOLIDAY_REGION;

/// What the model should capture beyond its trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalityConfig {
    pub yearly: bool,
    /// Calendar holiday effects for `HOLIDAY_REGION`.
    pub holidays: bool,
    /// Coverage of the prediction interval, in (0, 1).
    pub interval_width: f64,
}

/// Fit/predict contract for a seasonal time-series model.
pub trait SeasonalModel {
    type Fitted;

    fn fit(&self, train: &TimeSeries, config: &SeasonalityConfig) -> Result<Self::Fitted, PipelineError>;

    /// Predict every date in `dates` (in-sample or future), in order.
    fn predict(&self, fitted: &Self::Fitted, dates: &[NaiveDate]) -> Result<Vec<PredictionRow>, PipelineError>;
}

/// Training dates followed by `periods` future period labels at the
/// series' cadence.
pub fn future_dates(train: &TimeSeries, periods: usize) -> Result<Vec<NaiveDate>, PipelineError> {
    let mut dates = train.dates();
    let Some(mut label) = train.last_date() else {
        return Ok(dates);
    };
    for _ in 0..periods {
        label = train.frequency.next_period_end(label).ok_or_else(|| {
            PipelineError::Unknown("forecast horizon runs past the supported calendar range".to_string())
        })?;
        dates.push(label);
    }
    Ok(dates)
}
