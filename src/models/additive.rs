//! Additive trend + seasonality + holiday model.
//!
//! `y(t) = β0 + β1·t + Σ_k (a_k sin(2πkt/P) + b_k cos(2πkt/P)) + γ·h(t)`
//!
//! - `t` is years since the first training date
//! - the Fourier order follows the cadence (2 for quarterly, 1 for half-yearly)
//! - `h(t)` is the holiday count of the period, centred on the training mean
//!
//! All coefficients are solved jointly by least squares, so each component
//! can be reported separately. Intervals widen with distance from the end of
//! training: `yhat ± z·σ·sqrt(1 + k/n)`.

use chrono::NaiveDate;

use crate::domain::{Frequency, PredictionRow, TimeSeries};
use crate::error::PipelineError;
use crate::math::{YEAR_DAYS, design_matrix, interval_z, max_fourier_order, push_fourier_terms, residual_std, solve_least_squares};
use crate::models::holidays;
use crate::models::{SeasonalModel, SeasonalityConfig};

use nalgebra::DVector;

/// The bundled seasonal model.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditiveModel;

/// Fitted coefficients plus everything needed to rebuild design rows.
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveFit {
    pub frequency: Frequency,
    pub origin: NaiveDate,
    pub last_train_date: NaiveDate,
    pub n_train: usize,
    /// 0 when yearly seasonality is disabled.
    pub fourier_order: usize,
    pub holidays: bool,
    /// Mean training holiday count subtracted from the regressor.
    pub holiday_offset: f64,
    pub coefficients: Vec<f64>,
    pub sigma: f64,
    pub z: f64,
}

impl AdditiveFit {
    fn fourier_range(&self) -> std::ops::Range<usize> {
        2..2 + 2 * self.fourier_order
    }

    fn holiday_index(&self) -> Option<usize> {
        self.holidays.then_some(2 + 2 * self.fourier_order)
    }

    fn design_row(&self, date: NaiveDate) -> Result<Vec<f64>, PipelineError> {
        fill_design_row(
            self.frequency,
            self.origin,
            date,
            self.fourier_order,
            self.holidays.then_some(self.holiday_offset),
        )
    }

    /// Whole periods between the end of training and `date` (0 in-sample).
    fn steps_ahead(&self, date: NaiveDate) -> f64 {
        if date <= self.last_train_date {
            return 0.0;
        }
        let period_days = YEAR_DAYS / self.frequency.periods_per_year() as f64;
        ((date - self.last_train_date).num_days() as f64 / period_days).round()
    }
}

impl SeasonalModel for AdditiveModel {
    type Fitted = AdditiveFit;

    fn fit(&self, train: &TimeSeries, config: &SeasonalityConfig) -> Result<AdditiveFit, PipelineError> {
        let (Some(origin), Some(last_train_date)) = (train.first_date(), train.last_date()) else {
            return Err(PipelineError::Model("cannot fit an empty training series".to_string()));
        };
        let z = interval_z(config.interval_width).ok_or_else(|| {
            PipelineError::Config(format!(
                "interval width must be strictly between 0 and 1, got {}",
                config.interval_width
            ))
        })?;

        let frequency = train.frequency;
        let fourier_order = if config.yearly {
            max_fourier_order(frequency.periods_per_year())
        } else {
            0
        };

        let holiday_offset = if config.holidays {
            let counts = train
                .points
                .iter()
                .map(|p| period_holidays(frequency, p.ds))
                .collect::<Result<Vec<_>, _>>()?;
            counts.iter().sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };
        let holiday = config.holidays.then_some(holiday_offset);

        let rows = train
            .points
            .iter()
            .map(|p| fill_design_row(frequency, origin, p.ds, fourier_order, holiday))
            .collect::<Result<Vec<_>, _>>()?;
        let x = design_matrix(&rows)
            .ok_or_else(|| PipelineError::Model("could not build the design matrix".to_string()))?;
        let y = DVector::from_iterator(train.len(), train.points.iter().map(|p| p.y));

        let beta = solve_least_squares(&x, &y)
            .ok_or_else(|| PipelineError::Model("least squares solve failed (ill-conditioned design)".to_string()))?;

        let fitted = &x * &beta;
        let residuals: Vec<f64> = y.iter().zip(fitted.iter()).map(|(a, b)| a - b).collect();
        let sigma = residual_std(&residuals, x.ncols());

        tracing::debug!(
            n = train.len(),
            columns = x.ncols(),
            fourier_order,
            holidays = config.holidays,
            sigma,
            "additive model fitted"
        );

        Ok(AdditiveFit {
            frequency,
            origin,
            last_train_date,
            n_train: train.len(),
            fourier_order,
            holidays: config.holidays,
            holiday_offset,
            coefficients: beta.iter().copied().collect(),
            sigma,
            z,
        })
    }

    fn predict(&self, fitted: &AdditiveFit, dates: &[NaiveDate]) -> Result<Vec<PredictionRow>, PipelineError> {
        let c = &fitted.coefficients;
        let mut out = Vec::with_capacity(dates.len());

        for &ds in dates {
            let row = fitted.design_row(ds)?;
            if row.len() != c.len() {
                return Err(PipelineError::Model(
                    "design row does not match fitted coefficients".to_string(),
                ));
            }

            let trend = c[0] * row[0] + c[1] * row[1];
            let yearly = (fitted.fourier_order > 0)
                .then(|| fitted.fourier_range().map(|j| c[j] * row[j]).sum::<f64>());
            let holidays = fitted.holiday_index().map(|j| c[j] * row[j]);
            let yhat = trend + yearly.unwrap_or(0.0) + holidays.unwrap_or(0.0);

            if !yhat.is_finite() {
                return Err(PipelineError::Model(format!("non-finite prediction for {ds}")));
            }

            let k = fitted.steps_ahead(ds);
            let half_width = fitted.z * fitted.sigma * (1.0 + k / fitted.n_train as f64).sqrt();

            out.push(PredictionRow {
                ds,
                yhat,
                yhat_lower: yhat - half_width,
                yhat_upper: yhat + half_width,
                trend,
                yearly,
                holidays,
            });
        }

        Ok(out)
    }
}

/// Fill a design row: intercept, trend, Fourier terms, optional holiday count.
fn fill_design_row(
    frequency: Frequency,
    origin: NaiveDate,
    date: NaiveDate,
    fourier_order: usize,
    holiday_offset: Option<f64>,
) -> Result<Vec<f64>, PipelineError> {
    let t_days = (date - origin).num_days() as f64;
    let mut row = Vec::with_capacity(3 + 2 * fourier_order);
    row.push(1.0);
    row.push(t_days / YEAR_DAYS);
    push_fourier_terms(t_days, fourier_order, &mut row);
    if let Some(offset) = holiday_offset {
        row.push(period_holidays(frequency, date)? - offset);
    }
    Ok(row)
}

fn period_holidays(frequency: Frequency, label: NaiveDate) -> Result<f64, PipelineError> {
    let start = frequency
        .period_start(label)
        .ok_or_else(|| PipelineError::Unknown(format!("no calendar period for {label}")))?;
    Ok(holidays::count_between(start, label) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesPoint;

    fn quarter_ends(n: usize) -> Vec<NaiveDate> {
        let mut d = NaiveDate::from_ymd_opt(2015, 3, 31).unwrap();
        let mut out = vec![d];
        for _ in 1..n {
            d = Frequency::Quarterly.next_period_end(d).unwrap();
            out.push(d);
        }
        out
    }

    fn config(yearly: bool, holidays: bool) -> SeasonalityConfig {
        SeasonalityConfig {
            yearly,
            holidays,
            interval_width: 0.8,
        }
    }

    #[test]
    fn recovers_an_exact_linear_trend() {
        let dates = quarter_ends(12);
        let origin = dates[0];
        let line = |d: NaiveDate| 5.0 + 3.0 * (d - origin).num_days() as f64 / YEAR_DAYS;
        let train = TimeSeries {
            frequency: Frequency::Quarterly,
            points: dates.iter().map(|&ds| SeriesPoint { ds, y: line(ds) }).collect(),
        };

        let model = AdditiveModel;
        let fit = model.fit(&train, &config(false, false)).unwrap();
        assert!(fit.sigma < 1e-8);

        let future = crate::models::future_dates(&train, 4).unwrap();
        let preds = model.predict(&fit, &future).unwrap();
        assert_eq!(preds.len(), 16);
        for p in &preds {
            assert!((p.yhat - line(p.ds)).abs() < 1e-6, "{} vs {}", p.yhat, line(p.ds));
            assert!(p.yearly.is_none());
            assert!(p.holidays.is_none());
            assert!(p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper);
        }
    }

    #[test]
    fn seasonal_pattern_is_captured() {
        let dates = quarter_ends(16);
        let pattern = [10.0, 14.0, 12.0, 6.0];
        let train = TimeSeries {
            frequency: Frequency::Quarterly,
            points: dates
                .iter()
                .enumerate()
                .map(|(i, &ds)| SeriesPoint { ds, y: 100.0 + pattern[i % 4] })
                .collect(),
        };

        let model = AdditiveModel;
        let seasonal = model.fit(&train, &config(true, false)).unwrap();
        let flat = model.fit(&train, &config(false, false)).unwrap();
        assert_eq!(seasonal.fourier_order, 2);
        assert!(seasonal.sigma < flat.sigma);

        let preds = model.predict(&seasonal, &train.dates()).unwrap();
        for (p, obs) in preds.iter().zip(&train.points) {
            assert!((p.yhat - obs.y).abs() < 1.0);
            assert!(p.yearly.is_some());
        }
    }

    #[test]
    fn holiday_component_is_reported() {
        let dates = quarter_ends(8);
        let train = TimeSeries {
            frequency: Frequency::Quarterly,
            points: dates.iter().enumerate().map(|(i, &ds)| SeriesPoint { ds, y: i as f64 }).collect(),
        };
        let model = AdditiveModel;
        let fit = model.fit(&train, &config(false, true)).unwrap();
        let preds = model.predict(&fit, &train.dates()).unwrap();
        assert!(preds.iter().all(|p| p.holidays.is_some()));
        let total: f64 = preds.iter().map(|p| p.trend + p.holidays.unwrap() - p.yhat).sum();
        assert!(total.abs() < 1e-9);
    }

    #[test]
    fn future_intervals_widen() {
        let dates = quarter_ends(8);
        let train = TimeSeries {
            frequency: Frequency::Quarterly,
            points: dates
                .iter()
                .enumerate()
                .map(|(i, &ds)| SeriesPoint { ds, y: if i % 2 == 0 { 1.0 } else { 3.0 } })
                .collect(),
        };
        let model = AdditiveModel;
        let fit = model.fit(&train, &config(false, false)).unwrap();
        let future = crate::models::future_dates(&train, 4).unwrap();
        let preds = model.predict(&fit, &future).unwrap();
        let width = |p: &PredictionRow| p.yhat_upper - p.yhat_lower;
        assert!(width(&preds[11]) > width(&preds[7]));
        assert!((width(&preds[0]) - width(&preds[7])).abs() < 1e-12);
    }

    #[test]
    fn invalid_interval_width_is_a_config_error() {
        let train = TimeSeries {
            frequency: Frequency::Yearly,
            points: vec![
                SeriesPoint { ds: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(), y: 1.0 },
                SeriesPoint { ds: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(), y: 2.0 },
            ],
        };
        let err = AdditiveModel
            .fit(&train, &SeasonalityConfig { yearly: false, holidays: false, interval_width: 1.5 })
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
