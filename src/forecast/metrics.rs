//! Backtest accuracy metrics.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{Metrics, PredictionRow, SeriesPoint};

/// Guards MAPE against division by a zero actual.
pub const MAPE_EPSILON: f64 = 1e-10;

/// Root mean squared error. `None` for empty or mismatched inputs.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    mean_of(actual, predicted, |a, p| (a - p).powi(2)).map(f64::sqrt)
}

/// Mean absolute error.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    mean_of(actual, predicted, |a, p| (a - p).abs())
}

/// Mean absolute percentage error, in percent.
///
/// The denominator is `actual + ε` (not `|actual|`), so negative actuals
/// produce negative terms.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    mean_of(actual, predicted, |a, p| (a - p).abs() / (a + MAPE_EPSILON)).map(|m| m * 100.0)
}

fn mean_of(actual: &[f64], predicted: &[f64], term: impl Fn(f64, f64) -> f64) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let sum: f64 = actual.iter().zip(predicted).map(|(&a, &p)| term(a, p)).sum();
    Some(sum / actual.len() as f64)
}

/// Left-join the test tail onto predictions by exact date and score it.
///
/// Every metric is `None` when the test set is empty or any test date has no
/// finite prediction.
pub fn backtest_metrics(test: &[SeriesPoint], predictions: &[PredictionRow]) -> Metrics {
    let by_date: HashMap<NaiveDate, f64> = predictions.iter().map(|p| (p.ds, p.yhat)).collect();

    let mut actual = Vec::with_capacity(test.len());
    let mut predicted = Vec::with_capacity(test.len());
    for point in test {
        match by_date.get(&point.ds) {
            Some(&yhat) if yhat.is_finite() && point.y.is_finite() => {
                actual.push(point.y);
                predicted.push(yhat);
            }
            _ => {
                tracing::warn!(date = %point.ds, "test period has no prediction; metrics unavailable");
                return Metrics::default();
            }
        }
    }

    Metrics {
        rmse: rmse(&actual, &predicted),
        mae: mae(&actual, &predicted),
        mape: mape(&actual, &predicted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(ds: NaiveDate, yhat: f64) -> PredictionRow {
        PredictionRow {
            ds,
            yhat,
            yhat_lower: yhat,
            yhat_upper: yhat,
            trend: yhat,
            yearly: None,
            holidays: None,
        }
    }

    #[test]
    fn reference_values() {
        let actual = [10.0, 20.0, 30.0];
        let predicted = [12.0, 18.0, 33.0];
        // errors 2, 2, 3 -> sqrt(17/3), 7/3, (0.2 + 0.1 + 0.1) / 3
        assert!((rmse(&actual, &predicted).unwrap() - (17.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((mae(&actual, &predicted).unwrap() - 7.0 / 3.0).abs() < 1e-9);
        assert!((mape(&actual, &predicted).unwrap() - 40.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn empty_inputs_have_no_metrics() {
        assert_eq!(rmse(&[], &[]), None);
        assert_eq!(mae(&[1.0], &[]), None);
        assert_eq!(backtest_metrics(&[], &[row(d(2020, 3, 31), 1.0)]), Metrics::default());
    }

    #[test]
    fn zero_actual_does_not_divide_by_zero() {
        let m = mape(&[0.0], &[1.0]).unwrap();
        assert!(m.is_finite());
        assert!(m > 1e9);
    }

    #[test]
    fn backtest_joins_on_date() {
        let test = vec![
            SeriesPoint { ds: d(2021, 3, 31), y: 10.0 },
            SeriesPoint { ds: d(2021, 6, 30), y: 20.0 },
        ];
        let preds = vec![
            row(d(2020, 12, 31), 99.0),
            row(d(2021, 6, 30), 18.0),
            row(d(2021, 3, 31), 12.0),
        ];
        let m = backtest_metrics(&test, &preds);
        assert!((m.mae.unwrap() - 2.0).abs() < 1e-12);
        assert!((m.rmse.unwrap() - 2.0).abs() < 1e-12);
        assert!((m.mape.unwrap() - 15.0).abs() < 1e-6);
    }

    #[test]
    fn missing_prediction_nulls_every_metric() {
        let test = vec![
            SeriesPoint { ds: d(2021, 3, 31), y: 10.0 },
            SeriesPoint { ds: d(2021, 6, 30), y: 20.0 },
        ];
        let preds = vec![row(d(2021, 3, 31), 12.0)];
        assert_eq!(backtest_metrics(&test, &preds), Metrics::default());
    }
}
