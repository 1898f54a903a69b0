//! Calendar resampling by period mean.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::Frequency;
use crate::error::PipelineError;

/// One dated observation; `value` is `None` when the target cell was missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Average observations into consecutive calendar periods.
///
/// Returns one entry per period between the first and last observation
/// (inclusive), labelled by the period's last day. Periods without any present
/// value come back as `None`.
pub fn resample_mean(
    observations: &[Observation],
    frequency: Frequency,
) -> Result<Vec<(NaiveDate, Option<f64>)>, PipelineError> {
    let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for obs in observations {
        let label = period_label(frequency, obs.date)?;
        let entry = buckets.entry(label).or_insert((0.0, 0));
        if let Some(v) = obs.value {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    let mut label = first;
    loop {
        let value = buckets
            .get(&label)
            .filter(|(_, n)| *n > 0)
            .map(|(sum, n)| sum / *n as f64);
        out.push((label, value));
        if label >= last {
            break;
        }
        label = frequency.next_period_end(label).ok_or_else(out_of_range)?;
    }

    Ok(out)
}

fn period_label(frequency: Frequency, date: NaiveDate) -> Result<NaiveDate, PipelineError> {
    frequency.period_end(date).ok_or_else(out_of_range)
}

fn out_of_range() -> PipelineError {
    PipelineError::Unknown("date outside the supported calendar range".to_string())
}
