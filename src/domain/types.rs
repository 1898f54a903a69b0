//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages in-memory
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use chrono::{Datelike, Days, Months, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Calendar cadence the series is resampled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Quarterly,
    HalfYearly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Quarterly, Frequency::HalfYearly, Frequency::Yearly];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Frequency::Quarterly => "quarterly",
            Frequency::HalfYearly => "half-yearly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Width of one period in calendar months.
    pub fn months(self) -> u32 {
        match self {
            Frequency::Quarterly => 3,
            Frequency::HalfYearly => 6,
            Frequency::Yearly => 12,
        }
    }

    pub fn periods_per_year(self) -> usize {
        (12 / self.months()) as usize
    }

    /// Fixed horizon used for long-range (five-year) forecasts.
    pub fn long_range_horizon(self) -> usize {
        match self {
            Frequency::Quarterly => 20,
            Frequency::HalfYearly => 10,
            Frequency::Yearly => 5,
        }
    }

    /// First day of the calendar period containing `date`.
    pub fn period_start(self, date: NaiveDate) -> Option<NaiveDate> {
        let months = self.months();
        let start_month = (date.month0() / months) * months + 1;
        NaiveDate::from_ymd_opt(date.year(), start_month, 1)
    }

    /// Label of the period containing `date`: the period's last day.
    pub fn period_end(self, date: NaiveDate) -> Option<NaiveDate> {
        self.period_start(date)?
            .checked_add_months(Months::new(self.months()))?
            .checked_sub_days(Days::new(1))
    }

    /// Label of the period following the one labelled `label`.
    pub fn next_period_end(self, label: NaiveDate) -> Option<NaiveDate> {
        let next_start = label.checked_add_days(Days::new(1))?;
        self.period_end(next_start)
    }
}

/// How a result is drawn in the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    Line,
    Bar,
}

/// Lifecycle of a single forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Draft,
    Processed,
    Forecasted,
}

/// Role a column plays in the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    NumericTarget,
    Other,
}

/// Decoded tabular data: a header row plus string cells.
///
/// Every row has exactly `columns.len()` cells; rows with a different field
/// count are rejected by the decoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, in row order.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).map(String::as_str).unwrap_or(""))
    }

    /// Look up a cell by row index and column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

/// One observation of a regular series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub ds: NaiveDate,
    pub y: f64,
}

/// Regularly spaced, gap-free series with strictly increasing dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub frequency: Frequency,
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.ds)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.ds)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.ds).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

/// Positional train/test partition of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: TimeSeries,
    pub test: TimeSeries,
}

/// Per-period model output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    /// Yearly seasonal contribution (present only when seasonality is fitted).
    pub yearly: Option<f64>,
    /// Holiday contribution (present only when holidays are fitted).
    pub holidays: Option<f64>,
}

/// Point estimate with its prediction interval and trend.
///
/// Keys stay snake_case (`yhat_lower`, ...) like `PredictionRow`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
}

impl From<&PredictionRow> for ForecastPoint {
    fn from(row: &PredictionRow) -> Self {
        Self {
            ds: row.ds,
            yhat: row.yhat,
            yhat_lower: row.yhat_lower,
            yhat_upper: row.yhat_upper,
            trend: row.trend,
        }
    }
}

/// One value of an additive model component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentPoint {
    pub ds: NaiveDate,
    pub value: f64,
}

/// Backtest accuracy. All three are `None` when no test period could be aligned.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
    pub mape: Option<f64>,
}

/// Everything a caller needs to display a finished forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub frequency: Frequency,
    pub horizon: usize,
    pub historical: Vec<SeriesPoint>,
    pub train: Vec<SeriesPoint>,
    pub test: Vec<SeriesPoint>,
    /// Predictions strictly after the last historical date.
    pub forecast: Vec<ForecastPoint>,
    /// In-sample and future predictions.
    pub full_forecast: Vec<ForecastPoint>,
    pub seasonal_component: Option<Vec<ComponentPoint>>,
    pub holiday_component: Option<Vec<ComponentPoint>>,
    pub metrics: Metrics,
}

/// Per-request configuration supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastConfig {
    pub period: Frequency,
    pub horizon: usize,
    #[serde(default)]
    pub five_year_forecast: bool,
    #[serde(default = "default_true")]
    pub yearly_seasonality: bool,
    #[serde(default)]
    pub include_holidays: bool,
    #[serde(default)]
    pub date_column: Option<String>,
    #[serde(default)]
    pub target_column: Option<String>,
    /// Coverage of the prediction interval, in (0, 1).
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
}

fn default_true() -> bool {
    true
}

pub const DEFAULT_INTERVAL_WIDTH: f64 = 0.80;

fn default_interval_width() -> f64 {
    DEFAULT_INTERVAL_WIDTH
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            period: Frequency::Quarterly,
            horizon: 12,
            five_year_forecast: false,
            yearly_seasonality: true,
            include_holidays: false,
            date_column: None,
            target_column: None,
            interval_width: DEFAULT_INTERVAL_WIDTH,
        }
    }
}

impl ForecastConfig {
    /// Number of future periods requested.
    pub fn effective_horizon(&self) -> usize {
        if self.five_year_forecast {
            self.period.long_range_horizon()
        } else {
            self.horizon
        }
    }
}
