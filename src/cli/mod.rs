//! Command-line parsing for the CSV forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline and modeling code; `app` turns these structs into requests.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Frequency, PlotKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fcst", version, about = "Seasonal forecasts from uploaded CSV files")]
pub struct Cli {
    /// Log pipeline stages to stderr (overridden by FORECAST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a file, build the series, fit, backtest and forecast.
    Forecast(ForecastArgs),
    /// Report the detected encoding, delimiter and column roles of a file.
    Detect(DetectArgs),
    /// Plot a previously saved result JSON.
    Plot(PlotArgs),
    /// Write a synthetic seasonal CSV.
    Sample(SampleArgs),
}

/// Options for a forecast run.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Delimited text file to forecast from.
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Resampling period.
    #[arg(short, long, value_enum, default_value_t = Frequency::Quarterly)]
    pub period: Frequency,

    /// Number of future periods to predict.
    #[arg(long, default_value_t = 12)]
    pub horizon: usize,

    /// Predict five years ahead regardless of --horizon.
    #[arg(long)]
    pub five_year: bool,

    /// Disable yearly seasonality.
    #[arg(long)]
    pub no_yearly_seasonality: bool,

    /// Model US federal holiday effects.
    #[arg(long)]
    pub holidays: bool,

    /// Date column (detected when omitted).
    #[arg(long, value_name = "COLUMN")]
    pub date_column: Option<String>,

    /// Target column (detected when omitted).
    #[arg(long, value_name = "COLUMN")]
    pub target_column: Option<String>,

    /// Save the result as JSON.
    #[arg(short, long, value_name = "JSON")]
    pub output: Option<PathBuf>,

    /// Export predictions (with components and actuals) to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Print the response JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub plot: PlotOptions,
}

/// Plot layout shared by `forecast` and `plot`.
#[derive(Debug, Args, Clone)]
pub struct PlotOptions {
    /// Chart style.
    #[arg(long, value_enum, default_value_t = PlotKind::Line)]
    pub plot_type: PlotKind,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for column detection.
#[derive(Debug, Args)]
pub struct DetectArgs {
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,
}

/// Options for plotting a saved result.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Result JSON produced by `fcst forecast --output`.
    #[arg(long, value_name = "JSON")]
    pub result: PathBuf,

    #[command(flatten)]
    pub plot: PlotOptions,
}

/// Options for synthetic sample generation.
#[derive(Debug, Args)]
pub struct SampleArgs {
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Cadence of the seasonal pattern.
    #[arg(short, long, value_enum, default_value_t = Frequency::Quarterly)]
    pub period: Frequency,

    /// Number of monthly rows.
    #[arg(short = 'n', long, default_value_t = 96)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_flags_parse() {
        let cli = Cli::parse_from([
            "fcst",
            "forecast",
            "--input",
            "sales.csv",
            "--period",
            "half-yearly",
            "--five-year",
            "--holidays",
            "--plot-type",
            "bar",
        ]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.period, Frequency::HalfYearly);
        assert!(args.five_year);
        assert!(args.holidays);
        assert!(!args.no_yearly_seasonality);
        assert_eq!(args.plot.plot_type, PlotKind::Bar);
        assert_eq!(args.horizon, 12);
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["fcst", "detect", "--input", "x.csv", "-v"]);
        assert!(cli.verbose);
    }
}
