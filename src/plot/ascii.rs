//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed history: `o` (line) or `#` bars
//! - model fit across history and horizon: `-` line
//! - future predictions: `*` (line) or `=` bars
//! - future interval bounds: `.`

use chrono::NaiveDate;

use crate::domain::{ForecastResult, PlotKind};

/// Render history plus forecast for a finished run.
pub fn render_forecast_plot(result: &ForecastResult, kind: PlotKind, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((d_min, d_max)) = date_range(result) else {
        return "Plot: nothing to draw\n".to_string();
    };
    let (y_min, y_max) = y_range(result).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let xs = XScale { start: d_min, end: d_max, width };
    let mut grid = vec![vec![' '; width]; height];

    match kind {
        PlotKind::Line => {
            let fit: Vec<(usize, usize)> = result
                .full_forecast
                .iter()
                .map(|p| (xs.map(p.ds), map_y(p.yhat, y_min, y_max, height)))
                .collect();
            draw_polyline(&mut grid, &fit, '-');
            draw_intervals(&mut grid, result, &xs, y_min, y_max);
            for p in &result.historical {
                grid[map_y(p.y, y_min, y_max, height)][xs.map(p.ds)] = 'o';
            }
            for p in &result.forecast {
                grid[map_y(p.yhat, y_min, y_max, height)][xs.map(p.ds)] = '*';
            }
        }
        PlotKind::Bar => {
            for p in &result.historical {
                draw_bar(&mut grid, xs.map(p.ds), map_y(p.y, y_min, y_max, height), '#');
            }
            for p in &result.forecast {
                draw_bar(&mut grid, xs.map(p.ds), map_y(p.yhat, y_min, y_max, height), '=');
            }
            draw_intervals(&mut grid, result, &xs, y_min, y_max);
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {d_min}..{d_max} | y=[{y_min:.2}, {y_max:.2}] | history={} forecast={}\n",
        result.historical.len(),
        result.forecast.len()
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Maps dates linearly onto grid columns.
struct XScale {
    start: NaiveDate,
    end: NaiveDate,
    width: usize,
}

impl XScale {
    fn map(&self, date: NaiveDate) -> usize {
        let span = (self.end - self.start).num_days();
        if span <= 0 {
            return 0;
        }
        let u = ((date - self.start).num_days() as f64 / span as f64).clamp(0.0, 1.0);
        (u * (self.width as f64 - 1.0)).round() as usize
    }
}

fn date_range(result: &ForecastResult) -> Option<(NaiveDate, NaiveDate)> {
    let dates = result
        .historical
        .iter()
        .map(|p| p.ds)
        .chain(result.full_forecast.iter().map(|p| p.ds));
    let (min, max) = dates.fold((None, None), |(lo, hi): (Option<NaiveDate>, Option<NaiveDate>), d| {
        (Some(lo.map_or(d, |x| x.min(d))), Some(hi.map_or(d, |x| x.max(d))))
    });
    Some((min?, max?))
}

fn y_range(result: &ForecastResult) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let values = result
        .historical
        .iter()
        .map(|p| p.y)
        .chain(result.full_forecast.iter().map(|p| p.yhat))
        .chain(result.forecast.iter().flat_map(|p| [p.yhat_lower, p.yhat_upper]));
    for y in values.filter(|y| y.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 1.0, min_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_intervals(grid: &mut [Vec<char>], result: &ForecastResult, xs: &XScale, y_min: f64, y_max: f64) {
    let height = grid.len();
    for p in &result.forecast {
        let x = xs.map(p.ds);
        for bound in [p.yhat_lower, p.yhat_upper] {
            let y = map_y(bound, y_min, y_max, height);
            if grid[y][x] == ' ' {
                grid[y][x] = '.';
            }
        }
    }
}

fn draw_bar(grid: &mut [Vec<char>], x: usize, top: usize, ch: char) {
    for row in grid.iter_mut().skip(top) {
        row[x] = ch;
    }
}

fn draw_polyline(grid: &mut [Vec<char>], points: &[(usize, usize)], ch: char) {
    let mut prev = None;
    for &(x, y) in points {
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, y, ch);
        } else {
            grid[y][x] = ch;
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastPoint, Frequency, Metrics, SeriesPoint};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fp(ds: NaiveDate, yhat: f64) -> ForecastPoint {
        ForecastPoint {
            ds,
            yhat,
            yhat_lower: yhat,
            yhat_upper: yhat,
            trend: yhat,
        }
    }

    fn small_result() -> ForecastResult {
        let historical = vec![
            SeriesPoint { ds: d(2020, 12, 31), y: 0.0 },
            SeriesPoint { ds: d(2021, 12, 31), y: 10.0 },
        ];
        ForecastResult {
            frequency: Frequency::Yearly,
            horizon: 1,
            historical: historical.clone(),
            train: historical,
            test: Vec::new(),
            forecast: vec![fp(d(2022, 12, 31), 10.0)],
            full_forecast: vec![fp(d(2020, 12, 31), 0.0), fp(d(2021, 12, 31), 10.0), fp(d(2022, 12, 31), 10.0)],
            seasonal_component: None,
            holiday_component: None,
            metrics: Metrics::default(),
        }
    }

    #[test]
    fn bar_golden_snapshot_small() {
        let txt = render_forecast_plot(&small_result(), PlotKind::Bar, 10, 5);
        let expected = concat!(
            "Plot: 2020-12-31..2022-12-31 | y=[-0.50, 10.50] | history=2 forecast=1\n",
            "     #   =\n",
            "     #   =\n",
            "     #   =\n",
            "     #   =\n",
            "#    #   =\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn line_marks_history_and_forecast() {
        let txt = render_forecast_plot(&small_result(), PlotKind::Line, 10, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].chars().next(), Some('o'));
        assert_eq!(rows[0].chars().nth(5), Some('o'));
        assert_eq!(rows[0].chars().nth(9), Some('*'));
        assert!(rows[0][6..9].chars().all(|c| c == '-'));
    }

    #[test]
    fn empty_result_does_not_panic() {
        let mut result = small_result();
        result.historical.clear();
        result.full_forecast.clear();
        result.forecast.clear();
        assert_eq!(render_forecast_plot(&result, PlotKind::Line, 40, 10), "Plot: nothing to draw\n");
    }
}
