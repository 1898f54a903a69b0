//! Fourier basis for yearly seasonality.
//!
//! For a time `t` measured in days, the order-`k` pair is:
//!
//! - `sin(2π k t / P)`
//! - `cos(2π k t / P)`
//!
//! with `P = 365.25`. Terms are laid out `[sin_1, cos_1, sin_2, cos_2, ...]`.

use std::f64::consts::PI;

/// Length of a year in days.
pub const YEAR_DAYS: f64 = 365.25;

/// Append `2 * order` Fourier terms for day offset `t` to `out`.
pub fn push_fourier_terms(t_days: f64, order: usize, out: &mut Vec<f64>) {
    for k in 1..=order {
        let x = 2.0 * PI * k as f64 * t_days / YEAR_DAYS;
        out.push(x.sin());
        out.push(x.cos());
    }
}

/// Highest Fourier order that is identifiable at `periods_per_year` samples
/// per year (Nyquist), never below 1.
pub fn max_fourier_order(periods_per_year: usize) -> usize {
    (periods_per_year / 2).max(1)
}
