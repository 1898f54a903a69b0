//! Fixed-region holiday calendar (US federal holidays).
//!
//! Dates are the nominal holiday dates; weekend "observed" shifts are not
//! applied because the model only counts holidays per quarter or coarser.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Region the calendar describes.
pub const HOLIDAY_REGION: &str = "US";

/// Named holidays of one calendar year, in date order.
pub fn holidays_for_year(year: i32) -> Vec<(NaiveDate, &'static str)> {
    let mut out: Vec<(NaiveDate, &'static str)> = [
        (NaiveDate::from_ymd_opt(year, 1, 1), "New Year's Day"),
        (nth_weekday(year, 1, Weekday::Mon, 3), "Martin Luther King Jr. Day"),
        (nth_weekday(year, 2, Weekday::Mon, 3), "Washington's Birthday"),
        (last_weekday(year, 5, Weekday::Mon), "Memorial Day"),
        (
            if year >= 2021 { NaiveDate::from_ymd_opt(year, 6, 19) } else { None },
            "Juneteenth National Independence Day",
        ),
        (NaiveDate::from_ymd_opt(year, 7, 4), "Independence Day"),
        (nth_weekday(year, 9, Weekday::Mon, 1), "Labor Day"),
        (nth_weekday(year, 10, Weekday::Mon, 2), "Columbus Day"),
        (NaiveDate::from_ymd_opt(year, 11, 11), "Veterans Day"),
        (nth_weekday(year, 11, Weekday::Thu, 4), "Thanksgiving"),
        (NaiveDate::from_ymd_opt(year, 12, 25), "Christmas Day"),
    ]
    .into_iter()
    .filter_map(|(date, name)| date.map(|d| (d, name)))
    .collect();
    out.sort_by_key(|(d, _)| *d);
    out
}

/// Number of holidays falling in `[start, end]`.
pub fn count_between(start: NaiveDate, end: NaiveDate) -> usize {
    if end < start {
        return 0;
    }
    (start.year()..=end.year())
        .flat_map(holidays_for_year)
        .filter(|(d, _)| *d >= start && *d <= end)
        .count()
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut d = first_of_next.checked_sub_days(Days::new(1))?;
    while d.weekday() != weekday {
        d = d.checked_sub_days(Days::new(1))?;
    }
    Some(d)
}
