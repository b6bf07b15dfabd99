//! Date axes for generated series.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

/// Weekdays in `[end - span_days, end]`.
pub fn business_days(end: NaiveDate, span_days: i64) -> Vec<NaiveDate> {
    let start = end - Duration::days(span_days);
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

/// First day of every `step_months`-th month from `start` to `end`, inclusive.
pub fn month_starts(start: NaiveDate, end: NaiveDate, step_months: u32) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let Some(mut current) = start.with_day(1) else {
        return out;
    };
    while current <= end {
        out.push(current);
        match current.checked_add_months(Months::new(step_months)) {
            Some(next) => current = next,
            None => break,
        }
    }
    out
}

/// `n` evenly spaced points from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
