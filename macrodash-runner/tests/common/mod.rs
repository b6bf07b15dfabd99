//! Test doubles shared by the runner integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use macrodash_core::data::{FetchRequest, SourceAdapter, SourceError};
use macrodash_core::registry::{Registry, SeriesSpec};
use macrodash_core::series::{Category, SeriesKey};
use macrodash_core::table::SeriesTable;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn builtin_spec(category: Category, name: &str) -> SeriesSpec {
    Registry::builtin()
        .get(&SeriesKey::new(category, name))
        .unwrap()
        .clone()
}

/// Weekday points from `start` to `end` with values 0, 1, 2, ...
pub fn weekday_points(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, f64)> {
    use chrono::{Datelike, Weekday};
    start
        .iter_days()
        .take_while(|x| *x <= end)
        .filter(|x| !matches!(x.weekday(), Weekday::Sat | Weekday::Sun))
        .enumerate()
        .map(|(i, x)| (x, i as f64))
        .collect()
}

/// Provider double holding a fixed history. Honors the request's start date
/// the way a range-filtering provider does.
pub struct HistoryAdapter {
    pub history: SeriesTable,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<FetchRequest>>,
}

impl HistoryAdapter {
    pub fn new(history: SeriesTable) -> Self {
        Self {
            history,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<FetchRequest> {
        self.requests.lock().unwrap().last().copied()
    }
}

impl SourceAdapter for HistoryAdapter {
    fn name(&self) -> &str {
        "history-double"
    }

    fn fetch(
        &self,
        _spec: &SeriesSpec,
        request: &FetchRequest,
    ) -> Result<SeriesTable, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(*request);
        Ok(match request.start_date() {
            Some(start) => self.history.since(start),
            None => self.history.clone(),
        })
    }
}

/// Provider double that always fails with the same error.
pub struct FailingAdapter {
    pub error: SourceError,
    pub calls: AtomicUsize,
}

impl FailingAdapter {
    pub fn new(error: SourceError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SourceAdapter for FailingAdapter {
    fn name(&self) -> &str {
        "failing-double"
    }

    fn fetch(
        &self,
        _spec: &SeriesSpec,
        _request: &FetchRequest,
    ) -> Result<SeriesTable, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// 1305 daily DFF observations from 2021-02-06 through 2026-02-06.
pub fn dff_history() -> SeriesTable {
    let mut points = vec![(d(2021, 2, 6), 5.33)];
    points.extend(
        weekday_points(d(2021, 2, 9), d(2026, 2, 6))
            .into_iter()
            .map(|(x, i)| (x, 5.33 + (i % 7.0) * 0.01)),
    );
    assert_eq!(points.len(), 1305);
    SeriesTable::time_value("value", points)
}

pub fn days(n: i64) -> Duration {
    Duration::days(n)
}
