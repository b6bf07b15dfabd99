//! Normalized in-memory series tables.
//!
//! A [`SeriesTable`] is one of four shapes. Keyed shapes (time-value, OHLCV,
//! panel) keep their rows ascending by index with no duplicate keys once
//! [`SeriesTable::normalize`] has run. Event logs have a positional index and
//! are stored as given.

use crate::series::{IndexKey, IndexRange, PanelAxis, Period, SeriesShape};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;
use thiserror::Error;

/// Column names of the OHLCV shape, in storage order after `date`.
pub const OHLCV_COLUMNS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

/// A single numeric column indexed by date.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeValueTable {
    pub column: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// One daily OHLCV observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// One panel row. `values` is aligned with [`PanelTable::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    pub key: IndexKey,
    pub values: Vec<f64>,
}

/// Numeric columns per country or metric over a date or year axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelTable {
    pub axis: PanelAxis,
    pub columns: Vec<String>,
    pub rows: Vec<PanelRow>,
}

/// Typed values of one event-log column.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValues {
    Text(Vec<String>),
    Number(Vec<f64>),
    Date(Vec<NaiveDate>),
}

impl EventValues {
    pub fn len(&self) -> usize {
        match self {
            EventValues::Text(v) => v.len(),
            EventValues::Number(v) => v.len(),
            EventValues::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cleared(&self) -> EventValues {
        match self {
            EventValues::Text(_) => EventValues::Text(Vec::new()),
            EventValues::Number(_) => EventValues::Number(Vec::new()),
            EventValues::Date(_) => EventValues::Date(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventColumn {
    pub name: String,
    pub values: EventValues,
}

impl EventColumn {
    pub fn text(name: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            values: EventValues::Text(values.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn number(name: &str, values: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            values: EventValues::Number(values.to_vec()),
        }
    }

    pub fn date(name: &str, values: Vec<NaiveDate>) -> Self {
        Self {
            name: name.to_string(),
            values: EventValues::Date(values),
        }
    }
}

/// Row-positional table of typed columns (policy events, calendars, trackers).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventLogTable {
    pub columns: Vec<EventColumn>,
}

impl EventLogTable {
    pub fn len(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Two tables whose shapes cannot be combined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("shape mismatch: expected {expected}, found {found}")]
pub struct ShapeMismatch {
    pub expected: SeriesShape,
    pub found: SeriesShape,
}

/// A normalized series table.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesTable {
    TimeValue(TimeValueTable),
    Ohlcv(Vec<OhlcvBar>),
    Panel(PanelTable),
    EventLog(EventLogTable),
}

impl SeriesTable {
    pub fn time_value(column: &str, points: Vec<(NaiveDate, f64)>) -> Self {
        SeriesTable::TimeValue(TimeValueTable {
            column: column.to_string(),
            points,
        })
    }

    pub fn shape(&self) -> SeriesShape {
        match self {
            SeriesTable::TimeValue(_) => SeriesShape::TimeValue,
            SeriesTable::Ohlcv(_) => SeriesShape::Ohlcv,
            SeriesTable::Panel(p) => SeriesShape::Panel(p.axis),
            SeriesTable::EventLog(_) => SeriesShape::EventLog,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesTable::TimeValue(t) => t.points.len(),
            SeriesTable::Ohlcv(bars) => bars.len(),
            SeriesTable::Panel(p) => p.rows.len(),
            SeriesTable::EventLog(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value column names (the index column is not included).
    pub fn value_columns(&self) -> Vec<String> {
        match self {
            SeriesTable::TimeValue(t) => vec![t.column.clone()],
            SeriesTable::Ohlcv(_) => OHLCV_COLUMNS.iter().map(|c| c.to_string()).collect(),
            SeriesTable::Panel(p) => p.columns.clone(),
            SeriesTable::EventLog(e) => e.columns.iter().map(|c| c.name.clone()).collect(),
        }
    }

    fn index_keys(&self) -> Vec<IndexKey> {
        match self {
            SeriesTable::TimeValue(t) => t.points.iter().map(|(d, _)| IndexKey::Date(*d)).collect(),
            SeriesTable::Ohlcv(bars) => bars.iter().map(|b| IndexKey::Date(b.date)).collect(),
            SeriesTable::Panel(p) => p.rows.iter().map(|r| r.key).collect(),
            SeriesTable::EventLog(e) => (0..e.len()).map(IndexKey::Row).collect(),
        }
    }

    /// Lowest and highest index key, or `None` for an empty table.
    pub fn index_range(&self) -> Option<IndexRange> {
        let keys = self.index_keys();
        let start = keys.iter().min()?;
        let end = keys.iter().max()?;
        Some(IndexRange {
            start: *start,
            end: *end,
        })
    }

    /// Sort ascending by index and drop duplicate keys, keeping the last
    /// occurrence. Event logs are returned unchanged.
    pub fn normalize(self) -> SeriesTable {
        match self {
            SeriesTable::TimeValue(t) => {
                let dedup: BTreeMap<NaiveDate, f64> = t.points.into_iter().collect();
                SeriesTable::TimeValue(TimeValueTable {
                    column: t.column,
                    points: dedup.into_iter().collect(),
                })
            }
            SeriesTable::Ohlcv(bars) => {
                let dedup: BTreeMap<NaiveDate, OhlcvBar> =
                    bars.into_iter().map(|b| (b.date, b)).collect();
                SeriesTable::Ohlcv(dedup.into_values().collect())
            }
            SeriesTable::Panel(p) => {
                let width = p.columns.len();
                let dedup: BTreeMap<IndexKey, Vec<f64>> = p
                    .rows
                    .into_iter()
                    .map(|mut r| {
                        r.values.resize(width, f64::NAN);
                        (r.key, r.values)
                    })
                    .collect();
                SeriesTable::Panel(PanelTable {
                    axis: p.axis,
                    columns: p.columns,
                    rows: dedup
                        .into_iter()
                        .map(|(key, values)| PanelRow { key, values })
                        .collect(),
                })
            }
            SeriesTable::EventLog(e) => SeriesTable::EventLog(e),
        }
    }

    /// Combine `self` (stored) with `newer` (just fetched).
    ///
    /// Keyed shapes concatenate and normalize, so on a duplicate key the newer
    /// row wins. Panels take the union of columns; a newer cell overwrites the
    /// stored cell of the same column and the stored value survives for
    /// columns the newer table lacks. Event logs are replaced by a non-empty
    /// newer log.
    pub fn merge(self, newer: SeriesTable) -> Result<SeriesTable, ShapeMismatch> {
        if self.shape() != newer.shape() {
            return Err(ShapeMismatch {
                expected: self.shape(),
                found: newer.shape(),
            });
        }

        let merged = match (self, newer) {
            (SeriesTable::TimeValue(mut old), SeriesTable::TimeValue(new)) => {
                old.points.extend(new.points);
                SeriesTable::TimeValue(old)
            }
            (SeriesTable::Ohlcv(mut old), SeriesTable::Ohlcv(new)) => {
                old.extend(new);
                SeriesTable::Ohlcv(old)
            }
            (SeriesTable::Panel(old), SeriesTable::Panel(new)) => merge_panels(old, new),
            (SeriesTable::EventLog(old), SeriesTable::EventLog(new)) => {
                if new.is_empty() {
                    SeriesTable::EventLog(old)
                } else {
                    SeriesTable::EventLog(new)
                }
            }
            (old, _) => old,
        };
        Ok(merged.normalize())
    }

    /// Rows whose index is at or after `latest - period`. Annual panels keep
    /// the latest `ceil(days / 365)` years, so 5y keeps five; event logs are
    /// kept whole.
    pub fn within(&self, period: Period) -> SeriesTable {
        match self.index_range() {
            Some(range) => self.trailing(range.end, period),
            None => self.clone(),
        }
    }

    /// Like [`SeriesTable::within`] but counted back from `today` instead of
    /// the latest row. Annual panels keep years after `today.year() - years`.
    pub fn window_ending(&self, today: NaiveDate, period: Period) -> SeriesTable {
        match self.index_range().map(|r| r.end) {
            Some(IndexKey::Date(_)) => self.trailing(IndexKey::Date(today), period),
            Some(IndexKey::Year(_)) => self.trailing(IndexKey::Year(today.year()), period),
            Some(IndexKey::Row(_)) | None => self.clone(),
        }
    }

    fn trailing(&self, end: IndexKey, period: Period) -> SeriesTable {
        let Some(days) = period.days() else {
            return self.clone();
        };

        match end {
            IndexKey::Date(latest) => self.since(latest - Duration::days(days)),
            IndexKey::Year(latest) => {
                let years = ((days + 364) / 365) as i32;
                self.retain_keys(|k| matches!(k, IndexKey::Year(y) if *y > latest - years))
            }
            IndexKey::Row(_) => self.clone(),
        }
    }

    /// Rows on or after `start`. Annual panels compare by calendar year.
    pub fn since(&self, start: NaiveDate) -> SeriesTable {
        self.retain_keys(|k| match k {
            IndexKey::Date(d) => *d >= start,
            IndexKey::Year(y) => *y >= start.year(),
            IndexKey::Row(_) => true,
        })
    }

    fn retain_keys(&self, keep: impl Fn(&IndexKey) -> bool) -> SeriesTable {
        match self {
            SeriesTable::TimeValue(t) => SeriesTable::TimeValue(TimeValueTable {
                column: t.column.clone(),
                points: t
                    .points
                    .iter()
                    .filter(|(d, _)| keep(&IndexKey::Date(*d)))
                    .copied()
                    .collect(),
            }),
            SeriesTable::Ohlcv(bars) => SeriesTable::Ohlcv(
                bars.iter()
                    .filter(|b| keep(&IndexKey::Date(b.date)))
                    .copied()
                    .collect(),
            ),
            SeriesTable::Panel(p) => SeriesTable::Panel(PanelTable {
                axis: p.axis,
                columns: p.columns.clone(),
                rows: p.rows.iter().filter(|r| keep(&r.key)).cloned().collect(),
            }),
            SeriesTable::EventLog(e) => SeriesTable::EventLog(e.clone()),
        }
    }

    /// Zero rows, same columns and dtypes.
    pub fn empty_like(&self) -> SeriesTable {
        match self {
            SeriesTable::TimeValue(t) => SeriesTable::time_value(&t.column, Vec::new()),
            SeriesTable::Ohlcv(_) => SeriesTable::Ohlcv(Vec::new()),
            SeriesTable::Panel(p) => SeriesTable::Panel(PanelTable {
                axis: p.axis,
                columns: p.columns.clone(),
                rows: Vec::new(),
            }),
            SeriesTable::EventLog(e) => SeriesTable::EventLog(EventLogTable {
                columns: e
                    .columns
                    .iter()
                    .map(|c| EventColumn {
                        name: c.name.clone(),
                        values: c.values.cleared(),
                    })
                    .collect(),
            }),
        }
    }
}

fn merge_panels(old: PanelTable, new: PanelTable) -> SeriesTable {
    let mut columns = old.columns.clone();
    for col in &new.columns {
        if !columns.contains(col) {
            columns.push(col.clone());
        }
    }
    let width = columns.len();

    let mut rows: BTreeMap<IndexKey, Vec<f64>> = BTreeMap::new();
    for row in old.rows {
        let mut values = row.values;
        values.resize(width, f64::NAN);
        rows.insert(row.key, values);
    }

    let positions: Vec<Option<usize>> = new
        .columns
        .iter()
        .map(|c| columns.iter().position(|x| x == c))
        .collect();
    for row in new.rows {
        let cells = rows
            .entry(row.key)
            .or_insert_with(|| vec![f64::NAN; width]);
        for (pos, value) in positions.iter().zip(row.values) {
            if let Some(p) = pos {
                cells[*p] = value;
            }
        }
    }

    SeriesTable::Panel(PanelTable {
        axis: old.axis,
        columns,
        rows: rows
            .into_iter()
            .map(|(key, values)| PanelRow { key, values })
            .collect(),
    })
}
