//! Series identity: categories, keys, index labels, shapes and query periods.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Top-level grouping of stored series. Doubles as the store subdirectory name
/// and the `--source` scope selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Fred,
    WorldBank,
    Market,
    Imf,
    Semi,
    Policy,
}

impl Category {
    /// Every category, in ingestion order.
    pub const ALL: [Category; 6] = [
        Category::Fred,
        Category::WorldBank,
        Category::Market,
        Category::Imf,
        Category::Semi,
        Category::Policy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fred => "fred",
            Category::WorldBank => "world_bank",
            Category::Market => "market",
            Category::Imf => "imf",
            Category::Semi => "semi",
            Category::Policy => "policy",
        }
    }

    /// Name of the value column for single-column series in this category.
    pub fn value_column(&self) -> &'static str {
        match self {
            Category::Fred => "value",
            _ => "Close",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse failures for series identifiers and query periods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown source '{0}' (expected one of: fred, world_bank, market, imf, semi, policy)")]
    UnknownCategory(String),

    #[error("invalid series key '{0}' (expected <category>/<name>)")]
    InvalidKey(String),

    #[error("unknown period '{0}' (expected one of: 1mo, 3mo, 6mo, 1y, 3y, 5y, 10y, max)")]
    UnknownPeriod(String),
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseError::UnknownCategory(s.to_string()))
    }
}

/// Identity of one stored series: `(category, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub category: Category,
    pub name: String,
}

impl SeriesKey {
    pub fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }

    /// Manifest key: `"{category}/{name}"`.
    pub fn manifest_key(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

impl FromStr for SeriesKey {
    type Err = ParseError;

    /// Splits on the first `/` only, so names such as `SMH/ETF` survive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cat, name) = s
            .split_once('/')
            .ok_or_else(|| ParseError::InvalidKey(s.to_string()))?;
        if name.is_empty() {
            return Err(ParseError::InvalidKey(s.to_string()));
        }
        Ok(SeriesKey::new(cat.parse()?, name))
    }
}

/// A position on a table's ordered index axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndexKey {
    Date(NaiveDate),
    Year(i32),
    Row(usize),
}

impl IndexKey {
    /// Render as stored in the manifest's `date_range`.
    pub fn label(&self) -> String {
        match self {
            IndexKey::Date(d) => d.format("%Y-%m-%d").to_string(),
            IndexKey::Year(y) => y.to_string(),
            IndexKey::Row(r) => r.to_string(),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            IndexKey::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// Inclusive lower and upper index bounds of a non-empty table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: IndexKey,
    pub end: IndexKey,
}

impl IndexRange {
    pub fn labels(&self) -> [String; 2] {
        [self.start.label(), self.end.label()]
    }
}

/// Index axis of a country/metric panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelAxis {
    /// `date` index (daily, monthly or quarterly observations).
    Daily,
    /// Integer `year` index.
    Annual,
}

impl PanelAxis {
    pub fn index_column(&self) -> &'static str {
        match self {
            PanelAxis::Daily => "date",
            PanelAxis::Annual => "year",
        }
    }
}

/// Column layout contract of a series. Fixed per key for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesShape {
    /// `date` plus one numeric column.
    TimeValue,
    /// `date` plus `Open High Low Close Volume`.
    Ohlcv,
    /// Index plus one numeric column per country or metric.
    Panel(PanelAxis),
    /// Implicit row index plus named typed columns.
    EventLog,
}

impl fmt::Display for SeriesShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesShape::TimeValue => f.write_str("time-value"),
            SeriesShape::Ohlcv => f.write_str("ohlcv"),
            SeriesShape::Panel(PanelAxis::Daily) => f.write_str("panel(date)"),
            SeriesShape::Panel(PanelAxis::Annual) => f.write_str("panel(year)"),
            SeriesShape::EventLog => f.write_str("event-log"),
        }
    }
}

/// Lookback window requested by a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 8] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::ThreeYears,
        Period::FiveYears,
        Period::TenYears,
        Period::Max,
    ];

    /// Periods served from the store before any live call.
    pub const DEFAULT_LONG: [Period; 5] = [
        Period::OneYear,
        Period::ThreeYears,
        Period::FiveYears,
        Period::TenYears,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::ThreeYears => "3y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::Max => "max",
        }
    }

    /// Window length in days; `None` for `max`.
    pub fn days(&self) -> Option<i64> {
        match self {
            Period::OneMonth => Some(30),
            Period::ThreeMonths => Some(90),
            Period::SixMonths => Some(180),
            Period::OneYear => Some(365),
            Period::ThreeYears => Some(1095),
            Period::FiveYears => Some(1825),
            Period::TenYears => Some(3650),
            Period::Max => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParseError;

    /// Accepts both the `1mo`/`1y` forms and the `1M`/`1Y` selector forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let normalized = match lower.as_str() {
            "1m" => "1mo",
            "3m" => "3mo",
            "6m" => "6mo",
            other => other,
        };
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| ParseError::UnknownPeriod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_roundtrips_through_str() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
        assert!("World_Bank".parse::<Category>().is_err());
        assert!("crypto".parse::<Category>().is_err());
    }

    #[test]
    fn series_key_splits_on_first_slash() {
        let key: SeriesKey = "market/EURUSD=X".parse().unwrap();
        assert_eq!(key.category, Category::Market);
        assert_eq!(key.name, "EURUSD=X");

        let nested: SeriesKey = "semi/a/b".parse().unwrap();
        assert_eq!(nested.name, "a/b");

        assert!("fred".parse::<SeriesKey>().is_err());
        assert!("fred/".parse::<SeriesKey>().is_err());
        assert_eq!(key.manifest_key(), "market/EURUSD=X");
    }

    #[test]
    fn index_labels() {
        let d = IndexKey::Date(NaiveDate::from_ymd_opt(2021, 2, 8).unwrap());
        assert_eq!(d.label(), "2021-02-08");
        assert_eq!(IndexKey::Year(2005).label(), "2005");
        assert_eq!(IndexKey::Row(17).label(), "17");
    }

    #[test]
    fn period_parsing_accepts_both_forms() {
        assert_eq!("1mo".parse::<Period>().unwrap(), Period::OneMonth);
        assert_eq!("1M".parse::<Period>().unwrap(), Period::OneMonth);
        assert_eq!("10Y".parse::<Period>().unwrap(), Period::TenYears);
        assert_eq!("MAX".parse::<Period>().unwrap(), Period::Max);
        assert!("2w".parse::<Period>().is_err());
    }

    #[test]
    fn period_days_match_window_table() {
        let days: Vec<Option<i64>> = Period::ALL.iter().map(|p| p.days()).collect();
        assert_eq!(
            days,
            vec![
                Some(30),
                Some(90),
                Some(180),
                Some(365),
                Some(1095),
                Some(1825),
                Some(3650),
                None
            ]
        );
    }
}
