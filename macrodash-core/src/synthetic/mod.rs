//! Deterministic fallback series.
//!
//! [`generate`] is a pure function of the series spec: every draw comes from an
//! RNG stream seeded by the series key (see [`crate::rng`]), so the same key
//! always yields the same table and two keys never share a stream. Daily
//! models run on the business-day calendar ending at [`ANCHOR_DATE`].

pub mod calendar;
pub mod curated;

pub use curated::CuratedTable;

use crate::registry::SeriesSpec;
use crate::rng::{normal, stream_rng};
use crate::series::{IndexKey, PanelAxis, SeriesKey};
use crate::table::{OhlcvBar, PanelRow, PanelTable, SeriesTable};
use chrono::NaiveDate;
use rand::rngs::StdRng;

/// Last date of every generated daily series.
pub const ANCHOR_DATE: (i32, u32, u32) = (2026, 2, 6);

/// Calendar span of generated daily series.
pub const DAILY_SPAN_DAYS: i64 = 1825;

/// Per-step pull toward the center in mean-reverting models.
const REVERSION: f64 = 0.05;

pub fn anchor_date() -> NaiveDate {
    let (y, m, d) = ANCHOR_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// How an annual panel column evolves from its base value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelDynamics {
    /// Random walk with step N(0, 5% of |base|), or N(0, 1) for a zero base.
    Walk,
    /// Mean reversion toward the base with noise |base| * 0.1 + 10.
    MeanReverting,
    /// Base plus cumulative N(0, 0.5% of base) drift, floored at zero.
    Accumulating,
}

/// Parameters of the fallback generator for one series.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntheticModel {
    /// Business-day mean-reverting level with an optional linear trend
    /// `(from, to)` added over the window and optional clipping.
    MeanReverting {
        center: f64,
        vol: f64,
        trend: Option<(f64, f64)>,
        floor: Option<f64>,
        ceiling: Option<f64>,
    },
    /// Business-day geometric random walk of closes.
    RandomWalk { start: f64, drift: f64, vol: f64 },
    /// Random-walk close with derived open/high/low and log-normal volume.
    OhlcvWalk { start: f64, drift: f64, vol: f64 },
    /// One column per entry of `bases` over `first_year..=last_year`.
    AnnualPanel {
        first_year: i32,
        last_year: i32,
        bases: Vec<(String, f64)>,
        dynamics: PanelDynamics,
    },
    /// Quarterly global semiconductor revenue with its QoQ change.
    SemiRevenueCycle,
    /// Monthly book-to-bill ratio and inventory days.
    SemiInventoryCycle,
    /// Fixed curated table.
    Curated(CuratedTable),
}

impl SyntheticModel {
    pub fn mean_reverting(center: f64, vol: f64) -> Self {
        SyntheticModel::MeanReverting {
            center,
            vol,
            trend: None,
            floor: None,
            ceiling: None,
        }
    }
}

/// Generate the fallback table for `spec`.
pub fn generate(spec: &SeriesSpec) -> SeriesTable {
    let key = &spec.key;
    let column = key.category.value_column();

    match &spec.model {
        SyntheticModel::MeanReverting {
            center,
            vol,
            trend,
            floor,
            ceiling,
        } => {
            let days = daily_axis();
            let mut rng = stream_rng(key, column);
            let mut values = mean_reverting(&mut rng, *center, *vol, days.len());
            if let Some((from, to)) = trend {
                for (v, t) in values.iter_mut().zip(calendar::linspace(*from, *to, days.len())) {
                    *v += t;
                }
            }
            for v in values.iter_mut() {
                if let Some(lo) = floor {
                    *v = v.max(*lo);
                }
                if let Some(hi) = ceiling {
                    *v = v.min(*hi);
                }
            }
            SeriesTable::time_value(column, days.into_iter().zip(values).collect())
        }
        SyntheticModel::RandomWalk { start, drift, vol } => {
            let days = daily_axis();
            let mut rng = stream_rng(key, column);
            let closes = random_walk(&mut rng, *start, *drift, *vol, days.len());
            SeriesTable::time_value(column, days.into_iter().zip(closes).collect())
        }
        SyntheticModel::OhlcvWalk { start, drift, vol } => ohlcv_walk(key, *start, *drift, *vol),
        SyntheticModel::AnnualPanel {
            first_year,
            last_year,
            bases,
            dynamics,
        } => annual_panel(key, *first_year, *last_year, bases, *dynamics),
        SyntheticModel::SemiRevenueCycle => revenue_cycle(key),
        SyntheticModel::SemiInventoryCycle => inventory_cycle(key),
        SyntheticModel::Curated(table) => table.build(),
    }
}

fn daily_axis() -> Vec<NaiveDate> {
    calendar::business_days(anchor_date(), DAILY_SPAN_DAYS)
}

fn mean_reverting(rng: &mut StdRng, center: f64, vol: f64, n: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(n);
    let mut current = center;
    for i in 0..n {
        if i > 0 {
            current = current + REVERSION * (center - current) + normal(rng, 0.0, vol);
        }
        out.push(current);
    }
    out
}

fn random_walk(rng: &mut StdRng, start: f64, drift: f64, vol: f64, n: usize) -> Vec<f64> {
    let mut log_level = 0.0;
    (0..n)
        .map(|_| {
            log_level += normal(rng, drift, vol);
            start * log_level.exp()
        })
        .collect()
}

fn ohlcv_walk(key: &SeriesKey, start: f64, drift: f64, vol: f64) -> SeriesTable {
    let days = daily_axis();
    let closes = random_walk(&mut stream_rng(key, "Close"), start, drift, vol, days.len());
    let mut rng = stream_rng(key, "bar");

    let bars = days
        .into_iter()
        .zip(closes)
        .map(|(date, close)| {
            let open = close * (1.0 + normal(&mut rng, 0.0, 0.002));
            let high = close * (1.0 + normal(&mut rng, 0.0, 0.008).abs());
            let low = close * (1.0 - normal(&mut rng, 0.0, 0.008).abs());
            let volume = normal(&mut rng, 20.0, 1.0).exp();
            OhlcvBar {
                date,
                open,
                high: high.max(open),
                low: low.min(open),
                close,
                volume: volume as u64,
            }
        })
        .collect();
    SeriesTable::Ohlcv(bars)
}

fn annual_panel(
    key: &SeriesKey,
    first_year: i32,
    last_year: i32,
    bases: &[(String, f64)],
    dynamics: PanelDynamics,
) -> SeriesTable {
    let years: Vec<i32> = (first_year..=last_year).collect();
    let n = years.len();

    let columns: Vec<Vec<f64>> = bases
        .iter()
        .map(|(name, base)| {
            let mut rng = stream_rng(key, name);
            match dynamics {
                PanelDynamics::Walk => {
                    let scale = if *base != 0.0 { base.abs() * 0.05 } else { 1.0 };
                    let mut current = *base;
                    (0..n)
                        .map(|_| {
                            current += normal(&mut rng, 0.0, scale);
                            current
                        })
                        .collect()
                }
                PanelDynamics::MeanReverting => {
                    mean_reverting(&mut rng, *base, base.abs() * 0.1 + 10.0, n)
                }
                PanelDynamics::Accumulating => {
                    let mut current = *base;
                    (0..n)
                        .map(|_| {
                            current += normal(&mut rng, 0.0, base.abs() * 0.005);
                            current.max(0.0)
                        })
                        .collect()
                }
            }
        })
        .collect();

    SeriesTable::Panel(PanelTable {
        axis: PanelAxis::Annual,
        columns: bases.iter().map(|(name, _)| name.clone()).collect(),
        rows: years
            .into_iter()
            .enumerate()
            .map(|(i, y)| PanelRow {
                key: IndexKey::Year(y),
                values: columns.iter().map(|c| c[i]).collect(),
            })
            .collect(),
    })
}

fn revenue_cycle(key: &SeriesKey) -> SeriesTable {
    let quarters = calendar::month_starts(ymd(2020, 1, 1), ymd(2026, 1, 1), 3);
    let n = quarters.len();
    let mut rng = stream_rng(key, "revenue");

    let phase = calendar::linspace(0.0, 3.0 * std::f64::consts::PI, n);
    let mut cumulative = 0.0;
    let revenue: Vec<f64> = phase
        .iter()
        .map(|p| {
            cumulative += normal(&mut rng, 1.0, 3.0);
            120.0 + 30.0 * p.sin() + cumulative
        })
        .collect();
    let qoq: Vec<f64> = (0..n)
        .map(|i| {
            if i == 0 {
                0.0
            } else {
                (revenue[i] - revenue[i - 1]) / revenue[i - 1] * 100.0
            }
        })
        .collect();

    daily_panel(
        &["Global Semi Revenue ($B)", "QoQ Change (%)"],
        quarters,
        &[revenue, qoq],
    )
}

fn inventory_cycle(key: &SeriesKey) -> SeriesTable {
    let months = calendar::month_starts(ymd(2022, 1, 1), ymd(2026, 2, 1), 1);
    let n = months.len();
    let book_to_bill: Vec<f64> = mean_reverting(&mut stream_rng(key, "Book-to-Bill"), 1.0, 0.04, n)
        .into_iter()
        .map(|v| v.clamp(0.7, 1.4))
        .collect();
    let inventory_days = mean_reverting(&mut stream_rng(key, "Inventory Days"), 95.0, 4.0, n);

    daily_panel(
        &["Book-to-Bill", "Inventory Days"],
        months,
        &[book_to_bill, inventory_days],
    )
}

fn daily_panel(columns: &[&str], dates: Vec<NaiveDate>, data: &[Vec<f64>]) -> SeriesTable {
    SeriesTable::Panel(PanelTable {
        axis: PanelAxis::Daily,
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| PanelRow {
                key: IndexKey::Date(date),
                values: data.iter().map(|col| col[i]).collect(),
            })
            .collect(),
    })
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}
