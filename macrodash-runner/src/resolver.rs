//! Read-path resolver: serve a series for a period without ever failing.
//!
//! Long periods are served from the store when the series is present. Short
//! periods, and long periods the store cannot serve, go to the live adapter
//! for the window `today - period`. A live answer counts only if rows remain
//! after that window is applied; annual panels are cut by year. A short
//! period whose live window is empty falls back to the stored series. When
//! everything misses, the caller gets an empty table with the columns it
//! would otherwise have had.

use crate::config::DashConfig;
use chrono::{Duration, Local, NaiveDate};
use macrodash_core::data::{AdapterSet, FetchRequest, SeriesStore};
use macrodash_core::registry::{Registry, SeriesSpec};
use macrodash_core::series::{Period, SeriesKey};
use macrodash_core::table::SeriesTable;
use tracing::{debug, warn};

/// Where a resolved table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Store,
    Live,
    Empty,
}

pub struct Resolver {
    store: SeriesStore,
    adapters: AdapterSet,
    registry: Registry,
    long_periods: Vec<Period>,
}

impl Resolver {
    pub fn new(
        store: SeriesStore,
        adapters: AdapterSet,
        registry: Registry,
        long_periods: Vec<Period>,
    ) -> Self {
        Self {
            store,
            adapters,
            registry,
            long_periods,
        }
    }

    pub fn from_config(config: &DashConfig, store: SeriesStore, adapters: AdapterSet) -> Self {
        Self::new(
            store,
            adapters,
            Registry::builtin(),
            config.resolver.long_periods.clone(),
        )
    }

    pub fn is_long(&self, period: Period) -> bool {
        self.long_periods.contains(&period)
    }

    /// Table for `spec` over `period`, as of today.
    pub fn resolve(&self, spec: &SeriesSpec, period: Period) -> SeriesTable {
        self.resolve_on(spec, period, Local::now().date_naive()).0
    }

    /// Look the key up in the registry and resolve it. Unknown keys give an
    /// empty single-column table.
    pub fn resolve_key(&self, key: &SeriesKey, period: Period) -> SeriesTable {
        match self.registry.get(key) {
            Some(spec) => self.resolve(spec, period),
            None => {
                warn!(key = %key, "unknown series");
                SeriesTable::time_value(key.category.value_column(), Vec::new())
            }
        }
    }

    /// [`Resolver::resolve`] with an explicit `today`, also reporting the source.
    pub fn resolve_on(
        &self,
        spec: &SeriesSpec,
        period: Period,
        today: NaiveDate,
    ) -> (SeriesTable, Resolution) {
        let long = self.is_long(period);
        if long {
            if let Some(stored) = self.stored_within(spec, period) {
                return (stored, Resolution::Store);
            }
        }

        let request = match period.days() {
            Some(d) => FetchRequest::window(today - Duration::days(d)),
            None => FetchRequest::full(),
        };

        let adapter = self.adapters.for_spec(spec);
        match adapter.fetch(spec, &request) {
            Ok(table) if table.shape() == spec.shape => {
                let table = table.window_ending(today, period);
                if !table.is_empty() {
                    debug!(key = %spec.key, %period, rows = table.len(), "served live");
                    return (table, Resolution::Live);
                }
                debug!(key = %spec.key, %period, "live window is empty");
            }
            Ok(table) => {
                warn!(key = %spec.key, shape = %table.shape(), "live fetch has the wrong shape");
            }
            Err(e) => warn!(key = %spec.key, %period, error = %e, "live fetch failed"),
        }

        if !long {
            if let Some(stored) = self.stored_within(spec, period) {
                return (stored, Resolution::Store);
            }
        }
        (adapter.fallback(spec).empty_like(), Resolution::Empty)
    }

    /// Stored series cut to `period`, when the store holds a non-empty one.
    fn stored_within(&self, spec: &SeriesSpec, period: Period) -> Option<SeriesTable> {
        match self.store.read(&spec.key, spec.shape) {
            Ok(Some(stored)) => {
                let table = stored.within(period);
                if table.is_empty() {
                    return None;
                }
                debug!(key = %spec.key, %period, rows = table.len(), "served from store");
                Some(table)
            }
            Ok(None) => {
                debug!(key = %spec.key, %period, "store miss");
                None
            }
            Err(e) => {
                warn!(key = %spec.key, error = %e, "store read failed");
                None
            }
        }
    }
}
