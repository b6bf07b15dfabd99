//! BDD tests for the read-path resolver.
//!
//! - Long periods are served from the store without a live call
//! - Short periods and store misses go live for the requested window
//! - A live answer that is empty after windowing is not served as live
//! - When both miss the caller gets an empty table with the right columns

mod common;

use common::{builtin_spec, d, days, dff_history, FailingAdapter, HistoryAdapter};
use macrodash_core::data::{AdapterSet, SeriesStore, SourceError};
use macrodash_core::registry::{Provider, Registry};
use macrodash_core::series::{Category, IndexKey, PanelAxis, Period, SeriesKey};
use macrodash_core::table::{PanelRow, PanelTable, SeriesTable, OHLCV_COLUMNS};
use macrodash_runner::{Resolution, Resolver};
use std::sync::Arc;

fn dff_key() -> SeriesKey {
    SeriesKey::new(Category::Fred, "DFF")
}

fn resolver(store: SeriesStore, adapters: AdapterSet) -> Resolver {
    Resolver::new(store, adapters, Registry::builtin(), Period::DEFAULT_LONG.to_vec())
}

fn offline() -> Arc<FailingAdapter> {
    Arc::new(FailingAdapter::new(SourceError::Unavailable(
        "connection refused".into(),
    )))
}

const GDP_GROWTH: &str = "NY.GDP.MKTP.KD.ZG";

/// Annual USA/CHN panel from 2000 through `last_year`.
fn annual_panel(last_year: i32) -> SeriesTable {
    SeriesTable::Panel(PanelTable {
        axis: PanelAxis::Annual,
        columns: vec!["USA".into(), "CHN".into()],
        rows: (2000..=last_year)
            .map(|y| PanelRow {
                key: IndexKey::Year(y),
                values: vec![2.0, 5.0],
            })
            .collect(),
    })
}

fn first_date(table: &SeriesTable) -> Option<chrono::NaiveDate> {
    table.index_range().and_then(|r| r.start.as_date())
}

#[test]
fn bdd_scenario_long_period_is_served_from_the_store() {
    // GIVEN a store holding five years of DFF
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data"));
    store.write(&dff_key(), dff_history()).unwrap();
    let adapter = Arc::new(HistoryAdapter::new(dff_history()));
    let resolver = resolver(
        store,
        AdapterSet::new().with(Provider::Fred, adapter.clone()),
    );

    // WHEN one year of DFF is requested
    let spec = builtin_spec(Category::Fred, "DFF");
    let (table, source) = resolver.resolve_on(&spec, Period::OneYear, d(2026, 2, 6));

    // THEN it comes from the store without touching the provider
    assert_eq!(source, Resolution::Store);
    assert_eq!(adapter.calls(), 0);

    // AND it covers the trailing year of the stored series
    assert_eq!(table, dff_history().within(Period::OneYear));
    assert!(first_date(&table).unwrap() >= d(2025, 2, 6));
    assert_eq!(
        table.index_range().unwrap().end,
        IndexKey::Date(d(2026, 2, 6))
    );
}

#[test]
fn bdd_scenario_short_period_goes_live_for_its_window() {
    // GIVEN a store holding DFF and a live provider
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data"));
    store.write(&dff_key(), dff_history()).unwrap();
    let adapter = Arc::new(HistoryAdapter::new(dff_history()));
    let resolver = resolver(
        store,
        AdapterSet::new().with(Provider::Fred, adapter.clone()),
    );

    // WHEN one month is requested
    let today = d(2026, 2, 6);
    let spec = builtin_spec(Category::Fred, "DFF");
    let (table, source) = resolver.resolve_on(&spec, Period::OneMonth, today);

    // THEN the provider is asked for the last 30 days
    assert_eq!(source, Resolution::Live);
    assert_eq!(adapter.calls(), 1);
    assert_eq!(adapter.last_request().unwrap().since, Some(today - days(30)));

    // AND only rows inside that window are returned
    assert!(!table.is_empty());
    assert!(first_date(&table).unwrap() >= d(2026, 1, 7));
}

#[test]
fn bdd_scenario_long_period_store_miss_goes_live() {
    // GIVEN an empty store and a live provider
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data"));
    let adapter = Arc::new(HistoryAdapter::new(dff_history()));
    let resolver = resolver(
        store,
        AdapterSet::new().with(Provider::Fred, adapter.clone()),
    );

    // WHEN five years are requested
    let spec = builtin_spec(Category::Fred, "DFF");
    let (table, source) = resolver.resolve_on(&spec, Period::FiveYears, d(2026, 2, 6));

    // THEN the live window answers
    assert_eq!(source, Resolution::Live);
    assert_eq!(adapter.calls(), 1);
    assert!(first_date(&table).unwrap() >= d(2021, 2, 6));
}

#[test]
fn bdd_scenario_double_miss_returns_empty_table_with_columns() {
    // GIVEN an empty store and providers that are offline
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data"));
    let adapter = offline();
    let adapters = AdapterSet::new()
        .with(Provider::Fred, adapter.clone())
        .with(Provider::Yahoo, adapter.clone());
    let resolver = resolver(store, adapters);

    // WHEN a FRED series and a market series are requested
    let dff = builtin_spec(Category::Fred, "DFF");
    let (fred, fred_source) = resolver.resolve_on(&dff, Period::OneYear, d(2026, 2, 6));
    let gspc = builtin_spec(Category::Market, "^GSPC");
    let (market, market_source) = resolver.resolve_on(&gspc, Period::OneMonth, d(2026, 2, 6));

    // THEN both are empty but keep the columns a consumer expects
    assert_eq!(fred_source, Resolution::Empty);
    assert!(fred.is_empty());
    assert_eq!(fred.value_columns(), vec!["value".to_string()]);

    assert_eq!(market_source, Resolution::Empty);
    assert!(market.is_empty());
    assert_eq!(market.value_columns(), OHLCV_COLUMNS.map(String::from).to_vec());
    assert_eq!(adapter.calls(), 2);
}

#[test]
fn bdd_scenario_resolve_after_clean_is_empty_not_a_crash() {
    // GIVEN a store that was populated and then cleaned
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data"));
    store.write(&dff_key(), dff_history()).unwrap();
    assert!(store.clean().unwrap());
    let resolver = resolver(store, AdapterSet::new().with(Provider::Fred, offline()));

    // WHEN a long period is requested
    let spec = builtin_spec(Category::Fred, "DFF");
    let (table, source) = resolver.resolve_on(&spec, Period::Max, d(2026, 2, 6));

    // THEN the caller gets an empty table
    assert_eq!(source, Resolution::Empty);
    assert!(table.is_empty());
}

#[test]
fn bdd_scenario_unknown_key_resolves_to_an_empty_series() {
    // GIVEN a resolver with no adapters
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver(SeriesStore::new(dir.path().join("data")), AdapterSet::new());

    // WHEN a key outside the registry is requested
    let key = SeriesKey::new(Category::Market, "NOT_A_TICKER");
    let table = resolver.resolve_key(&key, Period::OneYear);

    // THEN it is an empty single-column table
    assert!(table.is_empty());
    assert_eq!(table.value_columns(), vec!["Close".to_string()]);
}

#[test]
fn bdd_scenario_long_periods_are_configurable() {
    // GIVEN a resolver that treats no period as long
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data"));
    store.write(&dff_key(), dff_history()).unwrap();
    let adapter = Arc::new(HistoryAdapter::new(dff_history()));
    let resolver = Resolver::new(
        store,
        AdapterSet::new().with(Provider::Fred, adapter.clone()),
        Registry::builtin(),
        Vec::new(),
    );

    // WHEN one year is requested
    let spec = builtin_spec(Category::Fred, "DFF");
    let (_, source) = resolver.resolve_on(&spec, Period::OneYear, d(2026, 2, 6));

    // THEN the store is bypassed
    assert!(!resolver.is_long(Period::OneYear));
    assert_eq!(source, Resolution::Live);
    assert_eq!(adapter.calls(), 1);
}

#[test]
fn bdd_scenario_short_period_on_annual_panel_falls_back_to_the_store() {
    // GIVEN World Bank data that stops in 2025, both stored and live
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data"));
    let key = SeriesKey::new(Category::WorldBank, GDP_GROWTH);
    store.write(&key, annual_panel(2025)).unwrap();
    let adapter = Arc::new(HistoryAdapter::new(annual_panel(2025)));
    let resolver = resolver(
        store,
        AdapterSet::new().with(Provider::WorldBank, adapter.clone()),
    );

    // WHEN one month is requested in early 2026
    let spec = builtin_spec(Category::WorldBank, GDP_GROWTH);
    let (table, source) = resolver.resolve_on(&spec, Period::OneMonth, d(2026, 2, 6));

    // THEN the empty live window is not served as a live answer
    assert_eq!(adapter.calls(), 1);
    assert_eq!(source, Resolution::Store);

    // AND the store supplies the latest stored year
    assert_eq!(table.len(), 1);
    assert_eq!(table.index_range().unwrap().end, IndexKey::Year(2025));
}

#[test]
fn bdd_scenario_short_period_on_annual_panel_without_store_is_empty() {
    // GIVEN an empty store and a provider whose panel stops in 2025
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data"));
    let adapter = Arc::new(HistoryAdapter::new(annual_panel(2025)));
    let resolver = resolver(
        store,
        AdapterSet::new().with(Provider::WorldBank, adapter.clone()),
    );

    // WHEN three months are requested in early 2026
    let spec = builtin_spec(Category::WorldBank, GDP_GROWTH);
    let (table, source) = resolver.resolve_on(&spec, Period::ThreeMonths, d(2026, 2, 6));

    // THEN the result is reported as empty, not live
    assert_eq!(source, Resolution::Empty);
    assert!(table.is_empty());
    assert_eq!(table.shape(), spec.shape);
}

#[test]
fn bdd_scenario_live_annual_panel_is_cut_by_year() {
    // GIVEN an empty store and a provider holding 2000..2025
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data"));
    let adapter = Arc::new(HistoryAdapter::new(annual_panel(2025)));
    let resolver = resolver(
        store,
        AdapterSet::new().with(Provider::WorldBank, adapter.clone()),
    );

    // WHEN five years are requested in 2026
    let spec = builtin_spec(Category::WorldBank, GDP_GROWTH);
    let (table, source) = resolver.resolve_on(&spec, Period::FiveYears, d(2026, 2, 6));

    // THEN the live answer keeps the years after 2021
    assert_eq!(source, Resolution::Live);
    let range = table.index_range().unwrap();
    assert_eq!(range.start, IndexKey::Year(2022));
    assert_eq!(range.end, IndexKey::Year(2025));
    assert_eq!(table.len(), 4);
}
