//! MacroDash Core: series model, Parquet store, manifest, registry, source adapters.
//!
//! This crate contains the storage half of the dashboard's data layer:
//! - Series identity, index labels, shapes and query periods
//! - Normalized in-memory tables with merge and window operations
//! - Parquet series store with atomic writes and corrupt-file quarantine
//! - JSON ingestion manifest
//! - Registry of every ingested series
//! - Live source adapters (FRED, Yahoo Finance, World Bank, curated tables)
//! - Deterministic seeded fallback generators

pub mod data;
pub mod filename;
pub mod registry;
pub mod rng;
pub mod series;
pub mod synthetic;
pub mod table;

pub use data::{
    AdapterSet, EntryStatus, FetchMode, FetchRequest, Manifest, ManifestEntry, SeriesStore,
    SourceAdapter, SourceError, StoreError,
};
pub use registry::{Provider, Registry, SeriesSpec};
pub use series::{Category, IndexKey, IndexRange, ParseError, Period, SeriesKey, SeriesShape};
pub use table::SeriesTable;
