//! Storage and sourcing: Parquet series store, JSON manifest, source adapters.

pub mod circuit_breaker;
pub mod curated;
mod frame;
pub mod fred;
pub mod manifest;
pub mod source;
pub mod store;
pub mod world_bank;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use curated::CuratedAdapter;
pub use fred::FredAdapter;
pub use manifest::{EntryStatus, Manifest, ManifestEntry, ManifestSummary, StatusCounts};
pub use source::{
    http_client, AdapterSet, FetchMode, FetchRequest, SourceAdapter, SourceError,
    UnavailableAdapter,
};
pub use store::{SeriesStore, StoreError, MANIFEST_FILE};
pub use world_bank::WorldBankAdapter;
pub use yahoo::YahooAdapter;
