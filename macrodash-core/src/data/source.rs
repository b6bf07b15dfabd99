//! Source adapter trait, fetch requests and structured error types.
//!
//! A [`SourceAdapter`] turns a [`SeriesSpec`] into a [`SeriesTable`] from its
//! provider. Adapters are stateless apart from shared rate-limit state, and
//! each one carries a deterministic fallback so the ingestion pipeline can
//! always persist something of the right shape.

use super::circuit_breaker::{CircuitBreaker, Guarded};
use crate::registry::{Provider, SeriesSpec};
use crate::series::{IndexKey, IndexRange};
use crate::synthetic;
use crate::table::SeriesTable;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a live fetch produced no table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Network failure, missing credentials, timeout or an open circuit breaker.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The provider answered a full query with zero rows.
    #[error("empty result: {0}")]
    EmptyResult(String),

    /// The response could not be normalized into the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// How much history a fetch asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Entire available history.
    Full,
    /// Only records at or after the stored upper bound.
    Incremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub mode: FetchMode,
    /// Index range already stored (incremental only).
    pub existing: Option<IndexRange>,
    /// Lower bound for read-path window queries.
    pub since: Option<NaiveDate>,
}

impl FetchRequest {
    pub fn full() -> Self {
        Self {
            mode: FetchMode::Full,
            existing: None,
            since: None,
        }
    }

    pub fn incremental(existing: IndexRange) -> Self {
        Self {
            mode: FetchMode::Incremental,
            existing: Some(existing),
            since: None,
        }
    }

    /// Live query for the read path: everything on or after `since`.
    pub fn window(since: NaiveDate) -> Self {
        Self {
            mode: FetchMode::Full,
            existing: None,
            since: Some(since),
        }
    }

    /// First date the provider needs to return, if the request is bounded.
    pub fn start_date(&self) -> Option<NaiveDate> {
        if let Some(since) = self.since {
            return Some(since);
        }
        match self.existing.map(|r| r.end) {
            Some(IndexKey::Date(d)) => Some(d),
            Some(IndexKey::Year(y)) => NaiveDate::from_ymd_opt(y, 1, 1),
            _ => None,
        }
    }

    /// Whether zero rows means "nothing new" rather than an empty source.
    pub fn tolerates_empty(&self) -> bool {
        self.mode == FetchMode::Incremental || self.since.is_some()
    }
}

/// A provider of live series data.
pub trait SourceAdapter: Send + Sync {
    /// Human-readable name of this adapter.
    fn name(&self) -> &str;

    /// Fetch `spec` from the provider.
    fn fetch(&self, spec: &SeriesSpec, request: &FetchRequest) -> Result<SeriesTable, SourceError>;

    /// Deterministic stand-in with the same shape and columns as a live fetch.
    fn fallback(&self, spec: &SeriesSpec) -> SeriesTable {
        synthetic::generate(spec)
    }
}

/// Adapter for a provider that cannot be reached at all (e.g. missing API key).
#[derive(Debug, Clone)]
pub struct UnavailableAdapter {
    reason: String,
}

impl UnavailableAdapter {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SourceAdapter for UnavailableAdapter {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn fetch(
        &self,
        spec: &SeriesSpec,
        _request: &FetchRequest,
    ) -> Result<SeriesTable, SourceError> {
        Err(SourceError::Unavailable(format!("{}: {}", spec.key, self.reason)))
    }
}

/// Adapters keyed by provider. Providers without an adapter resolve to an
/// [`UnavailableAdapter`].
///
/// With a breaker attached, every configured remote provider is fetched
/// through it. Curated tables never touch the network and are not guarded.
#[derive(Clone, Default)]
pub struct AdapterSet {
    adapters: HashMap<Provider, Arc<dyn SourceAdapter>>,
    breaker: Option<Arc<CircuitBreaker>>,
}

impl AdapterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: Provider, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.insert(provider, adapter);
        self
    }

    pub fn insert(&mut self, provider: Provider, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(provider, adapter);
    }

    /// Route remote fetches through `breaker`.
    pub fn with_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    pub fn breaker(&self) -> Option<&Arc<CircuitBreaker>> {
        self.breaker.as_ref()
    }

    pub fn get(&self, provider: Provider) -> Arc<dyn SourceAdapter> {
        let Some(adapter) = self.adapters.get(&provider) else {
            return Arc::new(UnavailableAdapter::new(format!(
                "no adapter configured for {provider}"
            )));
        };
        match &self.breaker {
            Some(breaker) if provider != Provider::Curated => Arc::new(Guarded::new(
                provider,
                Arc::clone(adapter),
                Arc::clone(breaker),
            )),
            _ => Arc::clone(adapter),
        }
    }

    /// The adapter serving `spec`.
    pub fn for_spec(&self, spec: &SeriesSpec) -> Arc<dyn SourceAdapter> {
        self.get(spec.provider)
    }
}

impl std::fmt::Debug for AdapterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self
            .adapters
            .iter()
            .map(|(p, a)| format!("{p}={}", a.name()))
            .collect();
        names.sort();
        f.debug_struct("AdapterSet")
            .field("adapters", &names)
            .field("breaker", &self.breaker.is_some())
            .finish()
    }
}

/// Blocking HTTP client with a request timeout, shared by the HTTP adapters.
pub fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client, SourceError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .map_err(|e| SourceError::Unavailable(format!("failed to build HTTP client: {e}")))
}

/// Map a transport error from reqwest into the adapter taxonomy.
pub(crate) fn transport_error(context: &str, e: reqwest::Error) -> SourceError {
    if e.is_decode() {
        SourceError::MalformedResponse(format!("{context}: {e}"))
    } else {
        SourceError::Unavailable(format!("{context}: {e}"))
    }
}
