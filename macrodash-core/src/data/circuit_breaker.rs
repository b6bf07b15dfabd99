//! Per-provider circuit breakers.
//!
//! One [`CircuitBreaker`] is shared by every adapter of an [`AdapterSet`]
//! (and by the ingestion workers using it). It keeps a separate state per
//! [`Provider`]: a provider opens after `failure_threshold` consecutive
//! [`SourceError::Unavailable`] fetches, or at once when an adapter reports
//! that the provider rejected the client (Yahoo's HTTP 403). While a
//! provider is open its fetches fail with `Unavailable` without touching the
//! network; other providers keep working.
//!
//! Empty and malformed responses prove the provider answered, so they reset
//! the failure count instead of adding to it.
//!
//! [`AdapterSet`]: super::source::AdapterSet

use super::source::{FetchRequest, SourceAdapter, SourceError};
use crate::registry::{Provider, SeriesSpec};
use crate::table::SeriesTable;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::warn;

/// Consecutive unavailable fetches before a provider opens.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// How long an open provider refuses fetches.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Default)]
struct ProviderState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    providers: Mutex<HashMap<Provider, ProviderState>>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN, DEFAULT_FAILURE_THRESHOLD)
    }
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            providers: Mutex::new(HashMap::new()),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    // Counters stay consistent across a panicking worker.
    fn lock(&self) -> MutexGuard<'_, HashMap<Provider, ProviderState>> {
        self.providers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// `Ok` when `provider` may be called now. An expired cooldown closes
    /// the provider again.
    pub fn check(&self, provider: Provider) -> Result<(), SourceError> {
        self.check_at(provider, Instant::now())
    }

    fn check_at(&self, provider: Provider, now: Instant) -> Result<(), SourceError> {
        let mut providers = self.lock();
        let Some(state) = providers.get_mut(&provider) else {
            return Ok(());
        };
        match state.opened_at {
            Some(opened_at) if now.saturating_duration_since(opened_at) < self.cooldown => {
                let left = self.cooldown - now.saturating_duration_since(opened_at);
                Err(SourceError::Unavailable(format!(
                    "{provider} circuit open, {}s of cooldown left",
                    left.as_secs()
                )))
            }
            Some(_) => {
                *state = ProviderState::default();
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Account for one finished fetch against `provider`.
    pub fn record<T>(&self, provider: Provider, outcome: &Result<T, SourceError>) {
        self.record_at(provider, outcome, Instant::now());
    }

    fn record_at<T>(&self, provider: Provider, outcome: &Result<T, SourceError>, now: Instant) {
        let mut providers = self.lock();
        let state = providers.entry(provider).or_default();
        match outcome {
            Err(SourceError::Unavailable(_)) => {
                state.consecutive_failures += 1;
                if state.consecutive_failures >= self.failure_threshold && state.opened_at.is_none()
                {
                    warn!(%provider, failures = state.consecutive_failures, "circuit opened");
                    state.opened_at = Some(now);
                }
            }
            Ok(_) | Err(SourceError::EmptyResult(_)) | Err(SourceError::MalformedResponse(_)) => {
                state.consecutive_failures = 0;
            }
        }
    }

    /// Open `provider` immediately, e.g. after the provider banned the client.
    pub fn trip(&self, provider: Provider) {
        warn!(%provider, "circuit tripped");
        self.lock().entry(provider).or_default().opened_at = Some(Instant::now());
    }

    pub fn is_open(&self, provider: Provider) -> bool {
        self.check(provider).is_err()
    }

    /// Consecutive unavailable fetches recorded for `provider`.
    pub fn failures(&self, provider: Provider) -> u32 {
        self.lock()
            .get(&provider)
            .map_or(0, |s| s.consecutive_failures)
    }
}

/// Adapter wrapper that consults the shared breaker around every fetch.
pub(crate) struct Guarded {
    provider: Provider,
    inner: Arc<dyn SourceAdapter>,
    breaker: Arc<CircuitBreaker>,
}

impl Guarded {
    pub(crate) fn new(
        provider: Provider,
        inner: Arc<dyn SourceAdapter>,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            provider,
            inner,
            breaker,
        }
    }
}

impl SourceAdapter for Guarded {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, spec: &SeriesSpec, request: &FetchRequest) -> Result<SeriesTable, SourceError> {
        self.breaker.check(self.provider)?;
        let outcome = self.inner.fetch(spec, request);
        self.breaker.record(self.provider, &outcome);
        outcome
    }

    fn fallback(&self, spec: &SeriesSpec) -> SeriesTable {
        self.inner.fallback(spec)
    }
}
