//! Live adapter wiring from configuration and the environment.

use crate::config::DashConfig;
use macrodash_core::data::{
    http_client, AdapterSet, CircuitBreaker, CuratedAdapter, FredAdapter, UnavailableAdapter,
    WorldBankAdapter, YahooAdapter,
};
use macrodash_core::registry::Provider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Build the adapter set used by ingestion and the read path.
///
/// Loads `.env` first. A missing FRED key or an HTTP client that cannot be
/// built leaves the affected providers unavailable, so their series fall
/// back instead of failing the run. Yahoo, FRED and World Bank share one
/// circuit breaker with per-provider state.
pub fn live_adapters(config: &DashConfig) -> AdapterSet {
    dotenvy::dotenv().ok();

    let breaker = Arc::new(CircuitBreaker::default());
    let mut adapters = AdapterSet::new()
        .with_breaker(breaker.clone())
        .with(Provider::Curated, Arc::new(CuratedAdapter));

    let client = match http_client(Duration::from_secs(config.ingest.timeout_secs)) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "HTTP providers disabled");
            for provider in [Provider::Fred, Provider::Yahoo, Provider::WorldBank] {
                adapters.insert(provider, Arc::new(UnavailableAdapter::new(e.to_string())));
            }
            return adapters;
        }
    };

    let key_var = &config.providers.fred_api_key_env;
    match std::env::var(key_var) {
        Ok(key) if !key.trim().is_empty() => {
            adapters.insert(
                Provider::Fred,
                Arc::new(FredAdapter::new(
                    client.clone(),
                    key.trim(),
                    config.ingest.history_start,
                )),
            );
        }
        _ => {
            info!(var = %key_var, "no FRED API key; FRED series will use fallbacks");
            adapters.insert(
                Provider::Fred,
                Arc::new(UnavailableAdapter::new(format!("{key_var} not set"))),
            );
        }
    }

    adapters.insert(
        Provider::Yahoo,
        Arc::new(YahooAdapter::new(client.clone(), breaker)),
    );
    adapters.insert(Provider::WorldBank, Arc::new(WorldBankAdapter::new(client)));
    adapters
}
