//! Registry of ingestion targets.
//!
//! Every stored series is described by a [`SeriesSpec`]: its key, the
//! provider and remote identifier used for live fetches, its column shape
//! and the parameters of its fallback generator.

mod builtin;
pub mod countries;

use crate::series::{Category, SeriesKey, SeriesShape};
use crate::synthetic::SyntheticModel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// External provider that serves a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Fred,
    WorldBank,
    Yahoo,
    /// Curated or modelled tables with no remote API.
    Curated,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Fred => "fred",
            Provider::WorldBank => "world_bank",
            Provider::Yahoo => "yahoo",
            Provider::Curated => "curated",
        })
    }
}

/// Everything needed to ingest one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub key: SeriesKey,
    /// Human-readable label for progress output.
    pub label: String,
    /// Identifier at the provider (FRED series id, ticker, indicator code).
    pub remote_id: String,
    pub shape: SeriesShape,
    pub provider: Provider,
    pub model: SyntheticModel,
}

/// Ordered set of ingestion targets.
#[derive(Debug, Clone)]
pub struct Registry {
    specs: Vec<SeriesSpec>,
}

impl Registry {
    pub fn new(specs: Vec<SeriesSpec>) -> Self {
        Self { specs }
    }

    /// Every series the dashboard ingests, in category order.
    pub fn builtin() -> Self {
        Self::new(builtin::all_specs())
    }

    pub fn specs(&self) -> &[SeriesSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Targets in registry order, optionally restricted to one category.
    pub fn scoped(&self, scope: Option<Category>) -> Vec<&SeriesSpec> {
        self.specs
            .iter()
            .filter(|s| scope.map_or(true, |c| s.key.category == c))
            .collect()
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&SeriesSpec> {
        self.specs.iter().find(|s| &s.key == key)
    }
}
