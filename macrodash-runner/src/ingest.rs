//! Ingestion orchestrator.
//!
//! Walks the registry (all targets or one category), fetches each series
//! through its adapter, persists the result and records it in the manifest.
//! Adapter failures stay inside the target: the deterministic fallback is
//! stored and the entry is marked `error`. Store failures abort the run
//! before the manifest is saved.
//!
//! With more than one worker, targets run on a private rayon pool. Each
//! series write is atomic on its own, manifest updates go through a mutex
//! and the manifest is saved once after every worker has finished.

use crate::progress::IngestProgress;
use macrodash_core::data::{
    AdapterSet, EntryStatus, FetchMode, FetchRequest, Manifest, SeriesStore, SourceAdapter,
    SourceError, StoreError,
};
use macrodash_core::registry::{Registry, SeriesSpec};
use macrodash_core::series::{Category, SeriesKey};
use macrodash_core::table::SeriesTable;
use rayon::prelude::*;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Ingestion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Fetch entire history and overwrite.
    Full,
    /// Fetch only what is newer than the stored series and merge.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub mode: IngestMode,
    /// Restrict the run to one category.
    pub scope: Option<Category>,
    pub workers: usize,
}

impl IngestOptions {
    pub fn new(mode: IngestMode) -> Self {
        Self {
            mode,
            scope: None,
            workers: 1,
        }
    }

    pub fn scoped(mut self, scope: Option<Category>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

/// How a single target ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Live data written or merged.
    Live,
    /// Incremental fetch returned nothing new; stored series unchanged.
    UpToDate,
    /// Live fetch failed; fallback data stored.
    Fallback { reason: String },
    /// Provider returned zero rows for a full query; stored series unchanged.
    EmptyResult { reason: String },
}

impl OutcomeKind {
    pub fn is_ok(&self) -> bool {
        matches!(self, OutcomeKind::Live | OutcomeKind::UpToDate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub key: SeriesKey,
    pub kind: OutcomeKind,
    /// Rows in the stored series after this target.
    pub rows: usize,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Every target was served by a live fetch.
    Completed,
    /// At least one target fell back or came back empty.
    PartiallyFailed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunState::Completed => "completed",
            RunState::PartiallyFailed => "partially failed",
        })
    }
}

/// Aggregate of one orchestrator invocation. Not persisted.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub attempted: usize,
    pub ok: usize,
    pub errors: usize,
    pub fallbacks: usize,
    pub empty: usize,
    pub elapsed: Duration,
    pub state: RunState,
    /// Per-target outcomes in registry order.
    pub outcomes: Vec<TargetOutcome>,
}

impl RunSummary {
    fn from_outcomes(outcomes: Vec<TargetOutcome>, elapsed: Duration) -> Self {
        let ok = outcomes.iter().filter(|o| o.kind.is_ok()).count();
        let fallbacks = outcomes
            .iter()
            .filter(|o| matches!(o.kind, OutcomeKind::Fallback { .. }))
            .count();
        let empty = outcomes
            .iter()
            .filter(|o| matches!(o.kind, OutcomeKind::EmptyResult { .. }))
            .count();
        let errors = fallbacks + empty;
        Self {
            attempted: outcomes.len(),
            ok,
            errors,
            fallbacks,
            empty,
            elapsed,
            state: if errors == 0 {
                RunState::Completed
            } else {
                RunState::PartiallyFailed
            },
            outcomes,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ingestion {}: {}/{} ok, {} errors ({} fallback, {} empty) in {:.1}s",
            self.state,
            self.ok,
            self.attempted,
            self.errors,
            self.fallbacks,
            self.empty,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Run one ingestion pass and save the manifest.
pub fn run_ingest(
    store: &SeriesStore,
    registry: &Registry,
    adapters: &AdapterSet,
    options: &IngestOptions,
    progress: &dyn IngestProgress,
) -> Result<RunSummary, StoreError> {
    let started = Instant::now();
    let manifest_path = store.manifest_path();
    let manifest = Mutex::new(Manifest::load(&manifest_path)?);

    let targets = registry.scoped(options.scope);
    let total = targets.len();
    debug!(
        total,
        mode = ?options.mode,
        scope = ?options.scope,
        workers = options.workers,
        "starting ingestion"
    );

    let run_target = |(index, spec): (usize, &&SeriesSpec)| -> Result<TargetOutcome, StoreError> {
        progress.on_start(&spec.key, index, total);
        let adapter = adapters.for_spec(spec);
        let outcome = ingest_target(store, spec, adapter.as_ref(), options.mode, &manifest)?;
        progress.on_complete(&outcome, index, total);
        Ok(outcome)
    };

    let thread_pool = if options.workers > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!(error = %e, "failed to build worker pool; ingesting sequentially");
                None
            }
        }
    } else {
        None
    };

    let outcomes: Vec<TargetOutcome> = if let Some(ref tp) = thread_pool {
        tp.install(|| {
            targets
                .par_iter()
                .enumerate()
                .map(run_target)
                .collect::<Result<Vec<_>, StoreError>>()
        })?
    } else {
        targets
            .iter()
            .enumerate()
            .map(run_target)
            .collect::<Result<Vec<_>, StoreError>>()?
    };

    let manifest = manifest.into_inner().unwrap_or_else(|e| e.into_inner());
    manifest.save(&manifest_path)?;

    let summary = RunSummary::from_outcomes(outcomes, started.elapsed());
    progress.on_run_complete(&summary);
    Ok(summary)
}

fn lock(manifest: &Mutex<Manifest>) -> MutexGuard<'_, Manifest> {
    manifest.lock().unwrap_or_else(|e| e.into_inner())
}

/// Stored series for `spec`. A file that no longer fits the declared shape
/// is treated as absent and will be replaced.
fn existing_series(
    store: &SeriesStore,
    spec: &SeriesSpec,
) -> Result<Option<SeriesTable>, StoreError> {
    match store.read(&spec.key, spec.shape) {
        Ok(existing) => Ok(existing),
        Err(StoreError::Schema { message, .. }) => {
            warn!(key = %spec.key, %message, "stored series does not match its shape");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn ingest_target(
    store: &SeriesStore,
    spec: &SeriesSpec,
    adapter: &dyn SourceAdapter,
    mode: IngestMode,
    manifest: &Mutex<Manifest>,
) -> Result<TargetOutcome, StoreError> {
    let key = &spec.key;
    let existing = match mode {
        IngestMode::Full => None,
        IngestMode::Update => existing_series(store, spec)?,
    };
    let request = match existing.as_ref().and_then(|t| t.index_range()) {
        Some(range) => FetchRequest::incremental(range),
        None => FetchRequest::full(),
    };

    let fetched = adapter.fetch(spec, &request).and_then(|table| {
        if table.shape() == spec.shape {
            Ok(table)
        } else {
            Err(SourceError::MalformedResponse(format!(
                "{} returned a {} table for a {} series",
                adapter.name(),
                table.shape(),
                spec.shape
            )))
        }
    });

    match fetched {
        Ok(table) if table.is_empty() => match existing {
            Some(existing) => {
                lock(manifest).record(
                    key,
                    EntryStatus::Ok,
                    existing.len(),
                    existing.index_range(),
                    None,
                );
                Ok(TargetOutcome {
                    key: key.clone(),
                    kind: OutcomeKind::UpToDate,
                    rows: existing.len(),
                })
            }
            None => record_empty(
                key,
                format!("{} returned no rows", adapter.name()),
                stored_rows(store, spec, None)?,
                manifest,
            ),
        },
        Ok(table) => {
            let stored = persist(store, spec, request.mode, table)?;
            lock(manifest).record(key, EntryStatus::Ok, stored.len(), stored.index_range(), None);
            Ok(TargetOutcome {
                key: key.clone(),
                kind: OutcomeKind::Live,
                rows: stored.len(),
            })
        }
        Err(SourceError::EmptyResult(reason)) => {
            warn!(key = %key, %reason, "empty result");
            let rows = stored_rows(store, spec, existing.as_ref())?;
            record_empty(key, SourceError::EmptyResult(reason).to_string(), rows, manifest)
        }
        Err(err) => {
            warn!(key = %key, error = %err, "live fetch failed; storing fallback");
            let stored = persist(store, spec, request.mode, adapter.fallback(spec))?;
            let reason = err.to_string();
            lock(manifest).record(
                key,
                EntryStatus::Error,
                stored.len(),
                None,
                Some(reason.clone()),
            );
            Ok(TargetOutcome {
                key: key.clone(),
                kind: OutcomeKind::Fallback { reason },
                rows: stored.len(),
            })
        }
    }
}

/// Rows of the series left on disk when nothing new is stored.
fn stored_rows(
    store: &SeriesStore,
    spec: &SeriesSpec,
    existing: Option<&SeriesTable>,
) -> Result<usize, StoreError> {
    match existing {
        Some(table) => Ok(table.len()),
        None => Ok(existing_series(store, spec)?.map_or(0, |t| t.len())),
    }
}

fn record_empty(
    key: &SeriesKey,
    reason: String,
    rows: usize,
    manifest: &Mutex<Manifest>,
) -> Result<TargetOutcome, StoreError> {
    lock(manifest).record(key, EntryStatus::Error, rows, None, Some(reason.clone()));
    Ok(TargetOutcome {
        key: key.clone(),
        kind: OutcomeKind::EmptyResult { reason },
        rows,
    })
}

/// Overwrite in full mode, merge in incremental mode.
fn persist(
    store: &SeriesStore,
    spec: &SeriesSpec,
    mode: FetchMode,
    table: SeriesTable,
) -> Result<SeriesTable, StoreError> {
    match mode {
        FetchMode::Full => store.write(&spec.key, table),
        FetchMode::Incremental => store.merge_incremental(&spec.key, spec.shape, table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, kind: OutcomeKind) -> TargetOutcome {
        TargetOutcome {
            key: SeriesKey::new(Category::Fred, name),
            kind,
            rows: 10,
        }
    }

    #[test]
    fn summary_counts_and_state() {
        let all_ok = RunSummary::from_outcomes(
            vec![outcome("DFF", OutcomeKind::Live), outcome("DGS10", OutcomeKind::UpToDate)],
            Duration::from_millis(5),
        );
        assert_eq!(all_ok.attempted, 2);
        assert_eq!(all_ok.ok, 2);
        assert_eq!(all_ok.state, RunState::Completed);

        let mixed = RunSummary::from_outcomes(
            vec![
                outcome("DFF", OutcomeKind::Live),
                outcome("DGS10", OutcomeKind::Fallback { reason: "offline".into() }),
                outcome("DGS2", OutcomeKind::EmptyResult { reason: "none".into() }),
            ],
            Duration::from_millis(5),
        );
        assert_eq!((mixed.ok, mixed.errors, mixed.fallbacks, mixed.empty), (1, 2, 1, 1));
        assert_eq!(mixed.state, RunState::PartiallyFailed);
        assert!(mixed.to_string().starts_with("Ingestion partially failed: 1/3 ok, 2 errors"));
    }

    #[test]
    fn empty_run_is_completed() {
        let summary = RunSummary::from_outcomes(Vec::new(), Duration::ZERO);
        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.state, RunState::Completed);
    }

    #[test]
    fn options_builder() {
        let opts = IngestOptions::new(IngestMode::Update)
            .scoped(Some(Category::Market))
            .with_workers(0);
        assert_eq!(opts.workers, 1);
        assert_eq!(opts.scope, Some(Category::Market));
    }
}
