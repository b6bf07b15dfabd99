//! Progress callbacks for ingestion runs.

use crate::ingest::{OutcomeKind, RunSummary, TargetOutcome};
use macrodash_core::series::SeriesKey;
use tracing::{info, warn};

/// Observer for a multi-target ingestion run. Called from worker threads
/// when the run is parallel.
pub trait IngestProgress: Sync {
    /// Called when a target starts.
    fn on_start(&self, key: &SeriesKey, index: usize, total: usize);

    /// Called when a target has been persisted and recorded.
    fn on_complete(&self, outcome: &TargetOutcome, index: usize, total: usize);

    /// Called once after the manifest is saved.
    fn on_run_complete(&self, summary: &RunSummary);
}

/// Reports progress through `tracing`.
pub struct LogProgress;

impl IngestProgress for LogProgress {
    fn on_start(&self, key: &SeriesKey, index: usize, total: usize) {
        info!("[{}/{}] {key}", index + 1, total);
    }

    fn on_complete(&self, outcome: &TargetOutcome, _index: usize, _total: usize) {
        match &outcome.kind {
            OutcomeKind::Live => info!(key = %outcome.key, rows = outcome.rows, "ok"),
            OutcomeKind::UpToDate => {
                info!(key = %outcome.key, rows = outcome.rows, "ok, no new rows")
            }
            OutcomeKind::Fallback { reason } => warn!(
                key = %outcome.key,
                rows = outcome.rows,
                %reason,
                "stored fallback data"
            ),
            OutcomeKind::EmptyResult { reason } => {
                warn!(key = %outcome.key, %reason, "empty result; kept stored series")
            }
        }
    }

    fn on_run_complete(&self, summary: &RunSummary) {
        info!(
            attempted = summary.attempted,
            ok = summary.ok,
            errors = summary.errors,
            fallbacks = summary.fallbacks,
            empty = summary.empty,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            state = %summary.state,
            "ingestion finished"
        );
    }
}

/// Discards every event.
pub struct SilentProgress;

impl IngestProgress for SilentProgress {
    fn on_start(&self, _key: &SeriesKey, _index: usize, _total: usize) {}
    fn on_complete(&self, _outcome: &TargetOutcome, _index: usize, _total: usize) {}
    fn on_run_complete(&self, _summary: &RunSummary) {}
}
