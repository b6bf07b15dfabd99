//! Adapter for curated and modelled tables that have no remote API.

use super::source::{FetchMode, FetchRequest, SourceAdapter, SourceError};
use crate::registry::SeriesSpec;
use crate::synthetic;
use crate::table::SeriesTable;

/// Serves IMF panels, semiconductor cycles and policy tables from their
/// built-in definitions. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct CuratedAdapter;

impl SourceAdapter for CuratedAdapter {
    fn name(&self) -> &str {
        "curated"
    }

    fn fetch(&self, spec: &SeriesSpec, request: &FetchRequest) -> Result<SeriesTable, SourceError> {
        let table = synthetic::generate(spec);
        Ok(match (request.mode, request.since) {
            (_, Some(since)) => table.since(since),
            (FetchMode::Incremental, None) => match request.start_date() {
                Some(start) => table.since(start),
                None => table,
            },
            (FetchMode::Full, None) => table,
        })
    }
}
