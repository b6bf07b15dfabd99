//! Ingestion manifest: one JSON record per `"category/name"` key.
//!
//! ```json
//! {
//!   "fred/DFF": {
//!     "last_updated": "2026-02-06T09:30:00.123456",
//!     "status": "ok",
//!     "rows": 1305,
//!     "date_range": ["2021-02-08", "2026-02-06"]
//!   }
//! }
//! ```
//!
//! Error entries carry an `error` message and a null `date_range`.

use super::store::StoreError;
use crate::series::{IndexRange, SeriesKey};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Outcome of the latest ingestion attempt for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Ok,
    Error,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Ok => f.write_str("ok"),
            EntryStatus::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub last_updated: NaiveDateTime,
    pub status: EntryStatus,
    pub rows: usize,
    pub date_range: Option<[String; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// All manifest entries, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file is an empty manifest.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::Manifest {
            path: path.to_path_buf(),
            message: format!("parse: {e}"),
        })
    }

    /// Write the whole manifest atomically (temp file, then rename).
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| StoreError::Manifest {
            path: path.to_path_buf(),
            message: format!("serialize: {e}"),
        })?;

        let tmp_path = path.with_extension(format!("json.{}.tmp", std::process::id()));
        fs::write(&tmp_path, json).map_err(|e| StoreError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::io(path, e)
        })
    }

    /// Upsert the entry for `key`, stamped with the current local time.
    pub fn record(
        &mut self,
        key: &SeriesKey,
        status: EntryStatus,
        rows: usize,
        date_range: Option<IndexRange>,
        error: Option<String>,
    ) {
        let now = chrono::Local::now().naive_local();
        self.record_at(key, status, rows, date_range, error, now);
    }

    /// [`Manifest::record`] with an explicit timestamp.
    pub fn record_at(
        &mut self,
        key: &SeriesKey,
        status: EntryStatus,
        rows: usize,
        date_range: Option<IndexRange>,
        error: Option<String>,
        at: NaiveDateTime,
    ) {
        let (date_range, error) = match status {
            EntryStatus::Ok => (date_range.map(|r| r.labels()), None),
            EntryStatus::Error => (None, Some(error.unwrap_or_else(|| "unknown error".into()))),
        };
        self.entries.insert(
            key.manifest_key(),
            ManifestEntry {
                last_updated: at,
                status,
                rows,
                date_range,
                error,
            },
        );
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&ManifestEntry> {
        self.entries.get(&key.manifest_key())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-category status counts and update-time bounds.
    pub fn summarize(&self) -> ManifestSummary {
        let mut categories: BTreeMap<String, StatusCounts> = BTreeMap::new();
        for (key, entry) in &self.entries {
            let category = key.split('/').next().unwrap_or(key).to_string();
            let counts = categories.entry(category).or_default();
            match entry.status {
                EntryStatus::Ok => counts.ok += 1,
                EntryStatus::Error => counts.error += 1,
            }
        }

        let total = categories.values().fold(StatusCounts::default(), |acc, c| StatusCounts {
            ok: acc.ok + c.ok,
            error: acc.error + c.error,
        });

        ManifestSummary {
            entries: self.entries.len(),
            categories,
            total,
            oldest_update: self.entries.values().map(|e| e.last_updated).min(),
            newest_update: self.entries.values().map(|e| e.last_updated).max(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub ok: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.ok + self.error
    }
}

/// Pure summary of a manifest, as reported by `--status`.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestSummary {
    pub entries: usize,
    pub categories: BTreeMap<String, StatusCounts>,
    pub total: StatusCounts,
    pub oldest_update: Option<NaiveDateTime>,
    pub newest_update: Option<NaiveDateTime>,
}
