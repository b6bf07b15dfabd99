//! Parquet-backed series store.
//!
//! Layout: `{root}/{category}/{filename_key}.parquet`, manifest at
//! `{root}/manifest.json`.
//!
//! - Writes normalize the table, go to a process-unique temp file in the same
//!   directory, then rename into place. Readers never observe a torn file.
//! - A file that cannot be decoded is moved aside to `*.parquet.quarantined`
//!   and reported as absent.
//! - A decodable file whose columns do not fit the requested shape is a
//!   schema error; nothing is moved.

use super::frame::{self, FrameError};
use crate::filename::sanitize_name;
use crate::series::{SeriesKey, SeriesShape};
use crate::table::SeriesTable;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// File name of the manifest inside the store root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Store failures. Any of these aborts an ingestion run.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parquet error for {key}: {message}")]
    Parquet { key: String, message: String },

    #[error("schema mismatch for {key}: {message}")]
    Schema { key: String, message: String },

    #[error("refusing to store an empty table for {0}")]
    EmptyTable(String),

    #[error("manifest error at {path}: {message}")]
    Manifest { path: PathBuf, message: String },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn from_frame(key: &SeriesKey, err: FrameError) -> Self {
        match err {
            FrameError::Polars(message) => StoreError::Parquet {
                key: key.to_string(),
                message,
            },
            FrameError::Schema(message) => StoreError::Schema {
                key: key.to_string(),
                message,
            },
        }
    }
}

/// Handle on one store root. Cheap to clone; holds no open files.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    root: PathBuf,
}

impl SeriesStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    fn category_dir(&self, key: &SeriesKey) -> PathBuf {
        self.root.join(key.category.as_str())
    }

    /// Path of the Parquet file for a series.
    pub fn series_path(&self, key: &SeriesKey) -> PathBuf {
        self.category_dir(key)
            .join(format!("{}.parquet", sanitize_name(&key.name)))
    }

    /// Persist `table` as the full content of `key`, replacing any previous
    /// file. Returns the normalized table that was written.
    pub fn write(&self, key: &SeriesKey, table: SeriesTable) -> Result<SeriesTable, StoreError> {
        let table = table.normalize();
        if table.is_empty() {
            return Err(StoreError::EmptyTable(key.to_string()));
        }

        let dir = self.category_dir(key);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let mut df = frame::table_to_dataframe(&table).map_err(|e| StoreError::from_frame(key, e))?;
        let path = self.series_path(key);
        let tmp_path = path.with_extension(format!("parquet.{}.tmp", std::process::id()));

        if let Err(e) = frame::write_parquet(&mut df, &tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::from_frame(key, e));
        }

        // Atomic rename
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::io(&path, e)
        })?;

        debug!(key = %key, rows = table.len(), "wrote series");
        Ok(table)
    }

    /// Load a stored series. `Ok(None)` when nothing usable is stored.
    pub fn read(
        &self,
        key: &SeriesKey,
        shape: SeriesShape,
    ) -> Result<Option<SeriesTable>, StoreError> {
        let path = self.series_path(key);
        if !path.is_file() {
            return Ok(None);
        }

        let df = match frame::read_parquet(&path) {
            Ok(df) => df,
            Err(e) => {
                let quarantine = path.with_extension("parquet.quarantined");
                warn!(
                    key = %key,
                    path = %path.display(),
                    error = ?e,
                    "quarantining corrupt series file"
                );
                fs::rename(&path, &quarantine).map_err(|e| StoreError::io(&path, e))?;
                return Ok(None);
            }
        };

        frame::dataframe_to_table(&df, shape)
            .map(Some)
            .map_err(|e| StoreError::from_frame(key, e))
    }

    /// Merge `new_rows` into the stored series and write the result.
    ///
    /// A missing or schema-incompatible stored file is treated as empty, so
    /// the new rows become the whole series.
    pub fn merge_incremental(
        &self,
        key: &SeriesKey,
        shape: SeriesShape,
        new_rows: SeriesTable,
    ) -> Result<SeriesTable, StoreError> {
        let existing = match self.read(key, shape) {
            Ok(existing) => existing,
            Err(StoreError::Schema { message, .. }) => {
                warn!(key = %key, %message, "stored series has a different schema; replacing it");
                None
            }
            Err(e) => return Err(e),
        };

        let combined = match existing {
            Some(old) => old.merge(new_rows).map_err(|e| StoreError::Schema {
                key: key.to_string(),
                message: e.to_string(),
            })?,
            None => new_rows,
        };
        self.write(key, combined)
    }

    /// Total bytes of all Parquet files under the root.
    pub fn total_size(&self) -> u64 {
        parquet_size(&self.root)
    }

    /// Remove the whole store (Parquet files and manifest). Returns whether
    /// anything was there to remove.
    pub fn clean(&self) -> Result<bool, StoreError> {
        if !self.root.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        Ok(true)
    }
}

fn parquet_size(dir: &Path) -> u64 {
    let mut size = 0u64;
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                size += parquet_size(&path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("parquet") {
                if let Ok(meta) = entry.metadata() {
                    size += meta.len();
                }
            }
        }
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Category, IndexKey, PanelAxis};
    use crate::table::{
        EventColumn, EventLogTable, OhlcvBar, PanelRow, PanelTable, TimeValueTable,
    };
    use chrono::NaiveDate;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_store_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("macrodash_store_test_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fred_key() -> SeriesKey {
        SeriesKey::new(Category::Fred, "DFF")
    }

    fn sample_values() -> SeriesTable {
        SeriesTable::time_value(
            "value",
            vec![(d(2024, 1, 3), 5.33), (d(2024, 1, 2), 5.32), (d(2024, 1, 4), 5.31)],
        )
    }

    #[test]
    fn time_value_roundtrip() {
        let dir = temp_store_dir();
        let store = SeriesStore::new(&dir);

        let written = store.write(&fred_key(), sample_values()).unwrap();
        let loaded = store
            .read(&fred_key(), SeriesShape::TimeValue)
            .unwrap()
            .unwrap();

        assert_eq!(loaded, written);
        let SeriesTable::TimeValue(TimeValueTable { column, points }) = loaded else {
            panic!("wrong shape");
        };
        assert_eq!(column, "value");
        assert_eq!(points[0], (d(2024, 1, 2), 5.32));
        assert!(store.series_path(&fred_key()).ends_with("fred/DFF.parquet"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn ohlcv_roundtrip_keeps_volume_dtype() {
        let dir = temp_store_dir();
        let store = SeriesStore::new(&dir);
        let key = SeriesKey::new(Category::Market, "^GSPC");
        let bars = vec![
            OhlcvBar {
                date: d(2024, 1, 2),
                open: 100.0,
                high: 102.0,
                low: 99.0,
                close: 101.0,
                volume: 1_000,
            },
            OhlcvBar {
                date: d(2024, 1, 3),
                open: 101.0,
                high: 103.0,
                low: 100.0,
                close: 102.0,
                volume: 5_000_000_000,
            },
        ];

        store.write(&key, SeriesTable::Ohlcv(bars.clone())).unwrap();
        let loaded = store.read(&key, SeriesShape::Ohlcv).unwrap().unwrap();
        assert_eq!(loaded, SeriesTable::Ohlcv(bars));
        assert!(store.series_path(&key).ends_with("market/%5EGSPC.parquet"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn annual_panel_and_event_log_roundtrip() {
        let dir = temp_store_dir();
        let store = SeriesStore::new(&dir);

        let panel_key = SeriesKey::new(Category::Imf, "bop");
        let panel = SeriesTable::Panel(PanelTable {
            axis: PanelAxis::Annual,
            columns: vec!["US".into(), "U2".into()],
            rows: vec![
                PanelRow {
                    key: IndexKey::Year(2005),
                    values: vec![-500.0, 300.0],
                },
                PanelRow {
                    key: IndexKey::Year(2006),
                    values: vec![-480.0, 310.0],
                },
            ],
        });
        store.write(&panel_key, panel.clone()).unwrap();
        assert_eq!(
            store
                .read(&panel_key, SeriesShape::Panel(PanelAxis::Annual))
                .unwrap(),
            Some(panel)
        );

        let log_key = SeriesKey::new(Category::Policy, "cb_calendar");
        let log = SeriesTable::EventLog(EventLogTable {
            columns: vec![
                EventColumn::date("date", vec![d(2026, 2, 5), d(2026, 3, 6)]),
                EventColumn::text("bank", &["RBA", "ECB"]),
                EventColumn::number("current_rate", &[4.35, 4.0]),
            ],
        });
        store.write(&log_key, log.clone()).unwrap();
        assert_eq!(
            store.read(&log_key, SeriesShape::EventLog).unwrap(),
            Some(log)
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_missing_returns_none() {
        let dir = temp_store_dir();
        let store = SeriesStore::new(&dir);
        assert!(store
            .read(&fred_key(), SeriesShape::TimeValue)
            .unwrap()
            .is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_rejects_empty_table() {
        let dir = temp_store_dir();
        let store = SeriesStore::new(&dir);
        let result = store.write(&fred_key(), SeriesTable::time_value("value", Vec::new()));
        assert!(matches!(result, Err(StoreError::EmptyTable(_))));
        assert!(!store.series_path(&fred_key()).exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_file_is_quarantined() {
        let dir = temp_store_dir();
        let store = SeriesStore::new(&dir);
        let path = store.series_path(&fred_key());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not a parquet file").unwrap();

        let loaded = store.read(&fred_key(), SeriesShape::TimeValue).unwrap();
        assert!(loaded.is_none());
        assert!(!path.exists());
        assert!(path.with_extension("parquet.quarantined").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn reading_with_wrong_shape_is_schema_error() {
        let dir = temp_store_dir();
        let store = SeriesStore::new(&dir);
        store.write(&fred_key(), sample_values()).unwrap();

        let result = store.read(&fred_key(), SeriesShape::Ohlcv);
        assert!(matches!(result, Err(StoreError::Schema { .. })));
        // Schema errors leave the file in place
        assert!(store.series_path(&fred_key()).exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn merge_incremental_dedupes_and_sorts() {
        let dir = temp_store_dir();
        let store = SeriesStore::new(&dir);
        store.write(&fred_key(), sample_values()).unwrap();

        let update = SeriesTable::time_value(
            "value",
            vec![(d(2024, 1, 5), 5.30), (d(2024, 1, 4), 9.99)],
        );
        let merged = store
            .merge_incremental(&fred_key(), SeriesShape::TimeValue, update)
            .unwrap();

        let SeriesTable::TimeValue(t) = merged else {
            panic!("wrong shape");
        };
        assert_eq!(t.points.len(), 4);
        assert_eq!(t.points[2], (d(2024, 1, 4), 9.99));
        assert_eq!(t.points[3], (d(2024, 1, 5), 5.30));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn merge_into_missing_series_writes_new_rows() {
        let dir = temp_store_dir();
        let store = SeriesStore::new(&dir);
        let merged = store
            .merge_incremental(&fred_key(), SeriesShape::TimeValue, sample_values())
            .unwrap();
        assert_eq!(merged.len(), 3);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn size_and_clean() {
        let dir = temp_store_dir();
        let root = dir.join("data");
        let store = SeriesStore::new(&root);
        assert_eq!(store.total_size(), 0);

        store.write(&fred_key(), sample_values()).unwrap();
        assert!(store.total_size() > 0);

        assert!(store.clean().unwrap());
        assert!(!root.exists());
        assert!(!store.clean().unwrap());

        let _ = fs::remove_dir_all(&dir);
    }
}
