//! Integration tests for the series store and manifest over the built-in
//! registry: every fallback table must survive a Parquet round trip, files
//! land under their filename keys, and the manifest reloads what was saved.

use macrodash_core::data::{EntryStatus, Manifest, SeriesStore};
use macrodash_core::filename::sanitize_name;
use macrodash_core::registry::Registry;
use macrodash_core::series::{Category, SeriesKey};
use macrodash_core::synthetic::generate;
use macrodash_core::table::SeriesTable;

fn same_content(a: &SeriesTable, b: &SeriesTable) -> bool {
    // Compared via Debug so NaN cells count as equal
    format!("{a:?}") == format!("{b:?}")
}

#[test]
fn every_registered_fallback_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path());
    let registry = Registry::builtin();

    for spec in registry.specs() {
        let written = store.write(&spec.key, generate(spec)).unwrap();
        let read = store.read(&spec.key, spec.shape).unwrap().unwrap();
        assert_eq!(read.shape(), spec.shape, "{}", spec.key);
        assert_eq!(read.value_columns(), written.value_columns(), "{}", spec.key);
        assert!(same_content(&read, &written), "{} changed in the round trip", spec.key);
    }

    // One file per series, named by its filename key
    for spec in registry.specs() {
        let expected = dir
            .path()
            .join(spec.key.category.as_str())
            .join(format!("{}.parquet", sanitize_name(&spec.key.name)));
        assert!(expected.is_file(), "missing {}", expected.display());
    }
    assert!(store.total_size() > 0);
}

#[test]
fn ticker_names_use_escaped_file_stems() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path());
    let key = SeriesKey::new(Category::Market, "^GSPC");
    assert_eq!(
        store.series_path(&key),
        dir.path().join("market").join("%5EGSPC.parquet")
    );
}

#[test]
fn manifest_reloads_after_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path());
    let registry = Registry::builtin();

    let mut manifest = Manifest::new();
    for spec in registry.scoped(Some(Category::Policy)) {
        let table = store.write(&spec.key, generate(spec)).unwrap();
        manifest.record(&spec.key, EntryStatus::Ok, table.len(), table.index_range(), None);
    }
    manifest.record(
        &SeriesKey::new(Category::Fred, "DFF"),
        EntryStatus::Error,
        1305,
        None,
        Some("source unavailable: FRED_API_KEY not set".into()),
    );
    manifest.save(&store.manifest_path()).unwrap();

    let loaded = Manifest::load(&store.manifest_path()).unwrap();
    assert_eq!(loaded.len(), 4);
    let events = loaded.get(&SeriesKey::new(Category::Policy, "events")).unwrap();
    assert_eq!(events.status, EntryStatus::Ok);
    assert_eq!(events.rows, 20);
    assert_eq!(events.date_range, Some(["0".to_string(), "19".to_string()]));

    let summary = loaded.summarize();
    assert_eq!(summary.total.ok, 3);
    assert_eq!(summary.total.error, 1);
}

#[test]
fn clean_removes_everything() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("data");
    let store = SeriesStore::new(&root);
    let registry = Registry::builtin();
    let spec = registry.get(&SeriesKey::new(Category::Fred, "DFF")).unwrap();

    store.write(&spec.key, generate(spec)).unwrap();
    Manifest::new().save(&store.manifest_path()).unwrap();
    assert!(store.clean().unwrap());
    assert!(!root.exists());
    assert!(store.read(&spec.key, spec.shape).unwrap().is_none());
    assert_eq!(store.total_size(), 0);
    assert!(!store.clean().unwrap());
}
