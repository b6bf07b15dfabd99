//! `--status` report: manifest counts per category, update bounds, disk use.

use macrodash_core::data::{Manifest, ManifestSummary, SeriesStore, StoreError};
use std::fmt;

const RULE_WIDTH: usize = 70;

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub summary: ManifestSummary,
    /// Bytes of all Parquet files in the store.
    pub parquet_bytes: u64,
}

impl StatusReport {
    pub fn new(summary: ManifestSummary, parquet_bytes: u64) -> Self {
        Self {
            summary,
            parquet_bytes,
        }
    }

    /// Build the report from the store on disk.
    pub fn collect(store: &SeriesStore) -> Result<Self, StoreError> {
        let manifest = Manifest::load(&store.manifest_path())?;
        Ok(Self::new(manifest.summarize(), store.total_size()))
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        if s.entries == 0 {
            return writeln!(f, "No data ingested yet. Run: macrodash --full");
        }

        writeln!(f, "Data Manifest ({} entries)", s.entries)?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        for (category, counts) in &s.categories {
            writeln!(f, "  {category:15}  {} ok, {} errors", counts.ok, counts.error)?;
        }
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(f, "  {:15}  {} ok, {} errors", "TOTAL", s.total.ok, s.total.error)?;

        if let (Some(oldest), Some(newest)) = (s.oldest_update, s.newest_update) {
            writeln!(f)?;
            writeln!(f, "  Oldest update: {}", oldest.format("%Y-%m-%dT%H:%M:%S"))?;
            writeln!(f, "  Newest update: {}", newest.format("%Y-%m-%dT%H:%M:%S"))?;
        }
        writeln!(
            f,
            "  Total Parquet size: {:.1} MB",
            self.parquet_bytes as f64 / 1024.0 / 1024.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use macrodash_core::data::EntryStatus;
    use macrodash_core::series::{Category, SeriesKey};

    fn at(h: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 6)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn empty_manifest_prompts_for_a_full_run() {
        let report = StatusReport::new(Manifest::new().summarize(), 0);
        assert_eq!(report.to_string(), "No data ingested yet. Run: macrodash --full\n");
    }

    #[test]
    fn report_lists_categories_and_totals() {
        let mut manifest = Manifest::new();
        for (i, name) in ["DFF", "DGS10", "DGS2"].iter().enumerate() {
            manifest.record_at(
                &SeriesKey::new(Category::Fred, *name),
                EntryStatus::Ok,
                100,
                None,
                None,
                at(9 + i as u32),
            );
        }
        manifest.record_at(
            &SeriesKey::new(Category::Market, "^GSPC"),
            EntryStatus::Error,
            1305,
            None,
            Some("source unavailable".into()),
            at(8),
        );

        let text = StatusReport::new(manifest.summarize(), 3 * 1024 * 1024 / 2).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Data Manifest (4 entries)");
        assert_eq!(lines[1], "-".repeat(70));
        assert_eq!(lines[2], "  fred             3 ok, 0 errors");
        assert_eq!(lines[3], "  market           0 ok, 1 errors");
        assert_eq!(lines[5], "  TOTAL            3 ok, 1 errors");
        assert!(text.contains("  Oldest update: 2026-02-06T08:00:00\n"));
        assert!(text.contains("  Newest update: 2026-02-06T11:00:00\n"));
        assert!(text.ends_with("  Total Parquet size: 1.5 MB\n"));
    }
}
