//! The export run: count, page, normalize, write, index, manifest.
//!
//! Records are streamed once: each page is normalized, filed into the search
//! index and written before the next page is fetched. The index is only
//! written after the last page, so it always covers the full record set.

use crate::domain::{Config, Manifest, Page};
use crate::error::{ExportError, ExportResult};
use crate::index::SearchIndex;
use crate::normalize::normalize;
use crate::render::{
    build_manifest, prune_stale_pages, write_metadata, write_page, write_search_index,
};
use crate::source::{ArchitectureSource, PagePlan, PageSpec};
use std::fmt;
use std::path::PathBuf;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Connected,
    Counting,
    Paging,
    Normalizing,
    WritingPage,
    Indexing,
    WritingIndex,
    WritingMetadata,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Connected => "connected",
            Stage::Counting => "counting",
            Stage::Paging => "paging",
            Stage::Normalizing => "normalizing",
            Stage::WritingPage => "writing page",
            Stage::Indexing => "indexing",
            Stage::WritingIndex => "writing index",
            Stage::WritingMetadata => "writing metadata",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Reported after each page file is written.
#[derive(Debug, Clone)]
pub struct PageWritten {
    pub page: usize,
    pub total_pages: usize,
    pub items: usize,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub manifest: Manifest,
    pub output_dir: PathBuf,
    pub pages_written: usize,
    pub index_keys: usize,
    pub stale_pages_removed: Vec<usize>,
}

/// A failed run, with the stage that was active when it failed.
#[derive(Debug, thiserror::Error)]
#[error("export failed at stage '{stage}'")]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub source: ExportError,
}

/// State owned by a single export invocation.
pub struct ExportRun<'a> {
    config: &'a Config,
    stage: Stage,
    index: SearchIndex,
}

impl<'a> ExportRun<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config, stage: Stage::Init, index: SearchIndex::new() }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, next: Stage) {
        tracing::debug!(from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }

    /// Run the whole pipeline, calling `on_page` after each page file is written.
    ///
    /// Ends in [`Stage::Done`] or [`Stage::Failed`]. Page files written before
    /// a failure stay on disk; `metadata.json` is only written by a full run.
    pub fn execute(
        &mut self,
        mut on_page: impl FnMut(&PageWritten),
    ) -> Result<ExportSummary, RunError> {
        match self.run(&mut on_page) {
            Ok(summary) => Ok(summary),
            Err(source) => {
                let stage = self.stage;
                tracing::debug!(%stage, "{}: {}", source.kind(), source);
                self.enter(Stage::Failed);
                Err(RunError { stage, source })
            }
        }
    }

    fn run(&mut self, on_page: &mut dyn FnMut(&PageWritten)) -> ExportResult<ExportSummary> {
        let config = self.config;

        // Opened before any output exists, so a bad source leaves nothing behind.
        let source = ArchitectureSource::open(&config.source_path)?;
        self.enter(Stage::Connected);

        self.enter(Stage::Counting);
        let total = source.count()?;
        let plan = PagePlan::new(total, config.page_size)?;
        tracing::info!(
            total_items = plan.total_items,
            total_pages = plan.total_pages,
            page_size = plan.page_size,
            "planned export"
        );

        std::fs::create_dir_all(&config.output_dir)
            .map_err(|e| ExportError::write(&config.output_dir, e))?;

        let mut pages_written = 0;
        for spec in plan.pages() {
            let written = self.export_page(&source, &plan, spec)?;
            pages_written += 1;
            on_page(&written);
        }
        drop(source);

        // Every page has been filed by now.
        self.enter(Stage::Indexing);
        let index_keys = self.index.key_count();
        tracing::debug!(keys = index_keys, "search index complete");

        self.enter(Stage::WritingIndex);
        write_search_index(&config.output_dir, &self.index)?;

        let stale_pages_removed = prune_stale_pages(&config.output_dir, plan.total_pages)?;
        if !stale_pages_removed.is_empty() {
            tracing::info!(removed = ?stale_pages_removed, "removed stale page files");
        }

        self.enter(Stage::WritingMetadata);
        let manifest = build_manifest(&plan);
        write_metadata(&config.output_dir, &manifest)?;

        self.enter(Stage::Done);
        Ok(ExportSummary {
            manifest,
            output_dir: config.output_dir.clone(),
            pages_written,
            index_keys,
            stale_pages_removed,
        })
    }

    fn export_page(
        &mut self,
        source: &ArchitectureSource,
        plan: &PagePlan,
        spec: PageSpec,
    ) -> ExportResult<PageWritten> {
        self.enter(Stage::Paging);
        let rows = source.fetch(spec.limit, spec.offset)?;

        self.enter(Stage::Normalizing);
        let items: Vec<_> = rows.into_iter().map(normalize).collect();
        self.index.extend(&items);

        self.enter(Stage::WritingPage);
        let page = Page {
            page: spec.number,
            total_pages: plan.total_pages,
            items_per_page: plan.page_size,
            total_items: plan.total_items,
            items,
        };
        let (path, bytes) = write_page(&self.config.output_dir, &page)?;
        tracing::debug!(page = page.page, items = page.items.len(), bytes, "wrote page");

        Ok(PageWritten {
            page: page.page,
            total_pages: plan.total_pages,
            items: page.items.len(),
            path,
            bytes,
        })
    }
}

/// Export `config.source_path` into `config.output_dir`.
pub fn run_export(config: &Config) -> Result<ExportSummary, RunError> {
    ExportRun::new(config).execute(|_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RawRecord, Record};
    use crate::source::tests::{fixture_db, CREATE_TABLE_SQL};
    use rusqlite::{params, Connection};
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(source: PathBuf, output: PathBuf, page_size: usize) -> Config {
        Config { source_path: source, output_dir: output, page_size }
    }

    fn read_page(dir: &std::path::Path, n: usize) -> Page {
        let text = fs::read_to_string(dir.join(format!("page_{n}.json"))).expect("read page");
        serde_json::from_str(&text).expect("parse page")
    }

    #[test]
    fn exports_120_records_into_three_pages() {
        let tmp = TempDir::new().expect("tmp");
        let db = fixture_db(tmp.path(), 120);
        let out = tmp.path().join("data");
        let summary = run_export(&config_for(db, out.clone(), 50)).expect("export");

        assert_eq!(summary.manifest.total_items, 120);
        assert_eq!(summary.manifest.total_pages, 3);
        assert_eq!(summary.pages_written, 3);

        let sizes: Vec<usize> = (1..=3).map(|n| read_page(&out, n).items.len()).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
        assert!(!out.join("page_4.json").exists());

        let ids: Vec<i64> =
            (1..=3).flat_map(|n| read_page(&out, n).items.into_iter().map(|r| r.id)).collect();
        assert_eq!(ids, (1..=120).collect::<Vec<i64>>());
        assert_eq!(ids.iter().collect::<BTreeSet<_>>().len(), 120);
    }

    #[test]
    fn page_headers_carry_totals() {
        let tmp = TempDir::new().expect("tmp");
        let db = fixture_db(tmp.path(), 5);
        let out = tmp.path().join("data");
        run_export(&config_for(db, out.clone(), 2)).expect("export");

        let last = read_page(&out, 3);
        assert_eq!(last.page, 3);
        assert_eq!(last.total_pages, 3);
        assert_eq!(last.items_per_page, 2);
        assert_eq!(last.total_items, 5);
        assert_eq!(last.items.len(), 1);
    }

    #[test]
    fn empty_source_writes_empty_index_and_zero_pages() {
        let tmp = TempDir::new().expect("tmp");
        let db = fixture_db(tmp.path(), 0);
        let out = tmp.path().join("data");
        let summary = run_export(&config_for(db, out.clone(), 50)).expect("export");

        assert_eq!(summary.manifest.total_pages, 0);
        assert!(!out.join("page_1.json").exists());
        let index: SearchIndex = serde_json::from_str(
            &fs::read_to_string(out.join("search_index.json")).expect("read index"),
        )
        .expect("parse index");
        assert!(index.is_empty());
        let manifest: Manifest = serde_json::from_str(
            &fs::read_to_string(out.join("metadata.json")).expect("read metadata"),
        )
        .expect("parse metadata");
        assert_eq!(manifest.total_pages, 0);
        assert_eq!(manifest.total_items, 0);
    }

    #[test]
    fn rerun_is_byte_identical_except_manifest_timestamp() {
        let tmp = TempDir::new().expect("tmp");
        let db = fixture_db(tmp.path(), 12);
        let out = tmp.path().join("data");
        let config = config_for(db, out.clone(), 5);

        run_export(&config).expect("first export");
        let first: Vec<Vec<u8>> = ["page_1.json", "page_2.json", "page_3.json", "search_index.json"]
            .iter()
            .map(|name| fs::read(out.join(name)).expect("read"))
            .collect();

        run_export(&config).expect("second export");
        let second: Vec<Vec<u8>> = ["page_1.json", "page_2.json", "page_3.json", "search_index.json"]
            .iter()
            .map(|name| fs::read(out.join(name)).expect("read"))
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn index_matches_normalized_records() {
        let tmp = TempDir::new().expect("tmp");
        let db = tmp.path().join("archimap.sqlite3");
        let conn = Connection::open(&db).expect("open");
        conn.execute_batch(CREATE_TABLE_SQL).expect("schema");
        conn.execute(
            "INSERT INTO ZCDARCHITECTURE (Z_PK, ZAR_TITLE, ZAR_ARCHITECT, ZAR_YEAR) VALUES (?1, ?2, ?3, ?4)",
            params![42, "Church of the Light", "Tadao Ando", 1989],
        )
        .expect("insert");
        conn.execute(
            "INSERT INTO ZCDARCHITECTURE (Z_PK, ZAR_TITLE, ZAR_ARCHITECT, ZAR_YEAR) VALUES (?1, NULL, NULL, ?2)",
            params![43, 0],
        )
        .expect("insert");
        drop(conn);

        let out = tmp.path().join("data");
        run_export(&config_for(db, out.clone(), 50)).expect("export");

        let index: SearchIndex = serde_json::from_str(
            &fs::read_to_string(out.join("search_index.json")).expect("read index"),
        )
        .expect("parse index");
        assert_eq!(index.architects.get("tadao ando"), Some(&vec![42]));
        assert_eq!(index.architects.len(), 1);
        assert_eq!(index.years.get("1989"), Some(&vec![42]));
        assert_eq!(index.years.len(), 1);
        assert!(index.addresses.is_empty());

        let page = read_page(&out, 1);
        let placeholder: &Record = &page.items[1];
        let expected = crate::normalize::normalize(RawRecord { id: 43, ..RawRecord::default() });
        assert_eq!(placeholder, &expected);
    }

    #[test]
    fn shrinking_export_removes_stale_pages() {
        let tmp = TempDir::new().expect("tmp");
        let db = fixture_db(tmp.path(), 10);
        let out = tmp.path().join("data");

        run_export(&config_for(db.clone(), out.clone(), 2)).expect("first export");
        assert!(out.join("page_5.json").exists());

        let summary = run_export(&config_for(db, out.clone(), 5)).expect("second export");
        assert_eq!(summary.stale_pages_removed, vec![3, 4, 5]);
        assert!(out.join("page_2.json").exists());
        assert!(!out.join("page_3.json").exists());
    }

    #[test]
    fn missing_source_fails_before_creating_output() {
        let tmp = TempDir::new().expect("tmp");
        let out = tmp.path().join("data");
        let err = run_export(&config_for(tmp.path().join("missing.sqlite3"), out.clone(), 50))
            .expect_err("missing source");

        assert_eq!(err.stage, Stage::Init);
        assert!(matches!(err.source, ExportError::Connection { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn missing_table_is_query_error_during_counting() {
        let tmp = TempDir::new().expect("tmp");
        let db = tmp.path().join("empty.sqlite3");
        Connection::open(&db).expect("open").execute_batch("CREATE TABLE other (x INTEGER);")
            .expect("schema");

        let err = run_export(&config_for(db, tmp.path().join("data"), 50)).expect_err("no table");
        assert_eq!(err.stage, Stage::Counting);
        assert!(matches!(err.source, ExportError::Query { .. }));
    }

    #[test]
    fn progress_callback_sees_every_page() {
        let tmp = TempDir::new().expect("tmp");
        let db = fixture_db(tmp.path(), 7);
        let config = config_for(db, tmp.path().join("data"), 3);

        let mut seen = Vec::new();
        ExportRun::new(&config)
            .execute(|written| seen.push((written.page, written.items)))
            .expect("export");
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 1)]);
    }

    #[test]
    fn run_ends_in_done_or_failed() {
        let tmp = TempDir::new().expect("tmp");
        let db = fixture_db(tmp.path(), 3);
        let config = config_for(db, tmp.path().join("data"), 2);
        let mut run = ExportRun::new(&config);
        run.execute(|_| {}).expect("export");
        assert_eq!(run.stage(), Stage::Done);

        let missing = config_for(tmp.path().join("missing.sqlite3"), tmp.path().join("out"), 2);
        let mut run = ExportRun::new(&missing);
        let err = run.execute(|_| {}).expect_err("missing source");
        assert_eq!(run.stage(), Stage::Failed);
        assert_eq!(err.stage, Stage::Init);
    }

    #[test]
    fn failed_page_write_keeps_earlier_pages_and_skips_metadata() {
        let tmp = TempDir::new().expect("tmp");
        let db = fixture_db(tmp.path(), 120);
        let out = tmp.path().join("data");
        fs::create_dir_all(out.join("page_2.json")).expect("block page 2");

        let err = run_export(&config_for(db, out.clone(), 50)).expect_err("page 2 unwritable");
        assert_eq!(err.stage, Stage::WritingPage);
        assert!(matches!(err.source, ExportError::Write { .. }));
        assert_eq!(read_page(&out, 1).items.len(), 50);
        assert!(!out.join("page_3.json").exists());
        assert!(!out.join("search_index.json").exists());
        assert!(!out.join("metadata.json").exists());
    }

    #[test]
    fn text_latitude_is_exported_as_stored() {
        let tmp = TempDir::new().expect("tmp");
        let db = fixture_db(tmp.path(), 2);
        Connection::open(&db)
            .expect("open rw")
            .execute("UPDATE ZCDARCHITECTURE SET ZAR_LATITUDE = '' WHERE Z_PK = 2", [])
            .expect("update");

        let out = tmp.path().join("data");
        run_export(&config_for(db, out.clone(), 50)).expect("export");

        let page = read_page(&out, 1);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].latitude, serde_json::Value::Null);
        assert_eq!(page.items[1].latitude, serde_json::json!(""));
        let raw = fs::read_to_string(out.join("page_1.json")).expect("read");
        assert!(raw.contains(r#""latitude":"","#));
    }
}
