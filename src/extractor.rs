//! Extraction orchestration
//!
//! For every located store, in locator order: snapshot it, read raw rows,
//! normalize them and drop the snapshot before moving to the next browser.
//! A failing browser contributes nothing and never stops the others; only
//! sink failures, cancellation and bad configuration abort a run.

use crate::artifacts::{self, CanonicalRecord, RecordContext};
use crate::browser::{self, ProfileLocation};
use crate::config::{ArtifactKind, ExtractionConfig};
use crate::cookies::{CookieOracle, NullOracle, OracleCache, OracleProvider};
use crate::error::{ForensicsError, Result};
use crate::i18n;
use crate::progress::{ProgressIndicator, ProgressReporter};
use crate::schema::{self, RawRow};
use crate::sink::RecordSink;
use crate::snapshot::Snapshot;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const PROGRESS_START: u8 = 0;
const PROGRESS_BROWSERS_FROM: usize = 10;
const PROGRESS_BROWSERS_SPAN: usize = 70;
const PROGRESS_WRITING: u8 = 80;
const PROGRESS_FINISHING: u8 = 95;
const PROGRESS_DONE: u8 = 100;

/// Cooperative cancellation flag shared between the caller and a run
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A store that was located but could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileFailure {
    pub browser: String,
    pub path: String,
    pub error: String,
}

/// Aggregate metadata of one run, written as the sink trailer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub module: String,
    pub records: usize,
    pub profiles_found: usize,
    pub profiles_read: usize,
    pub failures: Vec<ProfileFailure>,
    pub cancelled: bool,
    pub help: String,
    pub note: Option<String>,
    pub finished_at: String,
    pub version: String,
}

struct Collection {
    records: Vec<CanonicalRecord>,
    profiles_found: usize,
    profiles_read: usize,
    failures: Vec<ProfileFailure>,
    cancelled: bool,
}

/// Runs extractions over the profiles described by an [`ExtractionConfig`]
pub struct Extractor {
    config: ExtractionConfig,
    oracle: OracleCache,
    progress: Box<dyn ProgressReporter>,
    cancellation: CancellationToken,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            oracle: OracleCache::new(None),
            progress: Box::new(ProgressIndicator::new(false)),
            cancellation: CancellationToken::new(),
        }
    }

    /// Decrypt cookie values through `provider` when plaintext is empty.
    pub fn with_oracle(mut self, provider: Box<dyn OracleProvider>) -> Self {
        self.oracle = OracleCache::new(Some(provider));
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Every record of `kind` across all located profiles.
    ///
    /// A cancelled collection returns what was gathered so far.
    pub fn collect(&self, kind: ArtifactKind) -> Vec<CanonicalRecord> {
        self.gather(kind).records
    }

    /// Extract `kind` into `sink`: field table, records, then the summary.
    pub fn run(&self, kind: ArtifactKind, sink: &mut dyn RecordSink) -> Result<RunSummary> {
        self.config.validate()?;
        sink.declare(kind, artifacts::fields(kind))?;

        let collection = self.gather(kind);

        self.report(PROGRESS_WRITING, &i18n::message("progress-writing"));
        for record in &collection.records {
            sink.emit(record)?;
        }

        self.report(PROGRESS_FINISHING, &i18n::message("progress-finishing"));
        let summary = self.summarize(kind, &collection);
        sink.finish(&summary)?;

        if collection.cancelled {
            return Err(ForensicsError::Cancelled);
        }
        self.report(PROGRESS_DONE, &i18n::message("progress-done"));
        log::info!(
            "{}: {} records from {} of {} stores",
            kind,
            summary.records,
            summary.profiles_read,
            summary.profiles_found
        );
        Ok(summary)
    }

    fn gather(&self, kind: ArtifactKind) -> Collection {
        self.report(PROGRESS_START, &i18n::message("progress-start"));

        let locations = browser::locate(&self.config.config_root, kind, &self.config.browsers);
        let mut collection = Collection {
            records: Vec::new(),
            profiles_found: locations.len(),
            profiles_read: 0,
            failures: Vec::new(),
            cancelled: false,
        };

        for (index, location) in locations.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                log::warn!("{} extraction cancelled after {} stores", kind, index);
                collection.cancelled = true;
                break;
            }

            let percent = PROGRESS_BROWSERS_FROM + index * PROGRESS_BROWSERS_SPAN / locations.len();
            self.report(
                percent as u8,
                &i18n::message_with(
                    "progress-browser",
                    &[("browser", location.browser.display_name)],
                ),
            );

            match self.extract_location(location) {
                Ok(records) => {
                    log::debug!(
                        "{} {} records from {:?}",
                        records.len(),
                        kind,
                        location.path
                    );
                    collection.profiles_read += 1;
                    collection.records.extend(records);
                }
                Err(err) => {
                    log::warn!(
                        "Skipping {} {} at {:?}: {}",
                        location.browser.display_name,
                        kind,
                        location.path,
                        err
                    );
                    collection.failures.push(ProfileFailure {
                        browser: location.browser.display_name.to_string(),
                        path: location.path.display().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }
        collection
    }

    fn extract_location(&self, location: &ProfileLocation) -> Result<Vec<CanonicalRecord>> {
        if location.kind == ArtifactKind::Extensions {
            let rows = artifacts::extensions::read_rows(&location.path)?;
            return Ok(self.normalize_rows(&rows, location, &NullOracle));
        }

        let snapshot = Snapshot::acquire(&location.path, &self.config.scratch_dir)?;
        let rows = match artifacts::table_source(location.kind) {
            Some(source) => read_table(snapshot.path(), source)?,
            None => artifacts::bookmarks::read_rows(snapshot.path())?,
        };

        let records = if location.kind == ArtifactKind::Cookies {
            let oracle = self.oracle.oracle_for(location.browser, snapshot.path());
            self.normalize_rows(&rows, location, &oracle)
        } else {
            self.normalize_rows(&rows, location, &NullOracle)
        };
        drop(snapshot);
        Ok(records)
    }

    fn normalize_rows(
        &self,
        rows: &[RawRow],
        location: &ProfileLocation,
        oracle: &dyn CookieOracle,
    ) -> Vec<CanonicalRecord> {
        let ctx = RecordContext {
            username: &self.config.username,
            location,
            oracle,
        };
        rows.iter().map(|row| artifacts::normalize(row, &ctx)).collect()
    }

    fn summarize(&self, kind: ArtifactKind, collection: &Collection) -> RunSummary {
        let note = if collection.cancelled {
            Some(i18n::message("note-cancelled"))
        } else if kind == ArtifactKind::Cookies && !self.oracle.is_enabled() {
            Some(i18n::message("note-cookies-no-oracle"))
        } else {
            None
        };

        RunSummary {
            module: kind.id().to_string(),
            records: collection.records.len(),
            profiles_found: collection.profiles_found,
            profiles_read: collection.profiles_read,
            failures: collection.failures.clone(),
            cancelled: collection.cancelled,
            help: i18n::help_text(kind),
            note,
            finished_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
            version: crate::VERSION.to_string(),
        }
    }

    fn report(&self, percent: u8, message: &str) {
        if let Err(err) = self.progress.report(percent, message) {
            log::debug!("Progress update failed: {}", err);
        }
    }
}

/// Read every row of `source` from the SQLite file at `path`.
///
/// Rows whose shape does not match the projection are skipped.
fn read_table(path: &Path, source: artifacts::TableSource) -> Result<Vec<RawRow>> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    let columns = schema::table_columns(&conn, source.table)?;
    let query = schema::build_query(
        source.table,
        source.columns,
        columns.as_ref(),
        source.order_by,
    )?;
    if query.placeholder_count() > 0 {
        log::debug!(
            "{}: {} of {} columns missing, substituted with NULL",
            source.table,
            query.placeholder_count(),
            query.columns.len()
        );
    }

    let mut stmt = conn.prepare(&query.sql)?;
    let mut rows = stmt.query([])?;
    let mut raw_rows = Vec::new();
    while let Some(row) = rows.next()? {
        match RawRow::from_sql_row(row, &query) {
            Ok(raw) => raw_rows.push(raw),
            Err(err) => log::debug!("Skipping row of {}: {}", source.table, err),
        }
    }
    Ok(raw_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};

    struct RecordingProgress {
        steps: Rc<RefCell<Vec<u8>>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn report(&self, percent: u8, _message: &str) -> Result<()> {
            self.steps.borrow_mut().push(percent);
            Err(ForensicsError::Sink("progress display closed".to_string()))
        }
    }

    struct Fixture {
        root: TempDir,
        scratch: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                root: tempdir().expect("config root"),
                scratch: tempdir().expect("scratch dir"),
            }
        }

        fn profile(&self, browser: &str) -> std::path::PathBuf {
            let dir = self.root.path().join(browser).join("Default");
            fs::create_dir_all(&dir).expect("create profile");
            dir
        }

        fn history(&self, browser: &str, url: &str) {
            let conn = Connection::open(self.profile(browser).join("History")).expect("open");
            conn.execute_batch(
                "CREATE TABLE urls (id INTEGER PRIMARY KEY, url TEXT, title TEXT,
                    visit_count INTEGER, typed_count INTEGER, last_visit_time INTEGER);",
            )
            .expect("create urls");
            conn.execute(
                "INSERT INTO urls (url, title, visit_count, typed_count, last_visit_time)
                 VALUES (?1, 'Title', 5, 1, 13318267369295313)",
                [url],
            )
            .expect("insert url");
        }

        fn config(&self) -> ExtractionConfig {
            ExtractionConfig::new(self.root.path(), self.scratch.path()).with_username("analyst")
        }

        fn scratch_is_empty(&self) -> bool {
            fs::read_dir(self.scratch.path()).expect("read scratch").next().is_none()
        }
    }

    #[test]
    fn collects_across_browsers_in_catalog_order() {
        let fixture = Fixture::new();
        fixture.history("brave", "https://brave.example");
        fixture.history("google-chrome", "https://chrome.example");

        let records = Extractor::new(fixture.config()).collect(ArtifactKind::History);
        let browsers: Vec<_> = records.iter().map(|record| record.browser()).collect();
        assert_eq!(browsers, ["Google Chrome", "Brave"]);
        assert!(fixture.scratch_is_empty());
    }

    #[test]
    fn wal_mode_store_leaves_scratch_empty() {
        let fixture = Fixture::new();
        fixture.history("chromium", "https://wal.example");
        let conn =
            Connection::open(fixture.profile("chromium").join("History")).expect("open");
        let mode: String = conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .expect("wal mode");
        assert_eq!(mode, "wal");
        drop(conn);

        let records = Extractor::new(fixture.config()).collect(ArtifactKind::History);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].field("URL"),
            Some(artifacts::FieldValue::from("https://wal.example"))
        );
        assert!(fixture.scratch_is_empty());
    }

    #[test]
    fn corrupt_store_does_not_stop_other_browsers() {
        let fixture = Fixture::new();
        fs::write(fixture.profile("chromium").join("History"), b"not a database")
            .expect("write corrupt store");
        fixture.history("opera", "https://opera.example");

        let mut sink = MemorySink::new();
        let summary = Extractor::new(fixture.config())
            .run(ArtifactKind::History, &mut sink)
            .expect("run");
        assert_eq!(summary.records, 1);
        assert_eq!(summary.profiles_found, 2);
        assert_eq!(summary.profiles_read, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].browser, "Chromium");
        assert_eq!(sink.records.len(), 1);
        assert_eq!(sink.declared[0].0, ArtifactKind::History);
        assert!(fixture.scratch_is_empty());
    }

    #[test]
    fn missing_table_contributes_nothing() {
        let fixture = Fixture::new();
        fixture.history("chromium", "https://chromium.example");
        let mut sink = MemorySink::new();
        let summary = Extractor::new(fixture.config())
            .run(ArtifactKind::Downloads, &mut sink)
            .expect("run");
        assert_eq!(summary.records, 0);
        assert_eq!(summary.failures.len(), 1);
        assert!(sink.records.is_empty());
        assert_eq!(sink.summaries.len(), 1);
    }

    #[test]
    fn progress_follows_the_fixed_schedule_and_failures_are_ignored() {
        let fixture = Fixture::new();
        fixture.history("google-chrome", "https://a.example");
        fixture.history("chromium", "https://b.example");
        let steps = Rc::new(RefCell::new(Vec::new()));

        let mut sink = MemorySink::new();
        Extractor::new(fixture.config())
            .with_progress(Box::new(RecordingProgress {
                steps: Rc::clone(&steps),
            }))
            .run(ArtifactKind::History, &mut sink)
            .expect("run");
        assert_eq!(*steps.borrow(), [0, 10, 45, 80, 95, 100]);
    }

    #[test]
    fn cancelled_run_keeps_partial_output_and_reports_cancellation() {
        let fixture = Fixture::new();
        fixture.history("google-chrome", "https://a.example");
        let extractor = Extractor::new(fixture.config());
        extractor.cancellation_token().cancel();

        let mut sink = MemorySink::new();
        let result = extractor.run(ArtifactKind::History, &mut sink);
        assert!(matches!(result, Err(ForensicsError::Cancelled)));
        assert!(sink.records.is_empty());
        assert!(sink.summaries[0].cancelled);
        assert!(sink.summaries[0].note.is_some());
    }

    #[test]
    fn cookies_run_without_oracle_carries_a_note() {
        let fixture = Fixture::new();
        let conn = Connection::open(fixture.profile("chromium").join("Cookies")).expect("open");
        conn.execute_batch(
            "CREATE TABLE cookies (host_key TEXT, name TEXT, value TEXT, encrypted_value BLOB,
                path TEXT, creation_utc INTEGER, expires_utc INTEGER, last_access_utc INTEGER);
             INSERT INTO cookies VALUES ('.example.com', 'sid', 'plain', x'', '/', 0, 0, 0);",
        )
        .expect("create cookies");
        drop(conn);

        let mut sink = MemorySink::new();
        let summary = Extractor::new(fixture.config())
            .run(ArtifactKind::Cookies, &mut sink)
            .expect("run");
        assert_eq!(summary.records, 1);
        assert!(summary.note.is_some());
        assert_eq!(
            sink.records[0].field("CookieValue"),
            Some(artifacts::FieldValue::from("plain"))
        );
    }
}
