//! Common test utilities for integration tests
//!
//! Provides drop directory fixtures, roster workbooks and directory stores
//! that fail on demand.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use payslip_intake::domain::models::{DocumentConfig, RosterConfig};
use payslip_intake::{
    DirectoryStore, DocumentIngestor, DomainError, DomainResult, DropZone, EmployeeRecord,
    IdentityRecord, InMemoryDirectoryStore, IngestionScheduler, RosterIngestor, ServiceStatus,
    UpsertSummary,
};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Wait for a condition to be true with timeout
///
/// Polls the predicate every 10ms until it returns true or timeout is reached.
pub async fn wait_for<F>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    false
}

/// Wait until the scheduler status satisfies `predicate`.
pub async fn wait_for_status<F>(scheduler: &IngestionScheduler, mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut(&ServiceStatus) -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate(&scheduler.status().await) {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    false
}

/// Write a single-sheet workbook. Empty strings leave the cell blank.
pub fn write_roster(path: &Path, headers: &[&str], rows: &[&[&str]]) -> PathBuf {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .expect("Failed to write header");
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                sheet
                    .write_string(row_idx as u32 + 1, col as u16, *value)
                    .expect("Failed to write cell");
            }
        }
    }

    workbook.save(path).expect("Failed to save workbook");
    path.to_path_buf()
}

/// Write a placeholder document file into the drop directory.
pub fn write_document(drop_dir: &Path, name: &str) -> PathBuf {
    let path = drop_dir.join(name);
    std::fs::write(&path, b"%PDF-1.4 test document").expect("Failed to write document");
    path
}

/// Names of regular files directly under `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// A drop directory with a roster and a document ingestor over one store.
pub struct Harness {
    pub dir: TempDir,
    pub store: Arc<dyn DirectoryStore>,
    pub roster: RosterIngestor,
    pub document: DocumentIngestor,
}

impl Harness {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        let dir = temp_dir();
        let zone = DropZone::new(dir.path());
        Self {
            roster: RosterIngestor::new(store.clone(), zone.clone(), RosterConfig::default()),
            document: DocumentIngestor::new(store.clone(), zone, &DocumentConfig::default())
                .expect("default document pattern compiles"),
            dir,
            store,
        }
    }

    pub fn with_employees(ids: &[&str]) -> Self {
        let records = ids
            .iter()
            .map(|id| IdentityRecord::new(*id, format!("N-{id}"), format!("Employee {id}")));
        Self::new(Arc::new(InMemoryDirectoryStore::with_records(records)))
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn processed(&self) -> PathBuf {
        self.root().join("processed")
    }

    pub fn invalid(&self) -> PathBuf {
        self.root().join("invalid")
    }
}

/// Directory store whose calls can be made to fail.
///
/// Lookups of ids in `failing_ids` fail; every call fails while `offline`
/// is set. Everything else is delegated to an in-memory store.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryDirectoryStore,
    failing_ids: HashSet<String>,
    offline: AtomicBool,
    upsert_calls: AtomicU32,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = IdentityRecord>) -> Self {
        Self {
            inner: InMemoryDirectoryStore::with_records(records),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, ids: &[&str]) -> Self {
        self.failing_ids = ids.iter().map(|id| (*id).to_string()).collect();
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn upsert_calls(&self) -> u32 {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    fn check(&self, id: Option<&str>) -> DomainResult<()> {
        if self.offline.load(Ordering::SeqCst) || id.is_some_and(|id| self.failing_ids.contains(id)) {
            return Err(DomainError::DatabaseError("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for FlakyStore {
    async fn lookup(&self, employee_id: &str) -> DomainResult<Option<EmployeeRecord>> {
        self.check(Some(employee_id))?;
        self.inner.lookup(employee_id).await
    }

    async fn lookup_by_secondary_id(&self, secondary_id: &str) -> DomainResult<Option<EmployeeRecord>> {
        self.check(None)?;
        self.inner.lookup_by_secondary_id(secondary_id).await
    }

    async fn bulk_upsert(&self, records: &[IdentityRecord]) -> DomainResult<UpsertSummary> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.check(None)?;
        self.inner.bulk_upsert(records).await
    }

    async fn count(&self) -> DomainResult<u64> {
        self.check(None)?;
        self.inner.count().await
    }
}
