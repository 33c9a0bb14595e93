//! Spreadsheet roster ingestion.
//!
//! Each roster's first worksheet is read with its first row as headers. The
//! three required columns are matched by exact header text. Valid rows are
//! bulk-upserted in one call and the file moves to `processed/`. A roster
//! with missing columns or no valid rows stays in the drop directory and is
//! retried on the next scan.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::errors::IngestError;
use crate::domain::models::{
    DeferReason, Destination, DropFile, FileKind, FileOutcome, IdentityRecord, RosterConfig,
    ScanReport,
};
use crate::domain::ports::{DirectoryStore, Ingestor};
use crate::infrastructure::spreadsheet::{load_first_worksheet, Worksheet};
use crate::infrastructure::DropZone;
use crate::services::ledger::ProcessedLedger;

/// Column positions resolved against one worksheet's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub employee_id: usize,
    pub secondary_id: usize,
    pub display_name: usize,
    pub department: Option<usize>,
    pub title: Option<usize>,
}

impl ColumnMap {
    /// Resolve configured headers by exact match.
    ///
    /// Returns the names of the required columns that are absent.
    pub fn resolve(sheet: &Worksheet, config: &RosterConfig) -> Result<Self, Vec<String>> {
        let required = [
            &config.employee_id_column,
            &config.secondary_id_column,
            &config.display_name_column,
        ];
        let positions: Vec<Option<usize>> = required.iter().map(|h| sheet.header_index(h)).collect();

        let missing: Vec<String> = required
            .iter()
            .zip(&positions)
            .filter(|(_, pos)| pos.is_none())
            .map(|(header, _)| (*header).clone())
            .collect();

        match positions.as_slice() {
            [Some(employee_id), Some(secondary_id), Some(display_name)] => Ok(Self {
                employee_id: *employee_id,
                secondary_id: *secondary_id,
                display_name: *display_name,
                department: config.department_column.as_deref().and_then(|h| sheet.header_index(h)),
                title: config.title_column.as_deref().and_then(|h| sheet.header_index(h)),
            }),
            _ => Err(missing),
        }
    }
}

/// Extract valid records in row order.
///
/// Returns the records and the number of rows skipped because a required
/// cell was empty after trimming.
pub fn extract_records(sheet: &Worksheet, columns: &ColumnMap) -> (Vec<IdentityRecord>, u64) {
    let mut records = Vec::with_capacity(sheet.rows.len());
    let mut skipped = 0u64;

    for row in &sheet.rows {
        let text = |idx: usize| row.get(idx).map(|c| c.as_text()).unwrap_or_default();
        let optional = |idx: Option<usize>| idx.map(text);

        let department = optional(columns.department);
        let title = optional(columns.title);
        match IdentityRecord::from_cells(
            &text(columns.employee_id),
            &text(columns.secondary_id),
            &text(columns.display_name),
            department.as_deref(),
            title.as_deref(),
        ) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    (records, skipped)
}

/// Loads roster workbooks from the drop directory into the employee directory.
pub struct RosterIngestor {
    store: Arc<dyn DirectoryStore>,
    drop_zone: DropZone,
    config: RosterConfig,
    ledger: Mutex<ProcessedLedger>,
}

impl RosterIngestor {
    pub fn new(store: Arc<dyn DirectoryStore>, drop_zone: DropZone, config: RosterConfig) -> Self {
        Self {
            store,
            drop_zone,
            config,
            ledger: Mutex::new(ProcessedLedger::new()),
        }
    }

    /// Whether `name` was already handled in this process lifetime.
    pub fn is_ledgered(&self, name: &str) -> bool {
        self.ledger().contains(name)
    }

    fn ledger(&self) -> MutexGuard<'_, ProcessedLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn ingest(&self, file: &DropFile) -> Result<FileOutcome, IngestError> {
        let sheet = load_first_worksheet(file.path.clone()).await?;

        let columns = match ColumnMap::resolve(&sheet, &self.config) {
            Ok(columns) => columns,
            Err(missing) => {
                tracing::warn!(
                    file = %file.name,
                    missing = ?missing,
                    "roster is missing required columns, leaving it in place"
                );
                return Ok(FileOutcome::Deferred {
                    reason: DeferReason::MissingColumns { columns: missing },
                });
            }
        };

        let (records, skipped_rows) = extract_records(&sheet, &columns);
        if records.is_empty() {
            tracing::warn!(
                file = %file.name,
                skipped_rows,
                "roster has no valid rows, leaving it in place"
            );
            return Ok(FileOutcome::Deferred {
                reason: DeferReason::NoValidRows { skipped_rows },
            });
        }

        let summary = self.store.bulk_upsert(&records).await?;
        if summary.failed > 0 {
            tracing::warn!(
                file = %file.name,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "some roster rows were not stored"
            );
        }

        self.drop_zone.relocate(file, Destination::Processed).await?;
        self.ledger().record(&file.name);

        tracing::info!(
            file = %file.name,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped_rows,
            "roster ingested"
        );
        Ok(FileOutcome::Accepted {
            upserted: Some(summary),
            skipped_rows,
        })
    }
}

#[async_trait]
impl Ingestor for RosterIngestor {
    fn kind(&self) -> FileKind {
        FileKind::Roster
    }

    async fn scan(&self) -> Result<ScanReport, IngestError> {
        let mut report = ScanReport::new(FileKind::Roster);
        let files = self.drop_zone.list(FileKind::Roster, &self.config.extensions).await?;

        for file in files {
            if self.is_ledgered(&file.name) {
                continue;
            }

            let outcome = match self.ingest(&file).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(file = %file.name, error = %e, "failed to ingest roster");
                    FileOutcome::Failed { error: e.to_string() }
                }
            };
            report.record(file.name, outcome);
        }

        Ok(report)
    }
}
