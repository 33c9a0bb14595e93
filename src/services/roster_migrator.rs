//! Offline roster import and inspection.
//!
//! Unlike the live roster loop, the migrator locates columns by fuzzy
//! header matching and enforces minimum field lengths. It is driven from
//! the command line against a single workbook.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::domain::errors::{DomainError, SpreadsheetError};
use crate::domain::models::IdentityRecord;
use crate::domain::ports::DirectoryStore;
use crate::infrastructure::spreadsheet::{self, Worksheet};

const EMPLOYEE_ID_PATTERNS: &[&str] = &["emp id", "employee id", "hrid", "hr id", "employee_id", "emp_id"];
const SECONDARY_ID_PATTERNS: &[&str] = &["national id", "nid", "national_id", "id number", "national_number"];
const NAME_PATTERNS: &[&str] = &["name", "employee name", "employee_name", "full name", "full_name"];

const MIN_EMPLOYEE_ID_LEN: usize = 3;
const MIN_SECONDARY_ID_LEN: usize = 5;
const MIN_NAME_LEN: usize = 2;

/// Headers `examine` reports as employee related.
const EMPLOYEE_HEADER_HINTS: &[&str] = &["emp id", "employee id", "hrid", "national id", "nid", "name", "employee name"];

const SAMPLE_ROWS: usize = 5;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No valid employee rows extracted ({skipped_rows} rows skipped)")]
    NoValidRows { skipped_rows: u64 },

    #[error("Directory store failure: {0}")]
    Store(#[from] DomainError),
}

/// Column positions found by fuzzy header matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FuzzyMapping {
    pub employee_id: Option<usize>,
    pub secondary_id: Option<usize>,
    pub name: Option<usize>,
}

impl FuzzyMapping {
    /// Match each lower-cased, trimmed header against the pattern lists.
    ///
    /// A header is assigned to the first field whose patterns it contains,
    /// checked in the order employee id, secondary id, name. A later header
    /// matching the same field replaces the earlier one.
    pub fn detect(headers: &[String]) -> Self {
        let mut mapping = Self::default();
        for (idx, header) in headers.iter().enumerate() {
            let header = header.trim().to_lowercase();
            let matches = |patterns: &[&str]| patterns.iter().any(|p| header.contains(p));

            if matches(EMPLOYEE_ID_PATTERNS) {
                mapping.employee_id = Some(idx);
            } else if matches(SECONDARY_ID_PATTERNS) {
                mapping.secondary_id = Some(idx);
            } else if matches(NAME_PATTERNS) {
                mapping.name = Some(idx);
            }
        }
        mapping
    }

    pub fn missing(&self) -> Vec<String> {
        [
            ("employee_id", self.employee_id),
            ("secondary_id", self.secondary_id),
            ("name", self.name),
        ]
        .into_iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(field, _)| field.to_string())
        .collect()
    }
}

/// Structure of a workbook as seen by the migrator.
#[derive(Debug, Clone, Serialize)]
pub struct RosterAnalysis {
    pub file: PathBuf,
    pub sheet_name: String,
    pub data_rows: usize,
    pub headers: Vec<String>,
    pub mapping: FuzzyMapping,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub file: PathBuf,
    pub extracted: usize,
    pub skipped_rows: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl MigrationReport {
    /// Percentage of extracted records stored successfully.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.extracted == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.extracted as f64 * 100.0
        }
    }
}

/// Extract records using a fuzzy mapping.
///
/// Rows need every mapped field and the minimum field lengths; the rest are
/// skipped and counted.
pub fn extract(sheet: &Worksheet, mapping: &FuzzyMapping) -> Result<(Vec<IdentityRecord>, u64), MigrationError> {
    let (Some(id_col), Some(secondary_col), Some(name_col)) =
        (mapping.employee_id, mapping.secondary_id, mapping.name)
    else {
        return Err(MigrationError::MissingColumns(mapping.missing()));
    };

    let mut records = Vec::new();
    let mut skipped = 0u64;

    for (offset, row) in sheet.rows.iter().enumerate() {
        let cell = |idx: usize| row.get(idx).map(|c| c.as_text()).unwrap_or_default();
        let record = IdentityRecord::from_cells(&cell(id_col), &cell(secondary_col), &cell(name_col), None, None)
            .filter(|r| {
                r.employee_id.chars().count() >= MIN_EMPLOYEE_ID_LEN
                    && r.secondary_id.chars().count() >= MIN_SECONDARY_ID_LEN
                    && r.display_name.chars().count() >= MIN_NAME_LEN
            });

        match record {
            Some(record) => records.push(record),
            None => {
                // Worksheet row 0 is the header row
                tracing::debug!(row = offset + 2, "skipping roster row with missing or short fields");
                skipped += 1;
            }
        }
    }

    Ok((records, skipped))
}

pub struct RosterMigrator {
    store: Arc<dyn DirectoryStore>,
}

impl RosterMigrator {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    pub async fn analyze(path: &Path) -> Result<RosterAnalysis, MigrationError> {
        let sheet = spreadsheet::load_first_worksheet(path.to_path_buf()).await?;
        let mapping = FuzzyMapping::detect(&sheet.headers);

        tracing::info!(
            file = %path.display(),
            sheet = %sheet.name,
            rows = sheet.row_count(),
            mapping = ?mapping,
            "analyzed roster structure"
        );
        Ok(RosterAnalysis {
            file: path.to_path_buf(),
            sheet_name: sheet.name,
            data_rows: sheet.rows.len(),
            headers: sheet.headers,
            mapping,
        })
    }

    /// Extract every valid row from `path` and bulk-upsert it.
    pub async fn migrate(&self, path: &Path) -> Result<MigrationReport, MigrationError> {
        let sheet = spreadsheet::load_first_worksheet(path.to_path_buf()).await?;
        let mapping = FuzzyMapping::detect(&sheet.headers);
        let (records, skipped_rows) = extract(&sheet, &mapping)?;

        if records.is_empty() {
            return Err(MigrationError::NoValidRows { skipped_rows });
        }

        let summary = self.store.bulk_upsert(&records).await?;
        let report = MigrationReport {
            file: path.to_path_buf(),
            extracted: records.len(),
            skipped_rows,
            succeeded: summary.succeeded,
            failed: summary.failed,
        };

        tracing::info!(
            file = %path.display(),
            extracted = report.extracted,
            skipped_rows,
            succeeded = report.succeeded,
            failed = report.failed,
            "roster migration completed"
        );
        Ok(report)
    }
}

/// What `examine` shows about a workbook.
#[derive(Debug, Clone, Serialize)]
pub struct ExaminationReport {
    pub file: PathBuf,
    pub sheet_names: Vec<String>,
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub data_rows: usize,
    pub sample_rows: Vec<Vec<String>>,
    /// `(header, cell type)` for the first data row
    pub column_types: Vec<(String, String)>,
    pub employee_columns: Vec<String>,
}

pub async fn examine(path: &Path) -> Result<ExaminationReport, SpreadsheetError> {
    let owned = path.to_path_buf();
    let (sheet_names, sheet) = tokio::task::spawn_blocking(move || {
        Ok::<_, SpreadsheetError>((
            spreadsheet::sheet_names(&owned)?,
            spreadsheet::read_first_worksheet(&owned)?,
        ))
    })
    .await
    .map_err(|e| SpreadsheetError::Worker(e.to_string()))??;

    let sample_rows = sheet
        .rows
        .iter()
        .take(SAMPLE_ROWS)
        .map(|row| row.iter().map(|c| c.as_text()).collect())
        .collect();

    let column_types = sheet
        .rows
        .first()
        .map(|row| {
            sheet
                .headers
                .iter()
                .zip(row)
                .map(|(header, cell)| (header.clone(), cell.type_name().to_string()))
                .collect()
        })
        .unwrap_or_default();

    let employee_columns = sheet
        .headers
        .iter()
        .filter(|h| {
            let lower = h.to_lowercase();
            EMPLOYEE_HEADER_HINTS.iter().any(|hint| lower.contains(hint))
        })
        .cloned()
        .collect();

    Ok(ExaminationReport {
        file: path.to_path_buf(),
        sheet_names,
        sheet_name: sheet.name,
        data_rows: sheet.rows.len(),
        headers: sheet.headers,
        sample_rows,
        column_types,
        employee_columns,
    })
}
