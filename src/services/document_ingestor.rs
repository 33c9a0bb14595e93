//! Per-employee document ingestion.
//!
//! Documents are named `<prefix>_<employee id>_<two digit period>.<ext>`.
//! A well-formed name whose employee exists in the directory moves to
//! `processed/`; anything else moves to `invalid/`. Both outcomes are
//! ledgered so a file is flagged only once per process lifetime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use regex::Regex;

use crate::domain::errors::IngestError;
use crate::domain::models::{
    Destination, DocumentConfig, DropFile, FileKind, FileOutcome, RejectReason, ScanReport,
};
use crate::domain::ports::{DirectoryStore, Ingestor};
use crate::infrastructure::DropZone;
use crate::services::ledger::ProcessedLedger;

/// Fields embedded in a document filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName {
    pub employee_id: String,
    pub period: String,
}

/// Compiled filename pattern for one prefix and extension.
///
/// Prefix and extension match case-insensitively. The identifier is
/// captured greedily, so `Payslip_E100_12_07.pdf` yields `E100_12` with
/// period `07`.
#[derive(Debug, Clone)]
pub struct DocumentPattern {
    regex: Regex,
}

impl DocumentPattern {
    pub fn new(prefix: &str, extension: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"(?i)^{}_(.+)_([0-9]{{2}})\.{}$",
            regex::escape(prefix),
            regex::escape(extension.trim_start_matches('.'))
        );
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn from_config(config: &DocumentConfig) -> Result<Self, regex::Error> {
        Self::new(&config.prefix, &config.extension)
    }

    pub fn parse(&self, file_name: &str) -> Option<DocumentName> {
        let captures = self.regex.captures(file_name)?;
        Some(DocumentName {
            employee_id: captures[1].to_string(),
            period: captures[2].to_string(),
        })
    }
}

/// Moves well-named payslips for known employees to `processed/` and the rest to `invalid/`.
pub struct DocumentIngestor {
    store: Arc<dyn DirectoryStore>,
    drop_zone: DropZone,
    pattern: DocumentPattern,
    extensions: Vec<String>,
    ledger: Mutex<ProcessedLedger>,
}

impl DocumentIngestor {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        drop_zone: DropZone,
        config: &DocumentConfig,
    ) -> Result<Self, IngestError> {
        Ok(Self {
            store,
            drop_zone,
            pattern: DocumentPattern::from_config(config)?,
            extensions: vec![config.extension.clone()],
            ledger: Mutex::new(ProcessedLedger::new()),
        })
    }

    /// Whether `name` was already handled in this process lifetime.
    pub fn is_ledgered(&self, name: &str) -> bool {
        self.ledger().contains(name)
    }

    fn ledger(&self) -> MutexGuard<'_, ProcessedLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn reject(&self, file: &DropFile, reason: RejectReason) -> Result<FileOutcome, IngestError> {
        self.drop_zone.relocate(file, Destination::Invalid).await?;
        self.ledger().record(&file.name);

        tracing::warn!(file = %file.name, reason = %reason, "document rejected");
        Ok(FileOutcome::Rejected { reason })
    }

    async fn ingest(&self, file: &DropFile) -> Result<FileOutcome, IngestError> {
        let Some(document) = self.pattern.parse(&file.name) else {
            return self.reject(file, RejectReason::MalformedName).await;
        };

        if self.store.lookup(&document.employee_id).await?.is_none() {
            return self
                .reject(
                    file,
                    RejectReason::UnknownEmployee {
                        employee_id: document.employee_id,
                    },
                )
                .await;
        }

        self.drop_zone.relocate(file, Destination::Processed).await?;
        self.ledger().record(&file.name);

        tracing::info!(
            file = %file.name,
            employee_id = %document.employee_id,
            period = %document.period,
            "document accepted"
        );
        Ok(FileOutcome::Accepted {
            upserted: None,
            skipped_rows: 0,
        })
    }
}

#[async_trait]
impl Ingestor for DocumentIngestor {
    fn kind(&self) -> FileKind {
        FileKind::Document
    }

    async fn scan(&self) -> Result<ScanReport, IngestError> {
        let mut report = ScanReport::new(FileKind::Document);
        let files = self.drop_zone.list(FileKind::Document, &self.extensions).await?;

        for file in files {
            if self.is_ledgered(&file.name) {
                continue;
            }

            let outcome = match self.ingest(&file).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(file = %file.name, error = %e, "failed to ingest document");
                    FileOutcome::Failed { error: e.to_string() }
                }
            };
            report.record(file.name, outcome);
        }

        Ok(report)
    }
}
