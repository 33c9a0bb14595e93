//! Results of a single ingestor scan pass.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::drop_file::FileKind;
use super::employee::UpsertSummary;

/// Why a document was moved to the `invalid` subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum RejectReason {
    /// Filename does not follow `<prefix>_<id>_<period>.<ext>`
    MalformedName,
    /// Embedded identifier is not in the directory store
    UnknownEmployee { employee_id: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedName => f.write_str("malformed filename"),
            Self::UnknownEmployee { employee_id } => write!(f, "unknown employee {employee_id}"),
        }
    }
}

/// Why a roster was left in the drop directory for a later scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum DeferReason {
    /// Header row lacks one or more required columns
    MissingColumns { columns: Vec<String> },
    /// No row carried all required fields
    NoValidRows { skipped_rows: u64 },
}

impl fmt::Display for DeferReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumns { columns } => {
                write!(f, "missing required columns: {}", columns.join(", "))
            }
            Self::NoValidRows { skipped_rows } => {
                write!(f, "no valid rows ({skipped_rows} skipped)")
            }
        }
    }
}

/// Outcome of handling one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum FileOutcome {
    /// Moved to `processed/`
    Accepted {
        /// Upsert counts (rosters only)
        upserted: Option<UpsertSummary>,
        /// Rows skipped for missing required fields (rosters only)
        skipped_rows: u64,
    },
    /// Moved to `invalid/`
    Rejected { reason: RejectReason },
    /// Left in place, not ledgered, retried next scan
    Deferred { reason: DeferReason },
    /// Store or filesystem failure; left in place
    Failed { error: String },
}

impl FileOutcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "accepted",
            Self::Rejected { .. } => "rejected",
            Self::Deferred { .. } => "deferred",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Accepted {
                upserted: Some(summary),
                skipped_rows,
            } => format!(
                "{} upserted, {} failed, {} rows skipped",
                summary.succeeded, summary.failed, skipped_rows
            ),
            Self::Accepted { upserted: None, .. } => String::new(),
            Self::Rejected { reason } => reason.to_string(),
            Self::Deferred { reason } => reason.to_string(),
            Self::Failed { error } => error.clone(),
        }
    }
}

/// A file and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Everything one scan pass did, in directory-listing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub kind: FileKind,
    pub started_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
}

impl ScanReport {
    pub fn new(kind: FileKind) -> Self {
        Self {
            kind,
            started_at: Utc::now(),
            files: Vec::new(),
        }
    }

    pub fn record(&mut self, name: impl Into<String>, outcome: FileOutcome) {
        self.files.push(FileReport {
            name: name.into(),
            outcome,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn accepted(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Accepted { .. }))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Rejected { .. }))
    }

    pub fn deferred(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Deferred { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    /// A scan with any failed file sends its loop into backoff.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Outcome recorded for `name`, if the file was handled in this pass.
    pub fn outcome_of(&self, name: &str) -> Option<&FileOutcome> {
        self.files.iter().find(|f| f.name == name).map(|f| &f.outcome)
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.outcome)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = ScanReport::new(FileKind::Document);
        report.record(
            "Payslip_E1_01.pdf",
            FileOutcome::Accepted {
                upserted: None,
                skipped_rows: 0,
            },
        );
        report.record(
            "Report_E1_01.pdf",
            FileOutcome::Rejected {
                reason: RejectReason::MalformedName,
            },
        );
        report.record(
            "Payslip_E2_01.pdf",
            FileOutcome::Failed {
                error: "disk full".to_string(),
            },
        );

        assert_eq!(report.accepted(), 1);
        assert_eq!(report.rejected(), 1);
        assert_eq!(report.deferred(), 0);
        assert_eq!(report.failed(), 1);
        assert!(report.has_failures());
        assert_eq!(report.outcome_of("Report_E1_01.pdf").map(FileOutcome::label), Some("rejected"));
        assert!(report.outcome_of("missing.pdf").is_none());
    }

    #[test]
    fn test_outcome_detail() {
        let outcome = FileOutcome::Deferred {
            reason: DeferReason::MissingColumns {
                columns: vec!["Name".to_string(), "National ID".to_string()],
            },
        };
        assert_eq!(outcome.detail(), "missing required columns: Name, National ID");

        let outcome = FileOutcome::Rejected {
            reason: RejectReason::UnknownEmployee {
                employee_id: "E404".to_string(),
            },
        };
        assert_eq!(outcome.detail(), "unknown employee E404");
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let report = FileReport {
            name: "Payslip_E1_01.pdf".to_string(),
            outcome: FileOutcome::Rejected {
                reason: RejectReason::MalformedName,
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["name"], "Payslip_E1_01.pdf");
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["reason"]["reason"], "malformed_name");
    }
}
