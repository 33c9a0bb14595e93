//! Domain errors for the payslip intake system.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the directory store and other domain collaborators.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

/// Errors raised while scanning the drop directory or handling a single file.
///
/// A per-file error leaves the file where it is; the scan records it and
/// moves on to the next file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to list drop directory {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    #[error("Directory store failure: {0}")]
    Store(#[from] DomainError),

    #[error("Invalid filename pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Scan panicked: {0}")]
    Panicked(String),
}

impl IngestError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while decoding a spreadsheet.
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Failed to open workbook {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("Workbook {0} has no worksheets")]
    NoWorksheet(PathBuf),

    #[error("Failed to read worksheet in {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Spreadsheet worker failed: {0}")]
    Worker(String),
}
