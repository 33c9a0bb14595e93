//! Files found in the drop directory.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of inbound file. Each kind is owned by exactly one ingestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Spreadsheet of employee identity records
    Roster,
    /// Per-employee document such as a payslip
    Document,
}

impl FileKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Roster => "roster",
            Self::Document => "document",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "roster" => Some(Self::Roster),
            "document" => Some(Self::Document),
            _ => None,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file sitting in the drop directory.
///
/// Never mutated in place; it is only moved to one of the [`Destination`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropFile {
    pub path: PathBuf,
    pub name: String,
    pub kind: FileKind,
}

/// Subtree of the drop directory a handled file is relocated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Processed,
    Invalid,
}

impl Destination {
    pub const fn dir_name(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Invalid => "invalid",
        }
    }
}
