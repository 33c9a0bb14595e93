//! Service and ingestor status exposed through the control surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::drop_file::FileKind;

/// Overall scheduler lifecycle.
///
/// `stopped -> starting -> running -> stopping -> stopped`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl ServiceState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}

/// Per-loop state.
///
/// `idle -> processing -> idle`, or `processing -> error -> (backoff) -> idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestorState {
    #[default]
    Idle,
    Processing,
    Error,
}

impl IngestorState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Error => "error",
        }
    }
}

/// Status of one ingestor loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestorStatus {
    pub kind: FileKind,
    pub state: IngestorState,
    /// Files moved to `processed/` in this process lifetime
    pub lifetime_processed: u64,
    /// Files moved to `invalid/` in this process lifetime
    pub lifetime_rejected: u64,
    pub scans_completed: u64,
    pub consecutive_failures: u32,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl IngestorStatus {
    pub const fn new(kind: FileKind) -> Self {
        Self {
            kind,
            state: IngestorState::Idle,
            lifetime_processed: 0,
            lifetime_rejected: 0,
            scans_completed: 0,
            consecutive_failures: 0,
            last_scan_at: None,
            last_error: None,
        }
    }
}

/// Snapshot returned by `status()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub overall: ServiceState,
    pub ingestors: Vec<IngestorStatus>,
}

impl ServiceStatus {
    pub fn ingestor(&self, kind: FileKind) -> Option<&IngestorStatus> {
        self.ingestors.iter().find(|s| s.kind == kind)
    }
}
