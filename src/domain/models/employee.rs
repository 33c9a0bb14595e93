//! Employee identity records held by the directory store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An identity record as extracted from a roster row.
///
/// `employee_id` is the stable business key. Re-ingesting the same id
/// overwrites every other field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Stable employee identifier (unique in the store)
    pub employee_id: String,
    /// Second identity credential, e.g. a national identifier
    pub secondary_id: String,
    /// Human readable name
    pub display_name: String,
    /// Department, when the roster carries one
    pub department: Option<String>,
    /// Job title, when the roster carries one
    pub title: Option<String>,
}

impl IdentityRecord {
    /// Build a record from raw cell text.
    ///
    /// Every value is trimmed. Returns `None` when any required field is empty
    /// after trimming. Blank optional fields become `None`.
    pub fn from_cells(
        employee_id: &str,
        secondary_id: &str,
        display_name: &str,
        department: Option<&str>,
        title: Option<&str>,
    ) -> Option<Self> {
        let employee_id = employee_id.trim();
        let secondary_id = secondary_id.trim();
        let display_name = display_name.trim();

        if employee_id.is_empty() || secondary_id.is_empty() || display_name.is_empty() {
            return None;
        }

        Some(Self {
            employee_id: employee_id.to_string(),
            secondary_id: secondary_id.to_string(),
            display_name: display_name.to_string(),
            department: non_blank(department),
            title: non_blank(title),
        })
    }

    /// Create a record with only the required fields.
    pub fn new(
        employee_id: impl Into<String>,
        secondary_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            secondary_id: secondary_id.into(),
            display_name: display_name.into(),
            department: None,
            title: None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// A stored identity record with bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    #[serde(flatten)]
    pub identity: IdentityRecord,
    /// First time the id was seen
    pub created_at: DateTime<Utc>,
    /// Last time the id was (re)written
    pub updated_at: DateTime<Utc>,
}

/// Per-record outcome counts of a bulk upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertSummary {
    pub succeeded: u64,
    pub failed: u64,
}
