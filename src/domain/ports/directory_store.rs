//! Directory store port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{EmployeeRecord, IdentityRecord, UpsertSummary};

/// Persistent store of employee identity records keyed by employee id.
///
/// Implementations are shared between both ingestor loops and any API
/// caller, so they must serialize concurrent access themselves.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Look up a record by employee id.
    async fn lookup(&self, employee_id: &str) -> DomainResult<Option<EmployeeRecord>>;

    /// Look up a record by secondary (national) id.
    async fn lookup_by_secondary_id(&self, secondary_id: &str)
        -> DomainResult<Option<EmployeeRecord>>;

    /// Insert or overwrite every record, in order.
    ///
    /// A failure on one record is counted and does not abort the batch, so
    /// a later duplicate id wins. An `Err` means the batch as a whole could
    /// not be attempted.
    async fn bulk_upsert(&self, records: &[IdentityRecord]) -> DomainResult<UpsertSummary>;

    /// Number of stored records.
    async fn count(&self) -> DomainResult<u64>;
}
