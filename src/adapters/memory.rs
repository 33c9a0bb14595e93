//! In-memory DirectoryStore for tests and dry runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::errors::DomainResult;
use crate::domain::models::{EmployeeRecord, IdentityRecord, UpsertSummary};
use crate::domain::ports::DirectoryStore;

#[derive(Default)]
pub struct InMemoryDirectoryStore {
    records: RwLock<HashMap<String, EmployeeRecord>>,
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`.
    pub fn with_records(records: impl IntoIterator<Item = IdentityRecord>) -> Self {
        let now = Utc::now();
        let records = records
            .into_iter()
            .map(|identity| {
                (
                    identity.employee_id.clone(),
                    EmployeeRecord {
                        identity,
                        created_at: now,
                        updated_at: now,
                    },
                )
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn lookup(&self, employee_id: &str) -> DomainResult<Option<EmployeeRecord>> {
        Ok(self.records.read().await.get(employee_id).cloned())
    }

    async fn lookup_by_secondary_id(&self, secondary_id: &str) -> DomainResult<Option<EmployeeRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.identity.secondary_id == secondary_id)
            .max_by_key(|r| r.updated_at)
            .cloned())
    }

    async fn bulk_upsert(&self, records: &[IdentityRecord]) -> DomainResult<UpsertSummary> {
        let mut stored = self.records.write().await;
        let mut summary = UpsertSummary::default();

        for record in records {
            let now = Utc::now();
            stored
                .entry(record.employee_id.clone())
                .and_modify(|existing| {
                    existing.identity = record.clone();
                    existing.updated_at = now;
                })
                .or_insert_with(|| EmployeeRecord {
                    identity: record.clone(),
                    created_at: now,
                    updated_at: now,
                });
            summary.succeeded += 1;
        }

        Ok(summary)
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_ids_last_write_wins() {
        let store = InMemoryDirectoryStore::new();
        let summary = store
            .bulk_upsert(&[
                IdentityRecord::new("E1", "N1", "First"),
                IdentityRecord::new("E1", "N2", "Second"),
            ])
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(store.count().await.unwrap(), 1);
        let record = store.lookup("E1").await.unwrap().unwrap();
        assert_eq!(record.identity.display_name, "Second");
        assert_eq!(record.identity.secondary_id, "N2");
    }

    #[tokio::test]
    async fn test_with_records() {
        let store = InMemoryDirectoryStore::with_records([IdentityRecord::new("E100", "N900", "Jane Doe")]);
        assert!(store.lookup("E100").await.unwrap().is_some());
        assert_eq!(
            store.lookup_by_secondary_id("N900").await.unwrap().map(|r| r.identity.employee_id),
            Some("E100".to_string())
        );
    }
}
