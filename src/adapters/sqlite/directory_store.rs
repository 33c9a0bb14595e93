//! SQLite implementation of the DirectoryStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EmployeeRecord, IdentityRecord, UpsertSummary};
use crate::domain::ports::DirectoryStore;

/// SQLite-backed [`DirectoryStore`].
pub struct SqliteDirectoryStore {
    pool: SqlitePool,
}

impl SqliteDirectoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const UPSERT_SQL: &str = r#"INSERT INTO employees (employee_id, secondary_id, display_name, department, title, created_at, updated_at)
   VALUES (?, ?, ?, ?, ?, ?, ?)
   ON CONFLICT(employee_id) DO UPDATE SET
       secondary_id = excluded.secondary_id,
       display_name = excluded.display_name,
       department = excluded.department,
       title = excluded.title,
       updated_at = excluded.updated_at"#;

#[async_trait]
impl DirectoryStore for SqliteDirectoryStore {
    async fn lookup(&self, employee_id: &str) -> DomainResult<Option<EmployeeRecord>> {
        let row: Option<EmployeeRow> = sqlx::query_as(
            "SELECT * FROM employees WHERE employee_id = ?"
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn lookup_by_secondary_id(&self, secondary_id: &str) -> DomainResult<Option<EmployeeRecord>> {
        let row: Option<EmployeeRow> = sqlx::query_as(
            "SELECT * FROM employees WHERE secondary_id = ? ORDER BY updated_at DESC LIMIT 1"
        )
        .bind(secondary_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn bulk_upsert(&self, records: &[IdentityRecord]) -> DomainResult<UpsertSummary> {
        let mut summary = UpsertSummary::default();
        let mut tx = self.pool.begin().await?;

        for record in records {
            let now = Utc::now().to_rfc3339();
            let result = sqlx::query(UPSERT_SQL)
                .bind(&record.employee_id)
                .bind(&record.secondary_id)
                .bind(&record.display_name)
                .bind(&record.department)
                .bind(&record.title)
                .bind(&now)
                .bind(&now)
                .execute(&mut *tx)
                .await;

            match result {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    tracing::error!(employee_id = %record.employee_id, error = %e, "failed to upsert employee");
                    summary.failed += 1;
                }
            }
        }

        tx.commit().await?;

        tracing::debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "bulk upsert completed"
        );
        Ok(summary)
    }

    async fn count(&self) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;
        u64::try_from(count).map_err(|e| DomainError::SerializationError(e.to_string()))
    }
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    employee_id: String,
    secondary_id: String,
    display_name: String,
    department: Option<String>,
    title: Option<String>,
    created_at: String,
    updated_at: String,
}

fn parse_timestamp(s: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

impl TryFrom<EmployeeRow> for EmployeeRecord {
    type Error = DomainError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(EmployeeRecord {
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            identity: IdentityRecord {
                employee_id: row.employee_id,
                secondary_id: row.secondary_id,
                display_name: row.display_name,
                department: row.department,
                title: row.title,
            },
        })
    }
}
