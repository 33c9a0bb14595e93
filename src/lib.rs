//! Payslip Intake - roster and payslip drop-directory ingestion
//!
//! Two independent polling loops consume files from a shared drop directory:
//! spreadsheet rosters are parsed and upserted into the employee directory,
//! and per-employee documents are validated against it. Handled files are
//! relocated to `processed/` or `invalid/`.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the port traits
//! - **Adapters** (`adapters`): `DirectoryStore` implementations (SQLite, in-memory)
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging,
//!   drop directory filesystem access, spreadsheet decoding
//! - **Service Layer** (`services`): ingestors, scheduler, offline migrator
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use payslip_intake::{
//!     DocumentIngestor, DropZone, IngestionScheduler, InMemoryDirectoryStore, IntakeConfig,
//!     RosterIngestor, SchedulerConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IntakeConfig::default();
//!     let store = Arc::new(InMemoryDirectoryStore::new());
//!     let zone = DropZone::new(&config.drop_dir);
//!     let roster = RosterIngestor::new(store.clone(), zone.clone(), config.roster.clone());
//!     let document = DocumentIngestor::new(store, zone, &config.document)?;
//!
//!     let scheduler = IngestionScheduler::new(
//!         Arc::new(roster),
//!         Arc::new(document),
//!         SchedulerConfig::from(&config),
//!     );
//!     scheduler.start().await;
//!     tokio::signal::ctrl_c().await?;
//!     scheduler.stop().await;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{InMemoryDirectoryStore, SqliteDirectoryStore};
pub use domain::errors::{DomainError, DomainResult, IngestError, SpreadsheetError};
pub use domain::models::{
    Config, Destination, DropFile, EmployeeRecord, FileKind, FileOutcome, IdentityRecord,
    IngestorState, IngestorStatus, IntakeConfig, ScanReport, ServiceState, ServiceStatus,
    UpsertSummary,
};
pub use domain::ports::{DirectoryStore, Ingestor};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::LoggerImpl;
pub use infrastructure::DropZone;
pub use services::{
    DocumentIngestor, IngestionScheduler, RosterIngestor, RosterMigrator, SchedulerConfig,
};
