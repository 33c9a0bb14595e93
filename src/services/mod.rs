//! Application services
//!
//! - `RosterIngestor` / `DocumentIngestor`: one scan pass over the drop directory
//! - `IngestionScheduler`: independent polling loops for both ingestors
//! - `RosterMigrator`: offline roster import with fuzzy header matching

pub mod document_ingestor;
pub mod ingestion_scheduler;
pub mod ledger;
pub mod roster_ingestor;
pub mod roster_migrator;

pub use document_ingestor::{DocumentIngestor, DocumentName, DocumentPattern};
pub use ingestion_scheduler::{IngestionScheduler, SchedulerConfig};
pub use ledger::ProcessedLedger;
pub use roster_ingestor::{ColumnMap, RosterIngestor};
pub use roster_migrator::{ExaminationReport, MigrationError, MigrationReport, RosterAnalysis, RosterMigrator};
