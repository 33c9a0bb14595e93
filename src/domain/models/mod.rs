//! Domain models for the intake service.

pub mod config;
pub mod drop_file;
pub mod employee;
pub mod scan;
pub mod status;

pub use config::{
    Config, DatabaseConfig, DocumentConfig, IntakeConfig, LogFormat, LoggingConfig, RosterConfig,
    RotationPolicy,
};
pub use drop_file::{Destination, DropFile, FileKind};
pub use employee::{EmployeeRecord, IdentityRecord, UpsertSummary};
pub use scan::{DeferReason, FileOutcome, FileReport, RejectReason, ScanReport};
pub use status::{IngestorState, IngestorStatus, ServiceState, ServiceStatus};
