//! Domain layer for the intake service
//!
//! Core models, errors and the ports the ingestion pipeline talks through.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, IngestError, SpreadsheetError};
