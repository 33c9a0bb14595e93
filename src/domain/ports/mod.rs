//! Port trait definitions (Hexagonal Architecture)
//!
//! - `DirectoryStore`: persistent employee identity records
//! - `Ingestor`: a drop-directory consumer run by the scheduler

pub mod directory_store;
pub mod ingestor;

pub use directory_store::DirectoryStore;
pub use ingestor::Ingestor;
