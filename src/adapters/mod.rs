//! Adapters implementing the domain ports.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryDirectoryStore;
pub use sqlite::SqliteDirectoryStore;
