//! In-memory record of files an ingestor already handled.
//!
//! The ledger lives for the process lifetime only and is rebuilt empty on
//! restart. It only saves redundant work: a file that was moved out of the
//! drop directory is invisible to the next listing anyway, so correctness
//! never depends on it.

use std::collections::HashSet;

/// Names of files already moved to `processed/` or `invalid/`.
#[derive(Debug, Default)]
pub struct ProcessedLedger {
    names: HashSet<String>,
}

impl ProcessedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn record(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }
}
