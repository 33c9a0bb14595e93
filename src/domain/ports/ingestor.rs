//! Ingestor port driven by the scheduler.

use async_trait::async_trait;

use crate::domain::errors::IngestError;
use crate::domain::models::{FileKind, ScanReport};

/// One kind of drop-directory consumer.
///
/// `scan` handles every eligible file it sees at the start of the pass
/// before returning. Per-file failures are recorded in the report; an `Err`
/// means the pass could not run at all.
#[async_trait]
pub trait Ingestor: Send + Sync {
    fn kind(&self) -> FileKind;

    async fn scan(&self) -> Result<ScanReport, IngestError>;
}
