//! CLI command implementations.

pub mod examine;
pub mod init;
pub mod lookup;
pub mod migrate;
pub mod run;
pub mod scan;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::sqlite::{initialize_database, PoolConfig};
use crate::adapters::SqliteDirectoryStore;
use crate::domain::models::Config;
use crate::infrastructure::DropZone;
use crate::services::{DocumentIngestor, RosterIngestor};

/// Open the configured database, applying pending migrations.
pub(crate) async fn open_store(config: &Config) -> Result<Arc<SqliteDirectoryStore>> {
    let pool = initialize_database(
        &config.database.url(),
        Some(PoolConfig::with_max_connections(config.database.max_connections)),
    )
    .await
    .with_context(|| format!("Failed to open database at {}", config.database.path))?;
    Ok(Arc::new(SqliteDirectoryStore::new(pool)))
}

/// Build both ingestors over one shared store and drop directory.
pub(crate) fn build_ingestors(
    config: &Config,
    store: Arc<SqliteDirectoryStore>,
) -> Result<(Arc<RosterIngestor>, Arc<DocumentIngestor>)> {
    let drop_zone = DropZone::new(&config.intake.drop_dir);
    let roster = RosterIngestor::new(store.clone(), drop_zone.clone(), config.intake.roster.clone());
    let document = DocumentIngestor::new(store, drop_zone, &config.intake.document)
        .context("Invalid document filename configuration")?;
    Ok((Arc::new(roster), Arc::new(document)))
}
