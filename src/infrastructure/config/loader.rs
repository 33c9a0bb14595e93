use std::collections::HashSet;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {0}: must be greater than zero")]
    ZeroInterval(&'static str),

    #[error(
        "Invalid error_backoff_secs: {backoff} must be shorter than both poll intervals (roster {roster}, document {document})"
    )]
    BackoffTooLong { backoff: u64, roster: u64, document: u64 },

    #[error("Drop directory cannot be empty")]
    EmptyDropDir,

    #[error("Invalid roster column configuration: {0}")]
    InvalidColumns(String),

    #[error("Invalid extension configuration: {0}")]
    InvalidExtensions(String),

    #[error("Document prefix cannot be empty")]
    EmptyDocumentPrefix,

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Directory holding project configuration and the default database
pub const CONFIG_DIR: &str = ".payslip-intake";

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .payslip-intake/config.yaml (project config, created by init)
    /// 3. .payslip-intake/local.yaml (project local overrides, optional)
    /// 4. Environment variables (PAYSLIP_INTAKE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(format!("{CONFIG_DIR}/config.yaml")))
            .merge(Yaml::file(format!("{CONFIG_DIR}/local.yaml")))
            .merge(Env::prefixed("PAYSLIP_INTAKE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override the file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("PAYSLIP_INTAKE_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let intake = &config.intake;

        if intake.drop_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDropDir);
        }

        if intake.roster_poll_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("roster_poll_interval_secs"));
        }
        if intake.document_poll_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("document_poll_interval_secs"));
        }
        if intake.error_backoff_secs == 0 {
            return Err(ConfigError::ZeroInterval("error_backoff_secs"));
        }
        if intake.error_backoff_secs >= intake.roster_poll_interval_secs
            || intake.error_backoff_secs >= intake.document_poll_interval_secs
        {
            return Err(ConfigError::BackoffTooLong {
                backoff: intake.error_backoff_secs,
                roster: intake.roster_poll_interval_secs,
                document: intake.document_poll_interval_secs,
            });
        }

        // Required and optional column headers must be distinct and non-empty
        let roster = &intake.roster;
        let mut headers = vec![
            roster.employee_id_column.as_str(),
            roster.secondary_id_column.as_str(),
            roster.display_name_column.as_str(),
        ];
        headers.extend(roster.department_column.as_deref());
        headers.extend(roster.title_column.as_deref());
        if headers.iter().any(|h| h.is_empty()) {
            return Err(ConfigError::InvalidColumns(
                "column headers cannot be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(*header) {
                return Err(ConfigError::InvalidColumns(format!(
                    "column '{header}' is configured more than once"
                )));
            }
        }

        // Each loop must own a disjoint set of files
        if roster.extensions.is_empty() {
            return Err(ConfigError::InvalidExtensions(
                "at least one roster extension is required".to_string(),
            ));
        }
        let document_extension = intake.document.extension.trim_start_matches('.');
        if document_extension.is_empty() {
            return Err(ConfigError::InvalidExtensions(
                "document extension cannot be empty".to_string(),
            ));
        }
        for ext in &roster.extensions {
            let ext = ext.trim_start_matches('.');
            if ext.is_empty() {
                return Err(ConfigError::InvalidExtensions(
                    "roster extensions cannot be empty".to_string(),
                ));
            }
            if ext.eq_ignore_ascii_case(document_extension) {
                return Err(ConfigError::InvalidExtensions(format!(
                    "'{ext}' is configured for both rosters and documents"
                )));
            }
        }

        if intake.document.prefix.is_empty() {
            return Err(ConfigError::EmptyDocumentPrefix);
        }

        // Validate database config
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}
