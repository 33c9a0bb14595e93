use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration structure for the intake service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Drop directory and polling configuration
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Drop directory and polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IntakeConfig {
    /// Directory polled for inbound files
    #[serde(default = "default_drop_dir")]
    pub drop_dir: PathBuf,

    /// Seconds between roster scans
    #[serde(default = "default_roster_poll_interval_secs")]
    pub roster_poll_interval_secs: u64,

    /// Seconds between document scans
    #[serde(default = "default_document_poll_interval_secs")]
    pub document_poll_interval_secs: u64,

    /// Seconds a loop waits after a failed scan
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    /// Roster file settings
    #[serde(default)]
    pub roster: RosterConfig,

    /// Document file settings
    #[serde(default)]
    pub document: DocumentConfig,
}

fn default_drop_dir() -> PathBuf {
    PathBuf::from("uploaded_payslips")
}

const fn default_roster_poll_interval_secs() -> u64 {
    30
}

const fn default_document_poll_interval_secs() -> u64 {
    60
}

const fn default_error_backoff_secs() -> u64 {
    10
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            drop_dir: default_drop_dir(),
            roster_poll_interval_secs: default_roster_poll_interval_secs(),
            document_poll_interval_secs: default_document_poll_interval_secs(),
            error_backoff_secs: default_error_backoff_secs(),
            roster: RosterConfig::default(),
            document: DocumentConfig::default(),
        }
    }
}

impl IntakeConfig {
    pub const fn roster_poll_interval(&self) -> Duration {
        Duration::from_secs(self.roster_poll_interval_secs)
    }

    pub const fn document_poll_interval(&self) -> Duration {
        Duration::from_secs(self.document_poll_interval_secs)
    }

    pub const fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

/// Roster (spreadsheet) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RosterConfig {
    /// Extensions treated as rosters, without the dot
    #[serde(default = "default_roster_extensions")]
    pub extensions: Vec<String>,

    /// Exact header of the employee id column
    #[serde(default = "default_employee_id_column")]
    pub employee_id_column: String,

    /// Exact header of the secondary (national) id column
    #[serde(default = "default_secondary_id_column")]
    pub secondary_id_column: String,

    /// Exact header of the display name column
    #[serde(default = "default_display_name_column")]
    pub display_name_column: String,

    /// Optional department column
    #[serde(default = "default_department_column")]
    pub department_column: Option<String>,

    /// Optional job title column
    #[serde(default = "default_title_column")]
    pub title_column: Option<String>,
}

fn default_roster_extensions() -> Vec<String> {
    vec!["xlsx".to_string(), "xlsm".to_string()]
}

fn default_employee_id_column() -> String {
    "Emp ID".to_string()
}

fn default_secondary_id_column() -> String {
    "National ID".to_string()
}

fn default_display_name_column() -> String {
    "Name".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_department_column() -> Option<String> {
    Some("Department".to_string())
}

#[allow(clippy::unnecessary_wraps)]
fn default_title_column() -> Option<String> {
    Some("Position".to_string())
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            extensions: default_roster_extensions(),
            employee_id_column: default_employee_id_column(),
            secondary_id_column: default_secondary_id_column(),
            display_name_column: default_display_name_column(),
            department_column: default_department_column(),
            title_column: default_title_column(),
        }
    }
}

/// Per-employee document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DocumentConfig {
    /// Literal filename prefix, e.g. `Payslip` in `Payslip_<id>_<period>.pdf`
    #[serde(default = "default_document_prefix")]
    pub prefix: String,

    /// Document extension, without the dot
    #[serde(default = "default_document_extension")]
    pub extension: String,
}

fn default_document_prefix() -> String {
    "Payslip".to_string()
}

fn default_document_extension() -> String {
    "pdf".to_string()
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            prefix: default_document_prefix(),
            extension: default_document_extension(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".payslip-intake/directory.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for rolling log files (stdout only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation policy for file output
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}
