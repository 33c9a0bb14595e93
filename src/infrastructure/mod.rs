//! Infrastructure layer module
//!
//! This module contains the adapters to the outside world that are not
//! directory stores:
//! - Configuration management
//! - Logging infrastructure
//! - Drop directory filesystem access
//! - Spreadsheet decoding

pub mod config;
pub mod drop_zone;
pub mod logging;
pub mod spreadsheet;

pub use drop_zone::DropZone;
pub use spreadsheet::{CellValue, Worksheet};
