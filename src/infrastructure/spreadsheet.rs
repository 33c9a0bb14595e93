//! Spreadsheet decoding backed by calamine.
//!
//! Decoding is synchronous; async callers go through [`load_first_worksheet`]
//! which moves the work onto the blocking pool.

use std::fmt;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};

use crate::domain::errors::SpreadsheetError;

/// A decoded cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    /// Excel serial date
    DateTime(f64),
    Error(String),
}

impl CellValue {
    /// Render the cell as text the way a user reading the sheet sees it.
    ///
    /// Whole floats render without a fractional part, so an id typed as
    /// `100` and stored as `100.0` reads back as `"100"`.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty | Self::Error(_) => String::new(),
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Number(f) | Self::DateTime(f) => format_number(*f),
            Self::Bool(b) => b.to_string(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::DateTime(_) => "datetime",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Self::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Self::Text(s.clone()),
            Data::Int(i) => Self::Integer(*i),
            Data::Float(f) => Self::Number(*f),
            Data::Bool(b) => Self::Bool(*b),
            Data::DateTime(dt) => Self::DateTime(dt.as_f64()),
            Data::Error(e) => Self::Error(e.to_string()),
        }
    }
}

/// The first worksheet of a workbook, split into a header row and data rows.
///
/// The header row is the sheet's first row, kept as written (no trimming).
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone)]
pub struct Worksheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Worksheet {
    /// Position of the column whose header equals `header` exactly.
    pub fn header_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Decode the first worksheet of the workbook at `path`.
pub fn read_first_worksheet(path: &Path) -> Result<Worksheet, SpreadsheetError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| SpreadsheetError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SpreadsheetError::NoWorksheet(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| SpreadsheetError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    // Positions are absolute so a sheet whose used range starts below the
    // first row still reads row 0 as the header row
    let Some((last_row, last_col)) = range.end() else {
        return Ok(Worksheet {
            name,
            headers: Vec::new(),
            rows: Vec::new(),
        });
    };

    let cell = |row: u32, col: u32| range.get_value((row, col)).map_or(CellValue::Empty, CellValue::from);

    let headers = (0..=last_col)
        .map(|col| cell(0, col).as_text())
        .collect();
    let rows = (1..=last_row)
        .map(|row| (0..=last_col).map(|col| cell(row, col)).collect())
        .collect();

    Ok(Worksheet { name, headers, rows })
}

/// Names of every sheet in the workbook, in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, SpreadsheetError> {
    let workbook = open_workbook_auto(path).map_err(|e| SpreadsheetError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(workbook.sheet_names())
}

/// Decode the first worksheet on the blocking pool.
pub async fn load_first_worksheet(path: PathBuf) -> Result<Worksheet, SpreadsheetError> {
    tokio::task::spawn_blocking(move || read_first_worksheet(&path))
        .await
        .map_err(|e| SpreadsheetError::Worker(e.to_string()))?
}
