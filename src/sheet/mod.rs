//! In-memory workbook grid
//!
//! Rows and columns are 1-based throughout, matching what users see in Excel.

pub mod headers;
pub mod xlsx;

pub use headers::{HeaderIndex, RowView};
pub use xlsx::{WorkbookStore, XlsxStore, load_workbook};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// A single cell value, reduced to what the updater reads and writes back
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date number
    DateTime(f64),
    /// Formula text without the leading `=`, plus the value Excel last computed
    Formula {
        formula: String,
        value: Box<CellValue>,
    },
}

impl CellValue {
    /// Trimmed display text; blank for empty cells
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::DateTime(serial) => format_date(*serial),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Formula { value, .. } => value.as_text(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Formula { value, .. } => value.is_blank(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Excel serial to `YYYY-MM-DD`, with the time appended when there is one
fn format_date(serial: f64) -> String {
    match serial_to_datetime(serial) {
        Some(dt) if serial.fract() == 0.0 => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format_number(serial),
    }
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let offset = TimeDelta::try_milliseconds((serial * 86_400_000.0).round() as i64)?;
    epoch.checked_add_signed(offset)
}

static EMPTY: CellValue = CellValue::Empty;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Build a sheet from row-major values starting at A1
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn cell(&self, row: u32, column: u32) -> &CellValue {
        if row == 0 || column == 0 {
            return &EMPTY;
        }
        self.rows
            .get(row as usize - 1)
            .and_then(|r| r.get(column as usize - 1))
            .unwrap_or(&EMPTY)
    }

    pub fn set_cell(&mut self, row: u32, column: u32, value: CellValue) {
        if row == 0 || column == 0 {
            return;
        }
        let (r, c) = (row as usize - 1, column as usize - 1);
        if self.rows.len() <= r {
            self.rows.resize_with(r + 1, Vec::new);
        }
        let cells = &mut self.rows[r];
        if cells.len() <= c {
            cells.resize(c + 1, CellValue::Empty);
        }
        cells[c] = value;
    }

    pub fn max_row(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn max_column(&self) -> u32 {
        self.rows.iter().map(Vec::len).max().unwrap_or(0) as u32
    }

    /// Non-empty cells as (row, column, value), 1-based
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, &CellValue)> {
        self.rows.iter().enumerate().flat_map(|(r, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, value)| **value != CellValue::Empty)
                .map(move |(c, value)| (r as u32 + 1, c as u32 + 1, value))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    active: usize,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets, active: 0 }
    }

    /// Single-sheet workbook, handy for tests
    pub fn with_sheet(sheet: Sheet) -> Self {
        Self::new(vec![sheet])
    }

    pub fn active_sheet(&self) -> &Sheet {
        &self.sheets[self.active]
    }

    pub fn active_sheet_mut(&mut self) -> &mut Sheet {
        &mut self.sheets[self.active]
    }
}
