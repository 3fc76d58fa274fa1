use log::debug;
use std::collections::HashMap;

use super::{CellValue, Sheet};

/// Column positions keyed by trimmed header text.
///
/// Built by scanning the header row from column 1 and stopping at the first
/// blank cell, so any headers after a gap are ignored.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    order: Vec<String>,
    columns: HashMap<String, u32>,
    last_column: u32,
}

impl HeaderIndex {
    pub fn build(sheet: &Sheet, header_row: u32) -> Self {
        let mut index = HeaderIndex::default();

        for column in 1..=sheet.max_column() {
            let cell = sheet.cell(header_row, column);
            if cell.is_blank() {
                break;
            }

            let name = cell.as_text();
            debug!("Adding column {} for value {}", column, name);
            if index.columns.insert(name.clone(), column).is_none() {
                index.order.push(name);
            }
            index.last_column = column;
        }

        index
    }

    pub fn column(&self, name: &str) -> Option<u32> {
        self.columns.get(name.trim()).copied()
    }

    /// Header names in first-seen column order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// First column past the last header
    pub fn status_column(&self) -> u32 {
        self.last_column + 1
    }

    /// Trimmed cell text for `field` on `row`; empty when the column is unknown or the cell blank
    pub fn field_value(&self, sheet: &Sheet, row: u32, field: &str) -> String {
        match self.column(field) {
            Some(column) => sheet.cell(row, column).as_text(),
            None => String::new(),
        }
    }
}

/// One data row read through the header index
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    sheet: &'a Sheet,
    headers: &'a HeaderIndex,
    row: u32,
}

impl<'a> RowView<'a> {
    pub fn new(sheet: &'a Sheet, headers: &'a HeaderIndex, row: u32) -> Self {
        Self { sheet, headers, row }
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn get(&self, field: &str) -> String {
        self.headers.field_value(self.sheet, self.row, field)
    }

    /// (header, value) for every mapped column, in column order
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, String)> + 'a {
        let sheet = self.sheet;
        let headers = self.headers;
        let row = self.row;
        headers
            .names()
            .map(move |name| (name, headers.field_value(sheet, row, name)))
    }

    /// True when every mapped column is blank
    pub fn is_blank(&self) -> bool {
        self.headers.names().all(|name| {
            self.headers
                .column(name)
                .map(|column| self.sheet.cell(self.row, column).is_blank())
                .unwrap_or(true)
        })
    }

    pub fn status(&self) -> &'a CellValue {
        self.sheet.cell(self.row, self.headers.status_column())
    }
}
