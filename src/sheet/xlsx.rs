use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, Xlsx, open_workbook};
use log::debug;
use rust_xlsxwriter::{Format, Formula};
use std::path::{Path, PathBuf};

use super::{CellValue, Sheet, Workbook};

/// Somewhere a workbook can be written back to
pub trait WorkbookStore {
    fn save(&mut self, workbook: &Workbook) -> Result<()>;
}

/// Load every sheet of an `.xlsx` file; the first sheet becomes the active one
pub fn load_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;
    let names = workbook.sheet_names().to_owned();

    if names.is_empty() {
        return Err(anyhow!("Excel file contains no sheets"));
    }

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| anyhow!("Error reading sheet '{}': {}", name, e))?;

        let mut sheet = Sheet::new(name.clone());
        if let Some((start_row, start_col)) = range.start() {
            for (r, c, data) in range.cells() {
                let value = to_cell(data);
                if value != CellValue::Empty {
                    sheet.set_cell(start_row + r as u32 + 1, start_col + c as u32 + 1, value);
                }
            }
        }

        // Formulas are read separately; the range above only holds cached results
        let formulas = workbook
            .worksheet_formula(&name)
            .map_err(|e| anyhow!("Error reading formulas of sheet '{}': {}", name, e))?;
        if let Some((start_row, start_col)) = formulas.start() {
            for (r, c, formula) in formulas.cells() {
                if formula.is_empty() {
                    continue;
                }
                let (row, column) = (start_row + r as u32 + 1, start_col + c as u32 + 1);
                let value = Box::new(sheet.cell(row, column).clone());
                sheet.set_cell(
                    row,
                    column,
                    CellValue::Formula {
                        formula: formula.clone(),
                        value,
                    },
                );
            }
        }
        debug!(
            "Loaded sheet '{}' ({} rows x {} columns)",
            sheet.name,
            sheet.max_row(),
            sheet.max_column()
        );
        sheets.push(sheet);
    }

    Ok(Workbook::new(sheets))
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::Text(text.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Writes the workbook back over the file it was loaded from.
///
/// Each save goes to a sibling temporary file first and is then renamed over
/// the original, so an interrupted save never leaves a truncated workbook.
#[derive(Debug, Clone)]
pub struct XlsxStore {
    path: PathBuf,
}

impl XlsxStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".saving");
        self.path.with_file_name(name)
    }
}

impl WorkbookStore for XlsxStore {
    fn save(&mut self, workbook: &Workbook) -> Result<()> {
        let mut output = rust_xlsxwriter::Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        for sheet in &workbook.sheets {
            let worksheet = output.add_worksheet();
            worksheet
                .set_name(&sheet.name)
                .with_context(|| format!("Invalid sheet name '{}'", sheet.name))?;

            for (row, column, value) in sheet.cells() {
                let (r, c) = (row - 1, (column - 1) as u16);
                match value {
                    CellValue::Empty => {}
                    CellValue::Text(text) => {
                        worksheet.write_string(r, c, text)?;
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                    CellValue::DateTime(serial) => {
                        let format = if serial.fract() == 0.0 {
                            &date_format
                        } else {
                            &datetime_format
                        };
                        worksheet.write_number_with_format(r, c, *serial, format)?;
                    }
                    CellValue::Formula { formula, value } => {
                        let formula = Formula::new(formula).set_result(cached_result(value));
                        worksheet.write_formula(r, c, formula)?;
                    }
                }
            }
        }

        let temp = self.temp_path();
        output
            .save(&temp)
            .with_context(|| format!("Failed to write workbook: {}", temp.display()))?;
        std::fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to replace workbook: {}", self.path.display()))?;

        debug!("Saved workbook to {}", self.path.display());
        Ok(())
    }
}

fn cached_result(value: &CellValue) -> String {
    match value {
        CellValue::Number(n) | CellValue::DateTime(n) => n.to_string(),
        other => other.as_text(),
    }
}
