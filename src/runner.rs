//! Row loop
//!
//! Rows are processed one at a time in sheet order. Each row's outcome is
//! written into the status column and the workbook is saved after every row,
//! so an interrupted run can be restarted and will skip finished rows.

use anyhow::{Context, Result};
use colored::*;
use log::{debug, info, warn};

use crate::api::{PlatformApi, RetryConfig, UpdateMode};
use crate::dispatch::{self, SUCCESS};
use crate::error::RowError;
use crate::profile::{RowInput, merge};
use crate::resolve::NameResolver;
use crate::sheet::{CellValue, HeaderIndex, RowView, Workbook, WorkbookStore};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 1-based row holding the column headers
    pub header_row: u32,
    pub update_mode: UpdateMode,
    pub lookup_retry: RetryConfig,
    /// Print every row's mapped cells before processing it
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            header_row: 2,
            update_mode: UpdateMode::Full,
            lookup_retry: RetryConfig::default(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedRow {
    pub row: u32,
    pub application: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub succeeded: usize,
    /// Rows already marked as done by an earlier run
    pub skipped: usize,
    pub failed: Vec<FailedRow>,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}

pub struct Runner<'a, A: ?Sized, S> {
    api: &'a A,
    store: S,
    options: RunOptions,
}

impl<'a, A, S> Runner<'a, A, S>
where
    A: PlatformApi + ?Sized,
    S: WorkbookStore,
{
    pub fn new(api: &'a A, store: S, options: RunOptions) -> Self {
        Self {
            api,
            store,
            options,
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Process every row, then save once more whatever happened
    pub async fn run(&mut self, workbook: &mut Workbook) -> Result<RunReport> {
        let outcome = self.process_rows(workbook).await;
        let saved = self
            .store
            .save(workbook)
            .context("Failed to save workbook at end of run");

        let report = outcome?;
        saved?;
        Ok(report)
    }

    async fn process_rows(&mut self, workbook: &mut Workbook) -> Result<RunReport> {
        let header_row = self.options.header_row;
        let headers = HeaderIndex::build(workbook.active_sheet(), header_row);
        if headers.is_empty() {
            anyhow::bail!("No column headers found in row {}", header_row);
        }
        println!("Finished reading excel headers");
        debug!("Headers: {:?}", headers.names().collect::<Vec<_>>());

        let status_column = headers.status_column();
        let last_row = workbook.active_sheet().max_row();
        let total = last_row.saturating_sub(header_row);
        let mut report = RunReport::default();

        for row in header_row + 1..=last_row {
            let input = {
                let view = RowView::new(workbook.active_sheet(), &headers, row);
                if self.options.verbose {
                    for (field, value) in view.fields() {
                        println!("{} -> {}", field, value);
                    }
                }

                if view.status().as_text() == SUCCESS {
                    println!("Skipping row {} as it was already done", row - header_row);
                    report.skipped += 1;
                    continue;
                }
                if view.is_blank() {
                    debug!("Row {} is blank", row);
                    continue;
                }
                RowInput::from_row(&view)
            };

            println!("Importing row {}/{}:", row - header_row, total);
            let status = match self.process_row(&input).await {
                Ok(()) => {
                    println!("  {} {}", "✓".green(), input.application_name);
                    report.succeeded += 1;
                    SUCCESS.to_string()
                }
                Err(error) => {
                    let status = error.to_string();
                    if error.is_not_found() {
                        info!("Row {}: {}", row, status);
                    } else {
                        warn!("Row {} failed: {}", row, status);
                    }
                    println!("  {} {}", "✗".red(), status);
                    report.failed.push(FailedRow {
                        row,
                        application: input.application_name.clone(),
                        status: status.clone(),
                    });
                    status
                }
            };
            println!("Finished importing row {}/{}", row - header_row, total);
            println!("{}", "-".repeat(75).dimmed());

            workbook
                .active_sheet_mut()
                .set_cell(row, status_column, CellValue::Text(status));
            self.store
                .save(workbook)
                .with_context(|| format!("Failed to save workbook after row {}", row))?;
        }

        Ok(report)
    }

    /// Fetch, resolve, merge and update one application
    async fn process_row(&self, input: &RowInput) -> Result<(), RowError> {
        let resolver = NameResolver::new(self.api, self.options.lookup_retry.clone());

        let application = resolver.application(&input.application_name).await?;
        debug!(
            "Row {}: application '{}' is {}",
            input.row, application.profile.name, application.guid
        );

        let changes = input.resolve(&resolver).await?;
        let merged = merge(&application, &changes);
        dispatch::dispatch(self.api, &merged, self.options.update_mode).await
    }
}
