//! Run settings gathered from the command line and environment

use anyhow::Result;
use log::info;
use std::path::PathBuf;

use crate::api::{RetryConfig, UpdateMode};
use crate::cli::Cli;
use crate::runner::RunOptions;

/// Overrides the API host picked from the credentials' region
pub const BASE_URL_VAR: &str = "VERACODE_API_BASE_URL";

#[derive(Debug, Clone)]
pub struct Settings {
    pub file: PathBuf,
    pub header_row: u32,
    pub verbose: bool,
    pub update_mode: UpdateMode,
    pub base_url: Option<String>,
    pub lookup_retry: RetryConfig,
}

impl Settings {
    /// `None` when no workbook was given, in which case the caller prints help
    pub fn from_cli(cli: &Cli) -> Result<Option<Settings>> {
        let Some(file) = cli.file_name.clone() else {
            return Ok(None);
        };

        if !file.exists() {
            anyhow::bail!("Workbook not found: {}", file.display());
        }

        let base_url = std::env::var(BASE_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty());
        if let Some(url) = &base_url {
            info!("Using API base URL {} from {}", url, BASE_URL_VAR);
        }

        Ok(Some(Settings {
            file,
            header_row: cli.header_row,
            verbose: cli.debug,
            update_mode: if cli.partial {
                UpdateMode::Partial
            } else {
                UpdateMode::Full
            },
            base_url,
            lookup_retry: RetryConfig::default(),
        }))
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            header_row: self.header_row,
            update_mode: self.update_mode,
            lookup_retry: self.lookup_retry.clone(),
            verbose: self.verbose,
        }
    }
}
