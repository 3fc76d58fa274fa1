use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use log::info;

use bulk_app_update::api::VeracodeClient;
use bulk_app_update::auth::Credentials;
use bulk_app_update::cli::Cli;
use bulk_app_update::config::Settings;
use bulk_app_update::runner::Runner;
use bulk_app_update::sheet::{XlsxStore, load_workbook};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    dotenvy::dotenv().ok();

    let Some(settings) = Settings::from_cli(&cli)? else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };
    info!("Starting bulk-app-update on {}", settings.file.display());

    let credentials = Credentials::load()?;
    let client = VeracodeClient::new(&credentials, settings.base_url.as_deref())?;

    let mut workbook = load_workbook(&settings.file)?;
    let store = XlsxStore::new(&settings.file);
    let mut runner = Runner::new(&client, store, settings.run_options());
    let report = runner.run(&mut workbook).await?;

    println!();
    println!(
        "{} updated, {} skipped, {} failed",
        report.succeeded.to_string().green(),
        report.skipped.to_string().yellow(),
        report.failed.len().to_string().red()
    );
    for failed in &report.failed {
        println!(
            "  row {} ({}): {}",
            failed.row,
            failed.application.cyan(),
            failed.status
        );
    }

    Ok(())
}
