//! Row loop behavior: skipping, status text, retries and persistence

mod common;

use bulk_app_update::api::RetryConfig;
use bulk_app_update::runner::{RunOptions, Runner};
use bulk_app_update::sheet::CellValue;
use common::{FakeApi, MemoryStore, application, options, run, status, workbook};

const HEADERS: [&str; 2] = ["Application Name", "Business Unit"];
const STATUS_COLUMN: u32 = 3;

fn api() -> FakeApi {
    FakeApi::new()
        .with_application(application("app-1", "Payments"))
        .with_application(application("app-2", "Ledger"))
        .with_business_unit("bu-fin", "Finance")
}

#[tokio::test]
async fn test_rows_marked_success_are_skipped() {
    let api = api();
    let mut book = workbook(
        &HEADERS,
        &[&["Payments", "Finance", "success"], &["Ledger", "Finance"]],
    );
    let before = book.active_sheet().cell(3, 2).clone();

    let (report, _) = run(&api, &mut book, options()).await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(status(&book, 3, STATUS_COLUMN), "success");
    assert_eq!(book.active_sheet().cell(3, 2), &before);

    let updates = api.recorded_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].guid, "app-2");
}

#[tokio::test]
async fn test_rerun_after_success_changes_nothing() {
    let api = api();
    let mut book = workbook(&HEADERS, &[&["Payments", "Finance"]]);

    run(&api, &mut book, options()).await;
    let after_first = book.clone();
    let (report, _) = run(&api, &mut book, options()).await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.processed(), 0);
    assert_eq!(book, after_first);
    assert_eq!(api.recorded_updates().len(), 1);
}

#[tokio::test]
async fn test_unknown_business_unit_fails_row_and_run_continues() {
    let api = api();
    let mut book = workbook(
        &HEADERS,
        &[&["Payments", "Nowhere"], &["Ledger", "Finance"]],
    );

    let (report, _) = run(&api, &mut book, options()).await;

    assert_eq!(
        status(&book, 3, STATUS_COLUMN),
        "Unable to find a Business Unit named Nowhere"
    );
    assert_eq!(status(&book, 4, STATUS_COLUMN), "success");
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].row, 3);
    assert_eq!(report.failed[0].application, "Payments");
}

#[tokio::test]
async fn test_unknown_application_is_reported() {
    let api = api();
    let mut book = workbook(&HEADERS, &[&["Billing", "Finance"]]);

    run(&api, &mut book, options()).await;

    assert_eq!(status(&book, 3, STATUS_COLUMN), "Application not found: Billing");
    assert!(api.recorded_updates().is_empty());
}

#[tokio::test]
async fn test_failed_update_records_status_code_and_body() {
    let api = api().update_returns(400, r#"{"message":"bad request"}"#);
    let mut book = workbook(&HEADERS, &[&["Payments", "Finance"]]);

    let (report, _) = run(&api, &mut book, options()).await;

    let text = status(&book, 3, STATUS_COLUMN);
    assert!(text.contains("400"), "status was: {}", text);
    assert!(text.contains("bad request"), "status was: {}", text);
    assert_eq!(report.failed.len(), 1);
    // Updates are not retried
    assert_eq!(api.recorded_updates().len(), 1);
}

#[tokio::test]
async fn test_lookup_gives_up_after_ten_attempts() {
    let api = api().failing_lookups(10);
    let mut book = workbook(&HEADERS, &[&["Payments", "Finance"]]);

    run(&api, &mut book, options()).await;

    let text = status(&book, 3, STATUS_COLUMN);
    assert!(text.starts_with("Lookup of Application 'Payments' failed"), "status was: {}", text);
    assert!(text.contains("10 attempts"), "status was: {}", text);
    assert_eq!(api.lookup_count(), 10);
    assert!(api.recorded_updates().is_empty());
}

#[tokio::test]
async fn test_lookup_recovers_within_attempt_ceiling() {
    let api = api().failing_lookups(9);
    let mut book = workbook(&HEADERS, &[&["Payments", "Finance"]]);

    run(&api, &mut book, options()).await;

    assert_eq!(status(&book, 3, STATUS_COLUMN), "success");
    // nine failures, the application lookup, then the business unit
    assert_eq!(api.lookup_count(), 11);
}

#[tokio::test]
async fn test_attempt_ceiling_comes_from_options() {
    let api = api().failing_lookups(3);
    let mut book = workbook(&HEADERS, &[&["Payments", "Finance"]]);
    let options = RunOptions {
        lookup_retry: RetryConfig::immediate(2),
        ..options()
    };

    run(&api, &mut book, options).await;

    assert!(status(&book, 3, STATUS_COLUMN).contains("2 attempts"));
    assert_eq!(api.lookup_count(), 2);
}

#[tokio::test]
async fn test_invalid_business_criticality_is_reported() {
    let api = api();
    let mut book = workbook(
        &["Application Name", "Business Criticality"],
        &[&["Payments", "Critical"]],
    );

    run(&api, &mut book, options()).await;

    assert_eq!(
        status(&book, 3, 3),
        "Invalid Business Criticality value 'Critical': expected one of Very High, High, Medium, Low, Very Low"
    );
}

#[tokio::test]
async fn test_workbook_saved_after_each_row_and_at_end() {
    let api = api();
    let mut book = workbook(
        &HEADERS,
        &[&["Payments", "Finance"], &["Ledger", "Nowhere"]],
    );

    let (_, store) = run(&api, &mut book, options()).await;

    assert_eq!(store.saves.len(), 3);
    assert_eq!(status(&store.saves[0], 3, STATUS_COLUMN), "success");
    assert_eq!(status(&store.saves[0], 4, STATUS_COLUMN), "");
    assert_eq!(store.saves[2], book);
}

#[tokio::test]
async fn test_blank_rows_are_left_alone() {
    let api = api();
    let mut book = workbook(&HEADERS, &[&["", ""], &["Ledger", "Finance"]]);

    let (report, store) = run(&api, &mut book, options()).await;

    assert_eq!(book.active_sheet().cell(3, STATUS_COLUMN), &CellValue::Empty);
    assert_eq!(status(&book, 4, STATUS_COLUMN), "success");
    assert_eq!(report.processed(), 1);
    assert_eq!(store.saves.len(), 2);
}

#[tokio::test]
async fn test_status_goes_after_last_contiguous_header() {
    let api = api();
    // The gap ends the header scan, so "Business Unit" is never read
    let mut book = workbook(
        &["Application Name", "", "Business Unit"],
        &[&["Payments", "", "Nowhere"]],
    );

    run(&api, &mut book, options()).await;

    assert_eq!(status(&book, 3, 2), "success");
    assert_eq!(book.active_sheet().cell(3, 3).as_text(), "Nowhere");
}

#[tokio::test]
async fn test_missing_headers_abort_the_run_after_saving() {
    let api = api();
    let mut book = workbook(&HEADERS, &[&["Payments", "Finance"]]);
    let options = RunOptions {
        header_row: 9,
        ..options()
    };

    let mut runner = Runner::new(&api, MemoryStore::default(), options);
    let error = runner.run(&mut book).await.unwrap_err();

    assert!(error.to_string().contains("No column headers found in row 9"));
    assert_eq!(runner.into_store().saves.len(), 1);
}
