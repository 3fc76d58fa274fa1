//! In-memory platform and workbook store shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bulk_app_update::api::{
    ApiError, Application, BusinessUnit, PlatformApi, Policy, Profile, Team, UpdateMode,
    UpdateRequest, UpdateResponse,
};
use bulk_app_update::api::RetryConfig;
use bulk_app_update::runner::{RunOptions, RunReport, Runner};
use bulk_app_update::sheet::{CellValue, Sheet, Workbook, WorkbookStore};
use serde_json::Value;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedUpdate {
    pub guid: String,
    pub mode: UpdateMode,
    pub body: Value,
}

/// Lookups return every entity whose name contains the filter, like the
/// real endpoints do, so the exact-match step is exercised.
#[derive(Default)]
pub struct FakeApi {
    business_units: Vec<BusinessUnit>,
    policies: Vec<Policy>,
    teams: Vec<Team>,
    applications: Vec<Application>,
    failing_lookups: Mutex<u32>,
    update_status: Option<(u16, String)>,
    pub lookups: Mutex<Vec<String>>,
    pub updates: Mutex<Vec<RecordedUpdate>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_business_unit(mut self, id: &str, name: &str) -> Self {
        self.business_units.push(BusinessUnit {
            bu_id: id.into(),
            bu_name: name.into(),
        });
        self
    }

    pub fn with_policy(mut self, guid: &str, name: &str) -> Self {
        self.policies.push(Policy {
            guid: guid.into(),
            name: name.into(),
        });
        self
    }

    pub fn with_team(mut self, id: &str, name: &str) -> Self {
        self.teams.push(Team {
            team_id: id.into(),
            team_name: name.into(),
        });
        self
    }

    pub fn with_application(mut self, application: Application) -> Self {
        self.applications.push(application);
        self
    }

    /// The next `count` lookup calls answer HTTP 503
    pub fn failing_lookups(self, count: u32) -> Self {
        *self.failing_lookups.lock().unwrap() = count;
        self
    }

    pub fn update_returns(mut self, status: u16, body: &str) -> Self {
        self.update_status = Some((status, body.to_string()));
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    pub fn recorded_updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Profile document of the only update sent
    pub fn single_update(&self) -> Value {
        let updates = self.recorded_updates();
        assert_eq!(updates.len(), 1, "expected exactly one update call");
        updates[0].body["profile"].clone()
    }

    fn record_lookup(&self, kind: &str, name: &str) -> Result<(), ApiError> {
        self.lookups.lock().unwrap().push(format!("{}:{}", kind, name));

        let mut failing = self.failing_lookups.lock().unwrap();
        if *failing > 0 {
            *failing -= 1;
            return Err(ApiError::Status {
                status: 503,
                body: "Service Unavailable".into(),
            });
        }
        Ok(())
    }
}

fn contains(candidate: &str, filter: &str) -> bool {
    candidate.to_lowercase().contains(&filter.to_lowercase())
}

#[async_trait]
impl PlatformApi for FakeApi {
    async fn business_units(&self, name: &str) -> Result<Vec<BusinessUnit>, ApiError> {
        self.record_lookup("business_unit", name)?;
        Ok(self
            .business_units
            .iter()
            .filter(|bu| contains(&bu.bu_name, name))
            .cloned()
            .collect())
    }

    async fn policies(&self, name: &str) -> Result<Vec<Policy>, ApiError> {
        self.record_lookup("policy", name)?;
        Ok(self
            .policies
            .iter()
            .filter(|policy| contains(&policy.name, name))
            .cloned()
            .collect())
    }

    async fn teams(&self, name: &str) -> Result<Vec<Team>, ApiError> {
        self.record_lookup("team", name)?;
        Ok(self
            .teams
            .iter()
            .filter(|team| contains(&team.team_name, name))
            .cloned()
            .collect())
    }

    async fn applications(&self, name: &str) -> Result<Vec<Application>, ApiError> {
        self.record_lookup("application", name)?;
        Ok(self
            .applications
            .iter()
            .filter(|app| contains(&app.profile.name, name))
            .cloned()
            .collect())
    }

    async fn update_application(
        &self,
        guid: &str,
        request: &UpdateRequest,
        mode: UpdateMode,
    ) -> Result<UpdateResponse, ApiError> {
        self.updates.lock().unwrap().push(RecordedUpdate {
            guid: guid.to_string(),
            mode,
            body: serde_json::to_value(request)?,
        });

        let (status, body) = self
            .update_status
            .clone()
            .unwrap_or((200, "{}".to_string()));
        Ok(UpdateResponse { status, body })
    }
}

/// Keeps a copy of every saved workbook
#[derive(Default)]
pub struct MemoryStore {
    pub saves: Vec<Workbook>,
}

impl WorkbookStore for MemoryStore {
    fn save(&mut self, workbook: &Workbook) -> anyhow::Result<()> {
        self.saves.push(workbook.clone());
        Ok(())
    }
}

pub fn application(guid: &str, name: &str) -> Application {
    Application {
        guid: guid.into(),
        profile: Profile {
            name: name.into(),
            business_criticality: Some("HIGH".into()),
            ..Default::default()
        },
    }
}

/// Workbook with a title in row 1, `headers` in row 2 and `rows` below
pub fn workbook(headers: &[&str], rows: &[&[&str]]) -> Workbook {
    let to_cells = |values: &[&str]| -> Vec<CellValue> {
        values
            .iter()
            .map(|v| if v.is_empty() { CellValue::Empty } else { CellValue::from(*v) })
            .collect()
    };

    let mut grid = vec![vec![CellValue::from("Application updates")], to_cells(headers)];
    grid.extend(rows.iter().map(|row| to_cells(*row)));
    Workbook::with_sheet(Sheet::from_rows("Applications", grid))
}

pub fn options() -> RunOptions {
    RunOptions {
        lookup_retry: RetryConfig::immediate(10),
        ..RunOptions::default()
    }
}

/// Run over `workbook` and hand back the report and the store
pub async fn run(api: &FakeApi, workbook: &mut Workbook, options: RunOptions) -> (RunReport, MemoryStore) {
    let mut runner = Runner::new(api, MemoryStore::default(), options);
    let report = runner.run(workbook).await.expect("run should complete");
    (report, runner.into_store())
}

/// Text of the status cell for a 1-based sheet row
pub fn status(workbook: &Workbook, row: u32, status_column: u32) -> String {
    workbook.active_sheet().cell(row, status_column).as_text()
}
