//! Name to identifier resolution
//!
//! A name matches a candidate when both are equal after trimming and
//! lower-casing. The first match wins; no match is a `NotFound` for the row.
//! Every lookup call runs under the retry policy.

use log::debug;

use crate::api::{Application, PlatformApi, RetryConfig, RetryPolicy};
use crate::error::{EntityKind, RowError};

pub fn names_match(candidate: &str, wanted: &str) -> bool {
    candidate.trim().to_lowercase() == wanted.trim().to_lowercase()
}

pub struct NameResolver<'a, A: ?Sized> {
    api: &'a A,
    retry: RetryPolicy,
}

impl<'a, A: PlatformApi + ?Sized> NameResolver<'a, A> {
    pub fn new(api: &'a A, retry: RetryConfig) -> Self {
        Self {
            api,
            retry: RetryPolicy::new(retry),
        }
    }

    pub async fn business_unit(&self, name: &str) -> Result<String, RowError> {
        let label = format!("Business unit lookup '{}'", name.trim());
        let candidates = self
            .retry
            .execute(&label, || self.api.business_units(name.trim()))
            .await
            .map_err(|source| lookup_failed(EntityKind::BusinessUnit, name, source))?;

        candidates
            .into_iter()
            .find(|bu| names_match(&bu.bu_name, name))
            .map(|bu| bu.bu_id)
            .ok_or_else(|| RowError::not_found(EntityKind::BusinessUnit, name.trim()))
    }

    pub async fn policy(&self, name: &str) -> Result<String, RowError> {
        let label = format!("Policy lookup '{}'", name.trim());
        let candidates = self
            .retry
            .execute(&label, || self.api.policies(name.trim()))
            .await
            .map_err(|source| lookup_failed(EntityKind::Policy, name, source))?;

        candidates
            .into_iter()
            .find(|policy| names_match(&policy.name, name))
            .map(|policy| policy.guid)
            .ok_or_else(|| RowError::not_found(EntityKind::Policy, name.trim()))
    }

    pub async fn team(&self, name: &str) -> Result<String, RowError> {
        let label = format!("Team lookup '{}'", name.trim());
        let candidates = self
            .retry
            .execute(&label, || self.api.teams(name.trim()))
            .await
            .map_err(|source| lookup_failed(EntityKind::Team, name, source))?;

        candidates
            .into_iter()
            .find(|team| names_match(&team.team_name, name))
            .map(|team| team.team_id)
            .ok_or_else(|| RowError::not_found(EntityKind::Team, name.trim()))
    }

    /// Resolve each team in order; the first failure aborts
    pub async fn teams(&self, names: &[String]) -> Result<Vec<String>, RowError> {
        let mut guids = Vec::with_capacity(names.len());
        for name in names {
            guids.push(self.team(name).await?);
        }
        Ok(guids)
    }

    pub async fn application(&self, name: &str) -> Result<Application, RowError> {
        let label = format!("Application lookup '{}'", name.trim());
        let candidates = self
            .retry
            .execute(&label, || self.api.applications(name.trim()))
            .await
            .map_err(|source| lookup_failed(EntityKind::Application, name, source))?;

        debug!("{} candidate(s) for application '{}'", candidates.len(), name.trim());
        candidates
            .into_iter()
            .find(|app| names_match(&app.profile.name, name))
            .ok_or_else(|| RowError::not_found(EntityKind::Application, name.trim()))
    }
}

fn lookup_failed(kind: EntityKind, name: &str, source: crate::api::RetryExhausted) -> RowError {
    RowError::Lookup {
        kind,
        name: name.trim().to_string(),
        source,
    }
}
