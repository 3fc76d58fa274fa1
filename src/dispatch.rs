//! Profile update submission
//!
//! Builds the typed update document from a merged profile and interprets the
//! response. Update calls are never retried.

use log::{debug, warn};

use crate::api::{GuidRef, PlatformApi, ProfilePayload, UpdateMode, UpdateRequest};
use crate::error::RowError;
use crate::profile::{MergedProfile, ProfileField};

/// Status text recorded for a row that updated cleanly
pub const SUCCESS: &str = "success";

/// Full mode sends every known field; partial mode sends the name plus only
/// the fields the row set or cleared.
pub fn build_request(merged: &MergedProfile, mode: UpdateMode) -> UpdateRequest {
    let include = |field: ProfileField| mode == UpdateMode::Full || merged.is_touched(field);

    // Doubly optional: absent, explicit null, or a value
    let nullable = |field: ProfileField, value: Option<String>| -> Option<Option<String>> {
        if !include(field) {
            None
        } else if value.is_some() || merged.is_touched(field) {
            Some(value)
        } else {
            None
        }
    };

    let present = |field: ProfileField, has_value: bool| {
        include(field) && (has_value || merged.is_touched(field))
    };

    let profile = ProfilePayload {
        name: merged.name.clone(),
        business_criticality: nullable(
            ProfileField::BusinessCriticality,
            merged.business_criticality.clone(),
        ),
        description: merged
            .description
            .clone()
            .filter(|_| include(ProfileField::Description)),
        tags: merged.tags.clone().filter(|_| include(ProfileField::Tags)),
        business_unit: nullable(ProfileField::BusinessUnit, merged.business_unit.clone())
            .map(|guid| guid.map(GuidRef::new)),
        policies: present(ProfileField::Policy, merged.policy.is_some())
            .then(|| merged.policy.iter().map(GuidRef::new).collect()),
        teams: include(ProfileField::Teams)
            .then(|| merged.teams.iter().map(GuidRef::new).collect()),
        business_owners: present(ProfileField::BusinessOwner, merged.business_owner.is_some())
            .then(|| merged.business_owner.iter().cloned().collect()),
        custom_fields: include(ProfileField::CustomFields).then(|| merged.custom_fields.clone()),
        settings: merged
            .settings
            .clone()
            .filter(|_| include(ProfileField::DynamicScanApproval)),
        archer_app_name: nullable(ProfileField::ArcherAppName, merged.archer_app_name.clone()),
        git_repo_url: merged
            .git_repo_url
            .clone()
            .filter(|_| mode == UpdateMode::Full),
        custom_kms_alias: merged
            .custom_kms_alias
            .clone()
            .filter(|_| mode == UpdateMode::Full),
    };

    UpdateRequest { profile }
}

/// Submit the update; `Ok` only for a 2xx answer
pub async fn dispatch<A>(api: &A, merged: &MergedProfile, mode: UpdateMode) -> Result<(), RowError>
where
    A: PlatformApi + ?Sized,
{
    let request = build_request(merged, mode);
    debug!(
        "Updating application {} ({:?}): {}",
        merged.guid,
        mode,
        serde_json::to_string(&request).unwrap_or_default()
    );

    let response = api.update_application(&merged.guid, &request, mode).await?;
    if response.is_success() {
        return Ok(());
    }

    warn!(
        "Update of application {} returned HTTP {}",
        merged.guid, response.status
    );
    Err(RowError::Update {
        status: response.status,
        body: response.body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BusinessOwner, CustomField};
    use serde_json::json;
    use std::collections::BTreeSet;

    fn merged() -> MergedProfile {
        MergedProfile {
            guid: "app-1".into(),
            name: "Payments".into(),
            business_criticality: Some("HIGH".into()),
            description: Some("Card processing".into()),
            tags: None,
            business_unit: None,
            policy: Some("pol-1".into()),
            business_owner: Some(BusinessOwner {
                name: "Ada".into(),
                email: "ada@example.com".into(),
            }),
            teams: vec!["team-a".into()],
            custom_fields: vec![CustomField::new("Risk Tier", "High")],
            settings: None,
            archer_app_name: None,
            git_repo_url: Some("https://git.example.com/payments".into()),
            custom_kms_alias: None,
            touched: BTreeSet::new(),
        }
    }

    #[test]
    fn test_full_request_carries_current_state() {
        let value = serde_json::to_value(build_request(&merged(), UpdateMode::Full)).unwrap();

        assert_eq!(
            value,
            json!({
                "profile": {
                    "name": "Payments",
                    "business_criticality": "HIGH",
                    "description": "Card processing",
                    "policies": [{ "guid": "pol-1" }],
                    "teams": [{ "guid": "team-a" }],
                    "business_owners": [{ "name": "Ada", "email": "ada@example.com" }],
                    "custom_fields": [{ "name": "Risk Tier", "value": "High" }],
                    "git_repo_url": "https://git.example.com/payments"
                }
            })
        );
    }

    #[test]
    fn test_partial_request_only_sends_touched_fields() {
        let mut profile = merged();
        profile.business_unit = None;
        profile.touched = [ProfileField::BusinessUnit, ProfileField::Teams].into();

        let value = serde_json::to_value(build_request(&profile, UpdateMode::Partial)).unwrap();

        assert_eq!(
            value,
            json!({
                "profile": {
                    "name": "Payments",
                    "business_unit": null,
                    "teams": [{ "guid": "team-a" }]
                }
            })
        );
    }

    #[test]
    fn test_cleared_owner_and_policy_send_empty_lists() {
        let mut profile = merged();
        profile.policy = None;
        profile.business_owner = None;
        profile.touched = [ProfileField::Policy, ProfileField::BusinessOwner].into();

        let request = build_request(&profile, UpdateMode::Full);
        assert_eq!(request.profile.policies, Some(vec![]));
        assert_eq!(request.profile.business_owners, Some(vec![]));
    }
}
