use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::fields::{FieldInput, ProfileField};
use super::input::RowChanges;
use crate::api::{Application, BusinessOwner, CustomField};

/// Settings key driven by the "Dynamic Scan Approval" column
pub const DYNAMIC_SCAN_APPROVAL_NOT_REQUIRED: &str = "dynamic_scan_approval_not_required";

/// Desired state of a profile after applying one row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedProfile {
    pub guid: String,
    pub name: String,
    pub business_criticality: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub business_unit: Option<String>,
    pub policy: Option<String>,
    pub business_owner: Option<BusinessOwner>,
    pub teams: Vec<String>,
    pub custom_fields: Vec<CustomField>,
    pub settings: Option<Map<String, Value>>,
    pub archer_app_name: Option<String>,
    pub git_repo_url: Option<String>,
    pub custom_kms_alias: Option<String>,
    /// Fields the row set or cleared
    pub touched: BTreeSet<ProfileField>,
}

impl MergedProfile {
    pub fn is_touched(&self, field: ProfileField) -> bool {
        self.touched.contains(&field)
    }
}

/// Apply `changes` on top of the fetched `application`.
///
/// Blank cells keep the current value, the sentinel clears it, anything else
/// replaces it. Teams are replaced wholesale; custom fields are merged by name.
pub fn merge(application: &Application, changes: &RowChanges) -> MergedProfile {
    let current = &application.profile;
    let mut touched = BTreeSet::new();
    let mut track = |field: ProfileField, keep: bool| {
        if !keep {
            touched.insert(field);
        }
    };

    track(ProfileField::BusinessCriticality, changes.business_criticality.is_keep());
    track(ProfileField::Description, changes.description.is_keep());
    track(ProfileField::Tags, changes.tags.is_keep());
    track(ProfileField::BusinessUnit, changes.business_unit.is_keep());
    track(ProfileField::Policy, changes.policy.is_keep());
    track(ProfileField::BusinessOwner, changes.business_owner.is_keep());
    track(ProfileField::Teams, changes.teams.is_keep());
    track(ProfileField::CustomFields, changes.custom_fields.is_empty());
    track(ProfileField::DynamicScanApproval, changes.dynamic_scan_approval.is_keep());
    track(ProfileField::ArcherAppName, changes.archer_app_name.is_keep());

    let name = match &changes.name {
        Some(new_name) if *new_name != current.name => {
            track(ProfileField::Name, false);
            new_name.clone()
        }
        _ => current.name.clone(),
    };

    let set_text = |value: &String| Some(value.clone());

    MergedProfile {
        guid: application.guid.clone(),
        name,
        business_criticality: changes.business_criticality.merge_into(
            current.business_criticality.clone(),
            None,
            set_text,
        ),
        description: changes.description.merge_into(
            current.description.clone(),
            Some(String::new()),
            set_text,
        ),
        tags: changes
            .tags
            .merge_into(current.tags.clone(), Some(String::new()), set_text),
        business_unit: changes.business_unit.merge_into(
            current.business_unit.as_ref().map(|bu| bu.guid.clone()),
            None,
            set_text,
        ),
        policy: changes.policy.merge_into(
            current.policies.first().map(|policy| policy.guid.clone()),
            None,
            set_text,
        ),
        business_owner: changes.business_owner.merge_into(
            current.business_owners.first().cloned(),
            None,
            |owner| Some(owner.clone()),
        ),
        teams: changes.teams.merge_into(
            current.teams.iter().map(|team| team.guid.clone()).collect(),
            Vec::new(),
            |guids| guids.clone(),
        ),
        custom_fields: merge_custom_fields(&current.custom_fields, &changes.custom_fields),
        settings: merge_settings(current.settings.clone(), &changes.dynamic_scan_approval),
        archer_app_name: changes.archer_app_name.merge_into(
            current.archer_app_name.clone(),
            None,
            set_text,
        ),
        git_repo_url: current.git_repo_url.clone(),
        custom_kms_alias: current.custom_kms_alias.clone(),
        touched,
    }
}

/// Incoming values win by name, cleared names are dropped, and fields the
/// row does not mention are kept where they were.
pub fn merge_custom_fields(
    current: &[CustomField],
    incoming: &[(String, FieldInput<String>)],
) -> Vec<CustomField> {
    let mut merged = current.to_vec();

    for (name, input) in incoming {
        let position = merged.iter().position(|field| field.name == *name);
        merged.retain(|field| field.name != *name);

        if let FieldInput::Set(value) = input {
            let field = CustomField::new(name.clone(), value.clone());
            match position {
                Some(index) => merged.insert(index.min(merged.len()), field),
                None => merged.push(field),
            }
        }
    }

    merged
}

fn merge_settings(
    current: Option<Map<String, Value>>,
    approval: &FieldInput<bool>,
) -> Option<Map<String, Value>> {
    match approval {
        FieldInput::Keep => current,
        FieldInput::Clear => current.map(|mut settings| {
            settings.remove(DYNAMIC_SCAN_APPROVAL_NOT_REQUIRED);
            settings
        }),
        FieldInput::Set(required) => {
            let mut settings = current.unwrap_or_default();
            settings.insert(
                DYNAMIC_SCAN_APPROVAL_NOT_REQUIRED.to_string(),
                Value::Bool(!required),
            );
            Some(settings)
        }
    }
}
