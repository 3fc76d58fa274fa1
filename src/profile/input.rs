use log::debug;

use super::fields::{
    self, FieldInput, ProfileField, SENTINEL, columns, normalize_business_criticality,
    parse_scan_approval,
};
use crate::api::{BusinessOwner, PlatformApi};
use crate::error::RowError;
use crate::resolve::NameResolver;
use crate::sheet::RowView;

/// What one spreadsheet row asks for, before any lookups
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowInput {
    pub row: u32,
    pub application_name: String,
    /// Non-blank "New Application Name"
    pub new_name: Option<String>,
    pub business_criticality: FieldInput<String>,
    pub description: FieldInput<String>,
    pub tags: FieldInput<String>,
    pub business_unit: FieldInput<String>,
    pub policy: FieldInput<String>,
    pub business_owner: FieldInput<BusinessOwner>,
    /// Raw "Teams" cell, a comma-separated list of names
    pub teams: FieldInput<String>,
    /// Non-reserved columns with a non-blank cell, in column order
    pub custom_fields: Vec<(String, FieldInput<String>)>,
    pub dynamic_scan_approval: FieldInput<String>,
    pub archer_app_name: FieldInput<String>,
}

/// A row's requested changes with names resolved to identifiers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowChanges {
    pub name: Option<String>,
    pub business_criticality: FieldInput<String>,
    pub description: FieldInput<String>,
    pub tags: FieldInput<String>,
    pub business_unit: FieldInput<String>,
    pub policy: FieldInput<String>,
    pub business_owner: FieldInput<BusinessOwner>,
    pub teams: FieldInput<Vec<String>>,
    pub custom_fields: Vec<(String, FieldInput<String>)>,
    /// `true` when dynamic scans need approval
    pub dynamic_scan_approval: FieldInput<bool>,
    pub archer_app_name: FieldInput<String>,
}

impl RowInput {
    pub fn from_row(row: &RowView<'_>) -> Self {
        let new_name = row.get(columns::NEW_APPLICATION_NAME);
        let new_name = (!new_name.is_empty() && new_name != SENTINEL).then_some(new_name);

        let custom_fields = row
            .fields()
            .filter(|(header, _)| !fields::is_reserved(header))
            .map(|(header, value)| (header.to_string(), FieldInput::parse(&value)))
            .filter(|(_, input)| !input.is_keep())
            .collect();

        RowInput {
            row: row.row(),
            application_name: row.get(columns::APPLICATION_NAME),
            new_name,
            business_criticality: FieldInput::parse(&row.get(columns::BUSINESS_CRITICALITY)),
            description: FieldInput::parse(&row.get(columns::DESCRIPTION)),
            tags: FieldInput::parse(&row.get(columns::TAGS)),
            business_unit: FieldInput::parse(&row.get(columns::BUSINESS_UNIT)),
            policy: FieldInput::parse(&row.get(columns::POLICY)),
            business_owner: business_owner(
                &row.get(columns::BUSINESS_OWNER),
                &row.get(columns::OWNER_EMAIL),
            ),
            teams: FieldInput::parse(&row.get(columns::TEAMS)),
            custom_fields,
            dynamic_scan_approval: FieldInput::parse(&row.get(columns::DYNAMIC_SCAN_APPROVAL)),
            archer_app_name: FieldInput::parse(&row.get(columns::ARCHER_APPLICATION_NAME)),
        }
    }

    /// Validate values and resolve names, in a fixed order:
    /// business unit, policy, then teams left to right.
    pub async fn resolve<A>(&self, resolver: &NameResolver<'_, A>) -> Result<RowChanges, RowError>
    where
        A: PlatformApi + ?Sized,
    {
        let business_criticality = match &self.business_criticality {
            FieldInput::Set(raw) => match normalize_business_criticality(raw) {
                Some(level) => FieldInput::Set(level),
                None => {
                    return Err(invalid(
                        ProfileField::BusinessCriticality,
                        raw,
                        "expected one of Very High, High, Medium, Low, Very Low",
                    ));
                }
            },
            other => other.clone(),
        };

        let dynamic_scan_approval = match &self.dynamic_scan_approval {
            FieldInput::Set(raw) => match parse_scan_approval(raw) {
                Some(required) => FieldInput::Set(required),
                None => {
                    return Err(invalid(
                        ProfileField::DynamicScanApproval,
                        raw,
                        "expected Yes or No",
                    ));
                }
            },
            FieldInput::Clear => FieldInput::Clear,
            FieldInput::Keep => FieldInput::Keep,
        };

        let team_names = match &self.teams {
            FieldInput::Set(raw) => {
                let names = split_names(raw);
                if names.is_empty() {
                    return Err(invalid(ProfileField::Teams, raw, "no team names given"));
                }
                FieldInput::Set(names)
            }
            FieldInput::Clear => FieldInput::Clear,
            FieldInput::Keep => FieldInput::Keep,
        };

        let business_unit = match &self.business_unit {
            FieldInput::Set(name) => FieldInput::Set(resolver.business_unit(name).await?),
            other => other.clone(),
        };

        let policy = match &self.policy {
            FieldInput::Set(name) => FieldInput::Set(resolver.policy(name).await?),
            other => other.clone(),
        };

        let teams = match &team_names {
            FieldInput::Set(names) => FieldInput::Set(resolver.teams(names).await?),
            FieldInput::Clear => FieldInput::Clear,
            FieldInput::Keep => FieldInput::Keep,
        };

        debug!("Row {} resolved", self.row);

        Ok(RowChanges {
            name: self.new_name.clone(),
            business_criticality,
            description: self.description.clone(),
            tags: self.tags.clone(),
            business_unit,
            policy,
            business_owner: self.business_owner.clone(),
            teams,
            custom_fields: self.custom_fields.clone(),
            dynamic_scan_approval,
            archer_app_name: self.archer_app_name.clone(),
        })
    }
}

/// Both name and email are needed to set an owner; either one blank keeps the
/// current owner, either one `NULL` clears it.
fn business_owner(name: &str, email: &str) -> FieldInput<BusinessOwner> {
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() {
        FieldInput::Keep
    } else if name == SENTINEL || email == SENTINEL {
        FieldInput::Clear
    } else {
        FieldInput::Set(BusinessOwner {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn invalid(field: ProfileField, value: &str, reason: &str) -> RowError {
    RowError::Invalid {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
