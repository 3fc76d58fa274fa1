//! Wire types for lookups and profile updates

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treats an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BusinessUnit {
    pub bu_id: String,
    pub bu_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub team_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Policy {
    pub guid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Application {
    pub guid: String,
    pub profile: Profile,
}

/// Reference to another platform entity by guid
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GuidRef {
    pub guid: String,
}

impl GuidRef {
    pub fn new(guid: impl Into<String>) -> Self {
        Self { guid: guid.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BusinessOwner {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

impl CustomField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Application profile as returned by the applications endpoint
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub business_criticality: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub business_unit: Option<GuidRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub policies: Vec<GuidRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teams: Vec<GuidRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_owners: Vec<BusinessOwner>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub settings: Option<Map<String, Value>>,
    #[serde(default)]
    pub archer_app_name: Option<String>,
    #[serde(default)]
    pub git_repo_url: Option<String>,
    #[serde(default)]
    pub custom_kms_alias: Option<String>,
}

/// How the profile update is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Replace the whole profile
    #[default]
    Full,
    /// Overwrite only the fields present in the payload
    Partial,
}

/// Body of the profile update call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateRequest {
    pub profile: ProfilePayload,
}

/// Profile document sent to the update endpoint.
///
/// `None` leaves a key out of the document. For the doubly optional fields
/// `Some(None)` serializes as an explicit `null`, which clears the value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProfilePayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_criticality: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<Option<GuidRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<Vec<GuidRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<GuidRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_owners: Option<Vec<BusinessOwner>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<CustomField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archer_app_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_kms_alias: Option<String>,
}

/// Raw outcome of the update call
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResponse {
    pub status: u16,
    pub body: String,
}

impl UpdateResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
