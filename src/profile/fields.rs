//! Spreadsheet vocabulary and the blank / `NULL` / value distinction

use std::fmt;

/// Cell literal that clears a field. A blank cell leaves it unchanged.
pub const SENTINEL: &str = "NULL";

pub mod columns {
    pub const APPLICATION_NAME: &str = "Application Name";
    pub const NEW_APPLICATION_NAME: &str = "New Application Name";
    pub const BUSINESS_CRITICALITY: &str = "Business Criticality";
    pub const POLICY: &str = "Policy";
    pub const DESCRIPTION: &str = "Description";
    pub const TAGS: &str = "Tags";
    pub const BUSINESS_UNIT: &str = "Business Unit";
    pub const BUSINESS_OWNER: &str = "Business Owner";
    pub const OWNER_EMAIL: &str = "Owner Email";
    pub const TEAMS: &str = "Teams";
    pub const DYNAMIC_SCAN_APPROVAL: &str = "Dynamic Scan Approval";
    pub const ARCHER_APPLICATION_NAME: &str = "Archer Application Name";
}

/// Headers with a dedicated meaning; every other header is a custom field
pub const RESERVED_COLUMNS: [&str; 12] = [
    columns::APPLICATION_NAME,
    columns::NEW_APPLICATION_NAME,
    columns::BUSINESS_CRITICALITY,
    columns::POLICY,
    columns::DESCRIPTION,
    columns::TAGS,
    columns::BUSINESS_UNIT,
    columns::BUSINESS_OWNER,
    columns::OWNER_EMAIL,
    columns::TEAMS,
    columns::DYNAMIC_SCAN_APPROVAL,
    columns::ARCHER_APPLICATION_NAME,
];

pub fn is_reserved(header: &str) -> bool {
    RESERVED_COLUMNS.contains(&header.trim())
}

pub const BUSINESS_CRITICALITIES: [&str; 5] = ["VERY_HIGH", "HIGH", "MEDIUM", "LOW", "VERY_LOW"];

/// "Very High" -> "VERY_HIGH"; `None` when not a known level
pub fn normalize_business_criticality(raw: &str) -> Option<String> {
    let normalized = raw.trim().replace(' ', "_").to_uppercase();
    BUSINESS_CRITICALITIES
        .contains(&normalized.as_str())
        .then_some(normalized)
}

/// Whether dynamic scans need approval; `None` when the text is not recognized
pub fn parse_scan_approval(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "required" => Some(true),
        "no" | "n" | "false" | "0" | "not required" => Some(false),
        _ => None,
    }
}

/// What a spreadsheet cell asks for a profile field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput<T> {
    /// Blank cell
    Keep,
    /// The sentinel
    Clear,
    Set(T),
}

impl<T> Default for FieldInput<T> {
    fn default() -> Self {
        FieldInput::Keep
    }
}

impl FieldInput<String> {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" => FieldInput::Keep,
            SENTINEL => FieldInput::Clear,
            value => FieldInput::Set(value.to_string()),
        }
    }
}

impl<T> FieldInput<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldInput::Keep)
    }

    /// Current value when kept, `cleared` when cleared, `set(value)` otherwise
    pub fn merge_into<U>(&self, current: U, cleared: U, set: impl FnOnce(&T) -> U) -> U {
        match self {
            FieldInput::Keep => current,
            FieldInput::Clear => cleared,
            FieldInput::Set(value) => set(value),
        }
    }
}

/// Updatable parts of an application profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProfileField {
    Name,
    BusinessCriticality,
    Description,
    Tags,
    BusinessUnit,
    Policy,
    BusinessOwner,
    Teams,
    CustomFields,
    DynamicScanApproval,
    ArcherAppName,
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProfileField::Name => columns::NEW_APPLICATION_NAME,
            ProfileField::BusinessCriticality => columns::BUSINESS_CRITICALITY,
            ProfileField::Description => columns::DESCRIPTION,
            ProfileField::Tags => columns::TAGS,
            ProfileField::BusinessUnit => columns::BUSINESS_UNIT,
            ProfileField::Policy => columns::POLICY,
            ProfileField::BusinessOwner => columns::BUSINESS_OWNER,
            ProfileField::Teams => columns::TEAMS,
            ProfileField::CustomFields => "Custom Fields",
            ProfileField::DynamicScanApproval => columns::DYNAMIC_SCAN_APPROVAL,
            ProfileField::ArcherAppName => columns::ARCHER_APPLICATION_NAME,
        };
        f.write_str(label)
    }
}
