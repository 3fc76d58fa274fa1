//! Per-row failures
//!
//! Every variant is recorded as the row's status text and the run moves on.

use std::fmt;
use thiserror::Error;

use crate::api::{ApiError, RetryExhausted};
use crate::profile::ProfileField;

/// Kind of platform entity looked up by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Application,
    BusinessUnit,
    Policy,
    Team,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Application => "Application",
            EntityKind::BusinessUnit => "Business Unit",
            EntityKind::Policy => "Policy",
            EntityKind::Team => "Team",
        })
    }
}

#[derive(Debug, Error)]
pub enum RowError {
    /// No candidate matched the name exactly
    #[error("{}", not_found_message(.kind, .name))]
    NotFound { kind: EntityKind, name: String },

    /// The lookup call kept failing
    #[error("Lookup of {kind} '{name}' failed: {source}")]
    Lookup {
        kind: EntityKind,
        name: String,
        #[source]
        source: RetryExhausted,
    },

    #[error("Invalid {field} value '{value}': {reason}")]
    Invalid {
        field: ProfileField,
        value: String,
        reason: String,
    },

    /// The update endpoint answered with a non-success status
    #[error("Update failed with HTTP status {status}{}", body_suffix(.body))]
    Update { status: u16, body: String },

    #[error("Update request failed: {0}")]
    Api(#[from] ApiError),
}

impl RowError {
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        RowError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RowError::NotFound { .. })
    }
}

fn not_found_message(kind: &EntityKind, name: &str) -> String {
    match kind {
        EntityKind::Application => format!("Application not found: {}", name),
        other => format!("Unable to find a {} named {}", other, name),
    }
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            RowError::not_found(EntityKind::BusinessUnit, "Finance").to_string(),
            "Unable to find a Business Unit named Finance"
        );
        assert_eq!(
            RowError::not_found(EntityKind::Application, "Payments").to_string(),
            "Application not found: Payments"
        );
    }

    #[test]
    fn test_update_message_carries_status_and_body() {
        let error = RowError::Update {
            status: 400,
            body: r#"{"message":"bad request"}"#.to_string(),
        };
        assert_eq!(
            error.to_string(),
            r#"Update failed with HTTP status 400: {"message":"bad request"}"#
        );

        let empty = RowError::Update {
            status: 502,
            body: " ".to_string(),
        };
        assert_eq!(empty.to_string(), "Update failed with HTTP status 502");
    }
}
