//! Veracode platform REST API
//!
//! Lookups for business units, policies, teams and applications, plus the
//! application profile update call. Everything above this module talks to the
//! platform through the [`PlatformApi`] trait so it can run against a fake.

pub mod client;
pub mod constants;
pub mod error;
pub mod models;
pub mod resilience;

use async_trait::async_trait;

pub use client::VeracodeClient;
pub use error::ApiError;
pub use models::{
    Application, BusinessOwner, BusinessUnit, CustomField, GuidRef, Policy, Profile,
    ProfilePayload, Team, UpdateMode, UpdateRequest, UpdateResponse,
};
pub use resilience::{RetryConfig, RetryExhausted, RetryPolicy};

/// Operations the bulk updater needs from the platform
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Business units whose name matches the filter
    async fn business_units(&self, name: &str) -> Result<Vec<BusinessUnit>, ApiError>;

    /// Policies whose name matches the filter
    async fn policies(&self, name: &str) -> Result<Vec<Policy>, ApiError>;

    /// Teams whose name matches the filter
    async fn teams(&self, name: &str) -> Result<Vec<Team>, ApiError>;

    /// Application profiles whose name matches the filter
    async fn applications(&self, name: &str) -> Result<Vec<Application>, ApiError>;

    /// Submit a profile update. Non-success statuses are returned, not raised.
    async fn update_application(
        &self,
        guid: &str,
        request: &UpdateRequest,
        mode: UpdateMode,
    ) -> Result<UpdateResponse, ApiError>;
}
