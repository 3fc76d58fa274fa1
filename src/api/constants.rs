//! Hosts, paths and headers for the Veracode REST API

/// Commercial region API host
pub const COMMERCIAL_HOST: &str = "api.veracode.com";

/// European region API host
pub const EUROPEAN_HOST: &str = "api.veracode.eu";

/// US federal region API host
pub const FEDERAL_HOST: &str = "api.veracode.us";

/// Page size requested from paged lookup endpoints
pub const PAGE_SIZE: u32 = 50;

/// User agent sent with every request
pub const USER_AGENT: &str = "bulk-app-update/0.1 (Rust)";

pub mod paths {
    pub const BUSINESS_UNITS: &str = "/api/authn/v2/business_units";
    pub const TEAMS: &str = "/api/authn/v2/teams";
    pub const POLICIES: &str = "/appsec/v1/policies";
    pub const APPLICATIONS: &str = "/appsec/v1/applications";
}

/// Keys of the `_embedded` collections returned by each lookup endpoint
pub mod embedded {
    pub const BUSINESS_UNITS: &str = "business_units";
    pub const TEAMS: &str = "teams";
    pub const POLICIES: &str = "policy_versions";
    pub const APPLICATIONS: &str = "applications";
}

pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const X_CORRELATION_ID: &str = "x-correlation-id";
}

/// Path (with query) of a single application profile
pub fn application_endpoint(guid: &str, partial: bool) -> String {
    if partial {
        format!("{}/{}?method=partial", paths::APPLICATIONS, guid)
    } else {
        format!("{}/{}", paths::APPLICATIONS, guid)
    }
}

/// Path with an encoded query string built from `params`
pub fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}
