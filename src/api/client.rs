use super::constants::{self, embedded, headers, paths};
use super::error::ApiError;
use super::models::{
    Application, BusinessUnit, Policy, Team, UpdateMode, UpdateRequest, UpdateResponse,
};
use super::PlatformApi;
use crate::auth::{Credentials, HmacSigner};
use anyhow::Context;
use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// HMAC-signed client for the Veracode REST API
#[derive(Clone)]
pub struct VeracodeClient {
    base_url: String,
    host: String,
    http_client: reqwest::Client,
    signer: HmacSigner,
}

impl VeracodeClient {
    /// Client for the credentials' region, or for `base_url` when given
    pub fn new(credentials: &Credentials, base_url: Option<&str>) -> anyhow::Result<Self> {
        let base_url = match base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", credentials.region.host()),
        };
        let host = base_url
            .split("://")
            .nth(1)
            .unwrap_or(&base_url)
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(constants::USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            host,
            http_client,
            signer: HmacSigner::new(credentials)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sign and send one request. `url` is the path plus query string.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&UpdateRequest>,
    ) -> Result<reqwest::Response, ApiError> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        let authorization = self.signer.authorization(&self.host, url, method.as_str());
        debug!("{} {} [{}]", method, url, correlation_id);

        let mut request = self
            .http_client
            .request(method, format!("{}{}", self.base_url, url))
            .header("Authorization", authorization)
            .header("Accept", headers::CONTENT_TYPE_JSON)
            .header(headers::X_CORRELATION_ID, &correlation_id);

        if let Some(body) = body {
            request = request
                .header("Content-Type", headers::CONTENT_TYPE_JSON)
                .json(body);
        }

        let response = request.send().await?;
        debug!("HTTP {} [{}]", response.status().as_u16(), correlation_id);
        Ok(response)
    }

    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let response = self.send(Method::GET, url, None).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            return Err(ApiError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Walk every page of a lookup endpoint
    async fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[(&str, String)],
        key: &str,
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut page = 0u32;

        loop {
            let mut params = filters.to_vec();
            params.push(("page", page.to_string()));
            params.push(("size", constants::PAGE_SIZE.to_string()));

            let body = self.get_json(&constants::with_query(path, &params)).await?;
            let (mut found, total_pages) = parse_page::<T>(body, key)?;
            items.append(&mut found);

            page += 1;
            if page >= total_pages {
                return Ok(items);
            }
        }
    }
}

/// Items under `_embedded.<key>` plus the page count (1 when unpaged)
fn parse_page<T: DeserializeOwned>(mut body: Value, key: &str) -> Result<(Vec<T>, u32), ApiError> {
    let total_pages = body
        .pointer("/page/total_pages")
        .and_then(Value::as_u64)
        .unwrap_or(1) as u32;

    let items = match body.pointer_mut(&format!("/_embedded/{}", key)) {
        Some(value) => serde_json::from_value(value.take())?,
        None => Vec::new(),
    };

    Ok((items, total_pages))
}

#[async_trait]
impl PlatformApi for VeracodeClient {
    async fn business_units(&self, name: &str) -> Result<Vec<BusinessUnit>, ApiError> {
        self.get_paged(
            paths::BUSINESS_UNITS,
            &[("bu_name", name.to_string())],
            embedded::BUSINESS_UNITS,
        )
        .await
    }

    async fn policies(&self, name: &str) -> Result<Vec<Policy>, ApiError> {
        self.get_paged(paths::POLICIES, &[("name", name.to_string())], embedded::POLICIES)
            .await
    }

    async fn teams(&self, name: &str) -> Result<Vec<Team>, ApiError> {
        self.get_paged(
            paths::TEAMS,
            &[("team_name", name.to_string()), ("all_for_org", "true".to_string())],
            embedded::TEAMS,
        )
        .await
    }

    async fn applications(&self, name: &str) -> Result<Vec<Application>, ApiError> {
        self.get_paged(
            paths::APPLICATIONS,
            &[("name", name.to_string())],
            embedded::APPLICATIONS,
        )
        .await
    }

    async fn update_application(
        &self,
        guid: &str,
        request: &UpdateRequest,
        mode: UpdateMode,
    ) -> Result<UpdateResponse, ApiError> {
        let url = constants::application_endpoint(
            &urlencoding::encode(guid),
            mode == UpdateMode::Partial,
        );
        let response = self.send(Method::PUT, &url, Some(request)).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(UpdateResponse { status, body })
    }
}
