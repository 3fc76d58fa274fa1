use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::api::constants;

const KEY_ID: &str = "VERACODE_API_KEY_ID";
const KEY_SECRET: &str = "VERACODE_API_KEY_SECRET";
const LEGACY_KEY_ID: &str = "veracode_api_key_id";
const LEGACY_KEY_SECRET: &str = "veracode_api_key_secret";
const PROFILE: &str = "VERACODE_API_PROFILE";

/// Platform region, picked from the key id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Commercial,
    European,
    Federal,
}

impl Region {
    pub fn host(&self) -> &'static str {
        match self {
            Region::Commercial => constants::COMMERCIAL_HOST,
            Region::European => constants::EUROPEAN_HOST,
            Region::Federal => constants::FEDERAL_HOST,
        }
    }

    fn from_prefix(value: &str) -> Option<(Region, &str)> {
        if let Some(rest) = value.strip_prefix("vera01ei-") {
            Some((Region::European, rest))
        } else if let Some(rest) = value.strip_prefix("vera01es-") {
            Some((Region::Federal, rest))
        } else {
            None
        }
    }
}

/// API key pair with any region prefix already stripped
#[derive(Clone)]
pub struct Credentials {
    pub api_key_id: String,
    pub api_key_secret: String,
    pub region: Region,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key_id", &self.api_key_id)
            .field("api_key_secret", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

impl Credentials {
    pub fn new(api_key_id: &str, api_key_secret: &str) -> Self {
        let (region, id) = Region::from_prefix(api_key_id.trim())
            .unwrap_or((Region::Commercial, api_key_id.trim()));
        let secret = Region::from_prefix(api_key_secret.trim())
            .map(|(_, rest)| rest)
            .unwrap_or(api_key_secret.trim());

        Credentials {
            api_key_id: id.to_string(),
            api_key_secret: secret.to_string(),
            region,
        }
    }

    /// Environment variables first, then the credentials file
    pub fn load() -> Result<Credentials> {
        if let Some(credentials) = Self::from_vars(|key| std::env::var(key).ok()) {
            info!("Using API credentials from environment variables");
            return Ok(credentials);
        }

        let profile = std::env::var(PROFILE).unwrap_or_else(|_| "default".to_string());
        let path = default_credentials_path().context(
            "No API credentials found: set VERACODE_API_KEY_ID and VERACODE_API_KEY_SECRET",
        )?;
        Self::from_credentials_file(&path, &profile)
    }

    /// Reads the current upper-case names, falling back to the legacy lower-case ones
    pub fn from_vars<F>(get: F) -> Option<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let pair = non_empty(KEY_ID)
            .zip(non_empty(KEY_SECRET))
            .or_else(|| non_empty(LEGACY_KEY_ID).zip(non_empty(LEGACY_KEY_SECRET)))?;

        Some(Credentials::new(&pair.0, &pair.1))
    }

    pub fn from_credentials_file(path: &Path, profile: &str) -> Result<Credentials> {
        info!("Reading API credentials from {} [{}]", path.display(), profile);

        if !path.exists() {
            anyhow::bail!(
                "No API credentials found: set VERACODE_API_KEY_ID and VERACODE_API_KEY_SECRET or create {}",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;

        let (id, secret) = parse_credentials_file(&contents, profile).with_context(|| {
            format!(
                "Profile [{}] in {} is missing veracode_api_key_id or veracode_api_key_secret",
                profile,
                path.display()
            )
        })?;

        Ok(Credentials::new(&id, &secret))
    }
}

fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".veracode").join("credentials"))
}

/// Pulls the key pair for `profile` out of an INI-style credentials file
pub fn parse_credentials_file(contents: &str, profile: &str) -> Option<(String, String)> {
    let mut in_profile = false;
    let mut id = None;
    let mut secret = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            continue;
        }

        if !in_profile {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            match key.trim() {
                LEGACY_KEY_ID => id = Some(value.trim().to_string()),
                LEGACY_KEY_SECRET => secret = Some(value.trim().to_string()),
                other => debug!("Ignoring credentials key {}", other),
            }
        }
    }

    id.zip(secret)
}
