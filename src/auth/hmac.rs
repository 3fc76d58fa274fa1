//! Veracode HMAC request signing
//!
//! Each request is signed with a key derived from the API secret through a
//! nonce, the millisecond timestamp and a fixed version string.

use anyhow::{Result, bail};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use super::credentials::Credentials;

type HmacSha256 = Hmac<Sha256>;

const SCHEME: &str = "VERACODE-HMAC-SHA-256";
const REQUEST_VERSION: &[u8] = b"vcode_request_version_1";

#[derive(Clone)]
pub struct HmacSigner {
    api_key_id: String,
    secret: Vec<u8>,
}

impl HmacSigner {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let Some(secret) = decode_hex(&credentials.api_key_secret) else {
            bail!("API key secret is not a valid hex string");
        };

        Ok(Self {
            api_key_id: credentials.api_key_id.clone(),
            secret,
        })
    }

    /// `Authorization` header value for a request to `host` + `url`
    pub fn authorization(&self, host: &str, url: &str, method: &str) -> String {
        let nonce: [u8; 16] = rand::thread_rng().r#gen();
        let timestamp = chrono::Utc::now().timestamp_millis();
        self.sign(host, url, method, &nonce, timestamp)
    }

    pub fn sign(&self, host: &str, url: &str, method: &str, nonce: &[u8], timestamp: i64) -> String {
        let data = format!(
            "id={}&host={}&url={}&method={}",
            self.api_key_id, host, url, method
        );

        let key_nonce = hmac_sha256(&self.secret, nonce);
        let key_date = hmac_sha256(&key_nonce, timestamp.to_string().as_bytes());
        let signature_key = hmac_sha256(&key_date, REQUEST_VERSION);
        let signature = hmac_sha256(&signature_key, data.as_bytes());

        format!(
            "{} id={},ts={},nonce={},sig={}",
            SCHEME,
            self.api_key_id,
            timestamp,
            encode_hex(nonce),
            encode_hex(&signature)
        )
    }
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC takes keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn decode_hex(value: &str) -> Option<Vec<u8>> {
    if !value.is_ascii() || value.len() % 2 != 0 {
        return None;
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).ok())
        .collect()
}
