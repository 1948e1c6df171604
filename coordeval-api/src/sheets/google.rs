//! Google Sheets API v4 client
//!
//! Authenticates as a service account (OAuth2 JWT-bearer grant) and appends
//! rows with `spreadsheets.values.append`, `valueInputOption=RAW`. The access
//! token is cached until shortly before it expires.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coordeval_common::config::ServiceAccountCredentials;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use super::{MirrorError, SheetMirror, SheetTarget};

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const USER_AGENT: &str = concat!("coordeval/", env!("CARGO_PKG_VERSION"));
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Serialize)]
struct ValueRange<'a> {
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: &'a [Vec<Value>],
}

struct CachedToken {
    value: String,
    refresh_after: DateTime<Utc>,
}

/// Service-account Sheets client
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    credentials: Option<ServiceAccountCredentials>,
    token_url: String,
    api_base: String,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsClient {
    /// Client for the public Google endpoints
    ///
    /// Without credentials every append fails with
    /// [`MirrorError::MissingCredentials`].
    pub fn new(credentials: Option<ServiceAccountCredentials>) -> Result<Self, MirrorError> {
        Self::with_endpoints(credentials, TOKEN_URL, SHEETS_API_BASE)
    }

    /// Client for custom token and API endpoints
    pub fn with_endpoints(
        credentials: Option<ServiceAccountCredentials>,
        token_url: &str,
        api_base: &str,
    ) -> Result<Self, MirrorError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MirrorError::Network(e.to_string()))?;

        Ok(Self {
            http,
            credentials,
            token_url: token_url.to_string(),
            api_base: api_base.to_string(),
            token: Mutex::new(None),
        })
    }

    /// `values:append` URL for the first cell of the target tab
    pub fn append_url(&self, target: &SheetTarget) -> Result<reqwest::Url, MirrorError> {
        let mut url = reqwest::Url::parse(&self.api_base)
            .map_err(|e| MirrorError::Network(format!("invalid Sheets API URL: {}", e)))?;
        let range = format!("{}!A1:append", target.sheet_name);

        url.path_segments_mut()
            .map_err(|_| MirrorError::Network("invalid Sheets API URL".to_string()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                target.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        Ok(url)
    }

    async fn access_token(&self) -> Result<String, MirrorError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(MirrorError::MissingCredentials)?;

        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.refresh_after > now {
                return Ok(token.value.clone());
            }
        }

        let assertion = signed_assertion(credentials, &self.token_url, now.timestamp())?;
        debug!(client_email = %credentials.client_email, "Requesting Sheets access token");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| MirrorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MirrorError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| MirrorError::Auth(format!("unreadable token response: {}", e)))?;

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_after: now + token_lifetime(token.expires_in),
        });

        Ok(token.access_token)
    }
}

/// How long a token reported to live `expires_in` seconds stays cached
///
/// The reported value is clamped to `0..=MAX_TOKEN_LIFETIME_SECS`; a token
/// with less than the refresh margin left is refetched on the next append.
fn token_lifetime(expires_in: i64) -> chrono::Duration {
    chrono::Duration::seconds(expires_in.clamp(0, MAX_TOKEN_LIFETIME_SECS) - TOKEN_REFRESH_MARGIN_SECS)
}

/// RS256-signed JWT asserting the service account identity
fn signed_assertion(
    credentials: &ServiceAccountCredentials,
    audience: &str,
    issued_at: i64,
) -> Result<String, MirrorError> {
    let claims = Claims {
        iss: credentials.client_email.clone(),
        scope: SHEETS_SCOPE.to_string(),
        aud: audience.to_string(),
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };

    let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
        .map_err(|e| MirrorError::Auth(format!("invalid private key: {}", e)))?;

    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| MirrorError::Auth(format!("cannot sign assertion: {}", e)))
}

#[async_trait]
impl SheetMirror for GoogleSheetsClient {
    async fn append_rows(&self, target: &SheetTarget, rows: Vec<Vec<Value>>) -> Result<usize, MirrorError> {
        if target.spreadsheet_id.trim().is_empty() {
            return Err(MirrorError::MissingSpreadsheet);
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let token = self.access_token().await?;
        let url = self.append_url(target)?;

        debug!(
            spreadsheet = %target.spreadsheet_id,
            sheet = %target.sheet_name,
            rows = rows.len(),
            "Appending rows to spreadsheet"
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&ValueRange {
                major_dimension: "ROWS",
                values: &rows,
            })
            .send()
            .await
            .map_err(|e| MirrorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MirrorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(rows.len())
    }
}
