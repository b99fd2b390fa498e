//! HTTP grid backend.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! One spreadsheet per client; the three backend calls map to
//! load (GET), batch update (POST) and batch get (POST).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sheetdb_config::Settings;
use sheetdb_engine::{BackendError, GridBackend};
use sheetdb_protocol::{
    BatchReadRequest, BatchReadResponse, BatchWriteRequest, BatchWriteResponse, GridSnapshot,
};

use crate::auth::{load_credentials, Credentials};

/// Grid service client (blocking).
#[derive(Clone)]
pub struct HttpGridClient {
    http: reqwest::blocking::Client,
    api_base: String,
    spreadsheet_id: String,
    token: String,
}

impl std::fmt::Debug for HttpGridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGridClient")
            .field("api_base", &self.api_base)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

/// Error type for building a client.
#[derive(Debug)]
pub enum ClientError {
    /// No credentials saved
    NotAuthenticated,
    /// Neither the credentials nor the settings name a spreadsheet
    NoSpreadsheet,
    /// The HTTP client could not be constructed
    Build(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotAuthenticated => write!(f, "Not authenticated: no saved credentials"),
            ClientError::NoSpreadsheet => write!(f, "No spreadsheet id in credentials or settings"),
            ClientError::Build(msg) => write!(f, "Failed to create HTTP client: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl HttpGridClient {
    /// Create a client using saved credentials, filling gaps from `settings`.
    pub fn from_saved_credentials(settings: &Settings) -> Result<Self, ClientError> {
        let creds = load_credentials().ok_or(ClientError::NotAuthenticated)?;
        Self::from_credentials(creds, settings)
    }

    /// Create a client from `creds`; empty fields fall back to `settings`.
    pub fn from_credentials(mut creds: Credentials, settings: &Settings) -> Result<Self, ClientError> {
        if creds.api_base.is_empty() {
            creds.api_base = settings.api_base.clone();
        }
        if creds.spreadsheet_id.is_empty() {
            creds.spreadsheet_id = settings.spreadsheet_id.clone();
        }
        if creds.spreadsheet_id.is_empty() {
            return Err(ClientError::NoSpreadsheet);
        }
        Self::new(creds, settings.timeout())
    }

    /// Create a client with explicit credentials.
    pub fn new(creds: Credentials, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("sheetdb/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            api_base: creds.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: creds.spreadsheet_id,
            token: creds.token,
        })
    }

    /// Client against an explicit base URL with the default timeout.
    pub fn with_base_url(token: &str, base_url: &str, spreadsheet_id: &str) -> Result<Self, ClientError> {
        Self::new(Credentials::new(token, base_url, spreadsheet_id), Settings::default().timeout())
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v1/spreadsheets/{}", self.api_base, self.spreadsheet_id)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, BackendError> {
        let response = self.http.get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        decode(check_status(response)?)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T, BackendError> {
        let response = self.http.post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        decode(check_status(response)?)
    }
}

impl GridBackend for HttpGridClient {
    fn load_grid(&self) -> Result<GridSnapshot, BackendError> {
        let url = format!("{}?includeGridData=true", self.spreadsheet_url());
        let snapshot: GridSnapshot = self.get(&url)?;
        log::debug!("Loaded {} sheets from {}", snapshot.sheets.len(), self.spreadsheet_id);
        Ok(snapshot)
    }

    fn batch_write(&self, request: &BatchWriteRequest) -> Result<BatchWriteResponse, BackendError> {
        let url = format!("{}:batchUpdate", self.spreadsheet_url());
        self.post_json(&url, request)
    }

    fn batch_read(&self, request: &BatchReadRequest) -> Result<BatchReadResponse, BackendError> {
        let url = format!("{}/values:batchGet", self.spreadsheet_url());
        self.post_json(&url, request)
    }
}

fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, BackendError> {
    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        if status == 422 || status == 400 {
            return Err(BackendError::Rejected(body));
        }
        return Err(BackendError::Http(status, body));
    }

    Ok(response)
}

fn decode<T: DeserializeOwned>(response: reqwest::blocking::Response) -> Result<T, BackendError> {
    response.json::<T>().map_err(|e| BackendError::Parse(e.to_string()))
}
