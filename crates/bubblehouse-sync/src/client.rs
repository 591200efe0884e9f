//! Delivery of the catalog payload to Bubblehouse.
//!
//! Exactly one request per [`SyncClient::send`]; a failed delivery is never
//! retried here and waits for the next cycle.

use std::time::Duration;

use bubblehouse_core::{SyncPayload, SyncSettings};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};

use crate::error::SyncError;
use crate::token::AuthToken;

const USER_AGENT: &str = "bubblehouse-sync/0.1";

/// Default delivery timeout in seconds.
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 60;

/// Classification of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    /// The service answered `200 OK`.
    Success,
    /// The service answered with any other status.
    Rejected(u16),
    /// No status line was obtained: DNS, connect, TLS or timeout failure.
    TransportError(String),
}

/// Builds `{base}/api/{api_version}/{shop_slug}/UpdateProducts3`.
///
/// # Errors
///
/// Returns [`SyncError::InvalidEndpoint`] when the configured host does not
/// form a valid URL.
pub fn sync_endpoint(settings: &SyncSettings, api_version: &str) -> Result<Url, SyncError> {
    let raw = format!(
        "{}/api/{}/{}/UpdateProducts3",
        settings.base_url(),
        api_version,
        settings.shop_slug
    );
    Url::parse(&raw).map_err(|e| SyncError::InvalidEndpoint {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

/// HTTP client for the `UpdateProducts3` endpoint.
#[derive(Debug, Clone)]
pub struct SyncClient {
    client: Client,
}

impl SyncClient {
    /// Creates a client whose requests time out after `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Client`] if the underlying HTTP client cannot be
    /// built.
    pub fn new(timeout_secs: u64) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(SyncError::Client)?;
        Ok(Self { client })
    }

    /// Posts `payload` to `endpoint` with `token` as bearer credential.
    pub async fn send(&self, payload: &SyncPayload, token: &AuthToken, endpoint: &Url) -> SyncResult {
        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => return SyncResult::TransportError(format!("failed to serialize payload: {e}")),
        };

        let response = self
            .client
            .post(endpoint.clone())
            .header(AUTHORIZATION, format!("Bearer {}", token.as_str()))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status() == StatusCode::OK => SyncResult::Success,
            Ok(resp) => SyncResult::Rejected(resp.status().as_u16()),
            Err(e) => SyncResult::TransportError(error_chain(&e)),
        }
    }
}

/// Renders an error and its sources as `outer: inner: root`.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
