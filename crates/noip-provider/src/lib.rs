// # No-IP Update Provider
//
// This crate provides the HTTP update client for No-IP and other services
// speaking the same dyndns2 `/nic/update` protocol.
//
// ## Behaviour
//
// - One HTTPS GET per call, no retry, no back-off (owned by UpdateScheduler)
// - Credentials travel in a Basic `Authorization` header, never in the URL
// - Any network, TLS or timeout failure and any non-2xx status is returned
//   as a `TransportError`; the caller is never panicked or raised at
// - The response body is returned untouched for classification
//
// ## Security Requirements
//
// - Username and password NEVER appear in logs or error strings
// - `UpdateRequest` redacts its Authorization value in `Debug`
//
// ## API Reference
//
// ```http
// GET /nic/update?hostname=home.ddns.net
// Host: dynupdate.no-ip.com
// Authorization: Basic base64(username:password)
// User-Agent: noipd/0.1.0 admin@example.com
// ```

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use noip_core::config::Configuration;
use noip_core::traits::UpdateTransport;
use noip_core::{Error, Result, TransportError};
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use std::fmt;
use std::time::Duration;

/// No-IP update host
pub const NOIP_UPDATE_BASE: &str = "https://dynupdate.no-ip.com";

/// Path of the dyndns2 update endpoint
const UPDATE_PATH: &str = "/nic/update";

/// Default HTTP timeout for update requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the User-Agent the provider requires: client name, version and a
/// contact address
pub fn user_agent(client: &str, version: &str, contact: &str) -> String {
    format!("{client}/{version} {contact}")
}

/// One update request, built fresh for every attempt
///
/// Never persisted. The Authorization value is redacted from `Debug`.
#[derive(Clone)]
pub struct UpdateRequest {
    pub url: Url,
    pub authorization: String,
    pub user_agent: String,
}

impl UpdateRequest {
    /// Build the request for `config` against `base_url`
    ///
    /// The hostname is query-escaped.
    pub fn build(base_url: &str, config: &Configuration, user_agent: &str) -> Result<Self> {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), UPDATE_PATH);
        let url = Url::parse_with_params(&endpoint, [("hostname", config.hostname.as_str())])
            .map_err(|e| Error::config(format!("Invalid provider URL {}: {}", base_url, e)))?;

        let credentials = format!("{}:{}", config.username, config.password);
        let authorization = format!("Basic {}", BASE64.encode(credentials));

        Ok(Self {
            url,
            authorization,
            user_agent: user_agent.to_string(),
        })
    }
}

impl fmt::Debug for UpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRequest")
            .field("url", &self.url.as_str())
            .field("authorization", &"<REDACTED>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// No-IP update client
///
/// Isolated, stateless and single-shot. All coordination (retries,
/// intervals, reconfiguration) is owned by `UpdateScheduler`.
#[derive(Debug, Clone)]
pub struct NoIpClient {
    /// Provider base URL (scheme + host)
    base_url: String,

    /// HTTP client for update requests
    client: reqwest::Client,
}

impl NoIpClient {
    /// Create a client for the No-IP update host
    ///
    /// # Parameters
    ///
    /// - `timeout`: Whole-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: NOIP_UPDATE_BASE.to_string(),
            client,
        })
    }

    /// Use another dyndns2-compatible host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Provider base URL in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: UpdateRequest) -> std::result::Result<String, TransportError> {
        let response = self
            .client
            .get(request.url)
            .header(AUTHORIZATION, request.authorization)
            .header(USER_AGENT, request.user_agent)
            .send()
            .await
            .map_err(|e| TransportError::new(describe(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("Failed to read response: {}", describe(&e))))?;

        if !status.is_success() {
            return Err(TransportError::new(format!(
                "Provider returned HTTP {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(body)
    }
}

/// Human-readable reason for a reqwest failure
///
/// reqwest errors carry the request URL, which holds only the hostname.
fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Request timed out: {}", e)
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        format!("HTTP request failed: {}", e)
    }
}

#[async_trait]
impl UpdateTransport for NoIpClient {
    async fn perform_update(
        &self,
        config: &Configuration,
        user_agent: &str,
    ) -> std::result::Result<String, TransportError> {
        let request = UpdateRequest::build(&self.base_url, config, user_agent)
            .map_err(|e| TransportError::new(e.to_string()))?;

        match self.send(request).await {
            Ok(body) => {
                tracing::debug!("Update API answered for {}", config.hostname);
                Ok(body)
            }
            Err(e) => {
                tracing::error!("Connection error: {}", e.reason);
                Err(e)
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "noip"
    }
}
