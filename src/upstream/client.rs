//! NeoWs API client
//!
//! Issues the three outbound calls the proxy needs and passes the JSON
//! bodies through untouched.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Public NASA API host
pub const DEFAULT_API_URL: &str = "https://api.nasa.gov";

/// Rate-limited demo key accepted by api.nasa.gov
pub const DEFAULT_API_KEY: &str = "DEMO";

/// Errors that can occur when calling the upstream API
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network failure, timeout, or undecodable body
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream responded with status {0}")]
    Status(StatusCode),
}

/// Client for the NeoWs REST endpoints
#[derive(Debug, Clone)]
pub struct NeoClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NeoClient {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Create a NeoClient around an existing HTTP client
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch close approaches between two dates (`YYYY-MM-DD`)
    pub async fn feed(&self, start_date: &str, end_date: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}neo/rest/v1/feed", self.base_url);
        let query = [
            ("start_date", start_date),
            ("end_date", end_date),
            ("api_key", self.api_key.as_str()),
        ];
        self.get_json(&url, &query).await
    }

    /// Fetch a single asteroid by its NeoWs id
    pub async fn lookup(&self, asteroid_id: i64) -> Result<Value, UpstreamError> {
        let url = format!("{}neo/rest/v1/neo/{}", self.base_url, asteroid_id);
        self.get_json(&url, &[("api_key", self.api_key.as_str())]).await
    }

    /// Fetch one page of the full asteroid catalogue
    ///
    /// A zero `page` or `size` is left out of the upstream query so the
    /// upstream defaults apply.
    pub async fn browse(&self, page: i64, size: i64) -> Result<Value, UpstreamError> {
        let url = format!("{}neo/rest/v1/neo/browse", self.base_url);

        let mut query = vec![("api_key", self.api_key.clone())];
        if page != 0 {
            query.push(("page", page.to_string()));
        }
        if size != 0 {
            query.push(("size", size.to_string()));
        }
        self.get_json(&url, &query).await
    }

    async fn get_json<Q>(&self, url: &str, query: &Q) -> Result<Value, UpstreamError>
    where
        Q: Serialize + ?Sized,
    {
        debug!(url, "Calling upstream");
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        Ok(response.json::<Value>().await?)
    }
}
