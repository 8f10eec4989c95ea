//! HTTP client for the live status provider.
//!
//! One GET per station per cycle; callers fan out across stations and the
//! semaphore caps how many requests are in flight at once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio::sync::Semaphore;
use tracing::trace;

use crate::domain::StationId;

use super::StatusProvider;
use super::convert::{StationStatus, convert_status};
use super::error::ProviderError;
use super::types::StationStatusResponse;

/// Default base URL for the status provider.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8089/api/v1";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL; status is fetched from `{base_url}/stations/{id}/status`
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Create a config pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Status provider API client.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: Url,
    semaphore: Arc<Semaphore>,
}

impl ProviderClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.max_concurrent == 0 {
            return Err(ProviderError::NotConfigured(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ProviderError::NotConfigured(format!("invalid base URL {:?}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::NotConfigured(format!(
                "base URL {:?} cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// `{base_url}/stations/{id}/status`, with the id percent-encoded as a
    /// single path segment.
    fn status_url(&self, station: &StationId) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::NotConfigured("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["stations", station.as_str(), "status"]);
        Ok(url)
    }

    /// Fetch the current status of one station.
    pub async fn get_station_status(
        &self,
        station: &StationId,
    ) -> Result<StationStatus, ProviderError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ProviderError::NotConfigured("semaphore closed".to_string()))?;

        let url = self.status_url(station)?;
        trace!(station = %station, url = %url, "fetching station status");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_status_body(station, &body)
    }
}

impl StatusProvider for ProviderClient {
    async fn fetch(&self, station: &StationId) -> Result<StationStatus, ProviderError> {
        self.get_station_status(station).await
    }
}

/// Parse a status body. Bodies that are empty, `null`, or not the expected
/// shape are reported as malformed.
pub(crate) fn parse_status_body(
    station: &StationId,
    body: &str,
) -> Result<StationStatus, ProviderError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(ProviderError::Malformed {
            message: "empty response body".to_string(),
            body: None,
        });
    }

    let response: StationStatusResponse =
        serde_json::from_str(trimmed).map_err(|e| ProviderError::Malformed {
            message: e.to_string(),
            body: Some(trimmed.chars().take(500).collect()),
        })?;

    Ok(convert_status(station, response))
}
