//! Provider client error types.

/// Errors from fetching live station status.
///
/// Everything except [`ProviderError::Malformed`] means the provider was
/// unavailable for that station this cycle.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (connection refused, DNS, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The request did not complete in time
    #[error("request timed out")]
    Timeout,

    /// Provider returned a non-success status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Provider does not know this station
    #[error("station not found")]
    NotFound,

    /// Response body could not be understood
    #[error("malformed response: {message}")]
    Malformed {
        message: String,
        body: Option<String>,
    },

    /// Client could not be set up (bad base URL, unreadable mock data, ...)
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// True when the provider answered but the answer was unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ProviderError::Malformed { .. })
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Http(err)
        }
    }
}
