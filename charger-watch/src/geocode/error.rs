//! Geocoder error types.

/// Errors from resolving search text to a coordinate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Geocoding service returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Nothing matched the search text
    #[error("no match for {0:?}")]
    NoMatch(String),

    /// Failed to parse the response
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        GeocodeError::Http(err.to_string())
    }
}
