//! Nominatim-compatible HTTP geocoder.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::domain::Coordinate;

use super::Geocoder;
use super::error::GeocodeError;

/// Default base URL for the geocoding service.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL; searches go to `{base_url}/search`
    pub base_url: String,
    /// User agent sent with every request (Nominatim requires one)
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NominatimConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: concat!("charger-watch/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 5,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// One search hit. Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Geocoder backed by a Nominatim-style `/search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent).map_err(|_| GeocodeError::Api {
            status: 0,
            message: "invalid user agent".to_string(),
        })?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, text: &str) -> Result<Coordinate, GeocodeError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("q", text), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_search_body(text, &body)
    }
}

fn parse_search_body(text: &str, body: &str) -> Result<Coordinate, GeocodeError> {
    let hits: Vec<SearchHit> = serde_json::from_str(body).map_err(|e| GeocodeError::Json {
        message: e.to_string(),
    })?;

    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NoMatch(text.to_string()))?;

    let parse = |s: &str| {
        s.trim().parse::<f64>().map_err(|e| GeocodeError::Json {
            message: format!("invalid coordinate {s:?}: {e}"),
        })
    };
    let coordinate = Coordinate::new(parse(&hit.lat)?, parse(&hit.lon)?);

    if !coordinate.is_finite() {
        return Err(GeocodeError::NoMatch(text.to_string()));
    }

    Ok(coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_first_hit() {
        let body = r#"[
            {"lat": "37.3688", "lon": "-122.0363", "display_name": "Sunnyvale"},
            {"lat": "0", "lon": "0"}
        ]"#;
        let c = parse_search_body("sunnyvale", body).unwrap();
        assert_eq!(c, Coordinate::new(37.3688, -122.0363));
    }

    #[test]
    fn empty_result_is_no_match() {
        let err = parse_search_body("nowhere", "[]").unwrap_err();
        assert!(matches!(err, GeocodeError::NoMatch(q) if q == "nowhere"));
    }

    #[test]
    fn bad_coordinate_is_parse_error() {
        let err = parse_search_body("x", r#"[{"lat": "north", "lon": "1"}]"#).unwrap_err();
        assert!(matches!(err, GeocodeError::Json { .. }));
    }

    #[test]
    fn non_array_is_parse_error() {
        let err = parse_search_body("x", r#"{"error": "rate limited"}"#).unwrap_err();
        assert!(matches!(err, GeocodeError::Json { .. }));
    }

    #[test]
    fn geocoder_creation() {
        let config = NominatimConfig::new("http://localhost:7070/").with_timeout(1);
        assert_eq!(config.timeout_secs, 1);
        assert!(NominatimGeocoder::new(config).is_ok());
    }
}
