//! Choosing the query coordinate for a search.
//!
//! Precedence: geocoded search text, then the device's reported position,
//! then the configured default. A geocoding failure is a warning and falls
//! through to the next source.

use serde::Serialize;
use tracing::warn;

use crate::domain::Coordinate;

use super::Geocoder;

/// What the user asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationRequest {
    /// Free-text search (address, place name)
    pub query: Option<String>,
    /// Position reported by the user's device
    pub device: Option<Coordinate>,
}

/// Where the resolved coordinate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Search,
    Device,
    Default,
}

/// Non-fatal problems met while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationWarning {
    /// Search text could not be geocoded; another source was used instead
    #[error("could not locate {query:?} ({reason}), using fallback location")]
    GeocodeUnavailable { query: String, reason: String },
}

/// Resolution failed: no source produced a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("no location: no search match, device position or default coordinate")]
    CoordinateMissing,
}

/// A coordinate plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub source: LocationSource,
    pub warning: Option<LocationWarning>,
}

/// Resolve `request` to a coordinate.
pub async fn resolve_location<G: Geocoder>(
    geocoder: &G,
    request: &LocationRequest,
    default: Option<Coordinate>,
) -> Result<ResolvedLocation, LocationError> {
    let mut warning = None;

    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    if let Some(query) = query {
        match geocoder.geocode(query).await {
            Ok(coordinate) if coordinate.is_finite() => {
                return Ok(ResolvedLocation {
                    coordinate,
                    source: LocationSource::Search,
                    warning: None,
                });
            }
            Ok(_) => {
                warning = Some(LocationWarning::GeocodeUnavailable {
                    query: query.to_string(),
                    reason: "geocoder returned a non-finite coordinate".to_string(),
                });
            }
            Err(e) => {
                warn!(query = %query, error = %e, "geocoding failed, falling back");
                warning = Some(LocationWarning::GeocodeUnavailable {
                    query: query.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let fallback = request
        .device
        .filter(Coordinate::is_finite)
        .map(|c| (c, LocationSource::Device))
        .or_else(|| {
            default
                .filter(Coordinate::is_finite)
                .map(|c| (c, LocationSource::Default))
        });

    match fallback {
        Some((coordinate, source)) => Ok(ResolvedLocation {
            coordinate,
            source,
            warning,
        }),
        None => Err(LocationError::CoordinateMissing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::GeocodeError;

    /// Geocoder that knows exactly one place.
    struct OnePlace;

    impl Geocoder for OnePlace {
        async fn geocode(&self, text: &str) -> Result<Coordinate, GeocodeError> {
            if text == "Sunnyvale" {
                Ok(Coordinate::new(37.37, -122.04))
            } else {
                Err(GeocodeError::NoMatch(text.to_string()))
            }
        }
    }

    const DEVICE: Coordinate = Coordinate {
        latitude: 40.0,
        longitude: -74.0,
    };
    const DEFAULT: Coordinate = Coordinate {
        latitude: 37.3527,
        longitude: -122.0513,
    };

    #[tokio::test]
    async fn search_text_wins() {
        let request = LocationRequest {
            query: Some("Sunnyvale".into()),
            device: Some(DEVICE),
        };
        let resolved = resolve_location(&OnePlace, &request, Some(DEFAULT)).await.unwrap();
        assert_eq!(resolved.source, LocationSource::Search);
        assert_eq!(resolved.coordinate, Coordinate::new(37.37, -122.04));
        assert!(resolved.warning.is_none());
    }

    #[tokio::test]
    async fn failed_search_falls_back_to_device_with_warning() {
        let request = LocationRequest {
            query: Some("Atlantis".into()),
            device: Some(DEVICE),
        };
        let resolved = resolve_location(&OnePlace, &request, Some(DEFAULT)).await.unwrap();
        assert_eq!(resolved.source, LocationSource::Device);
        assert_eq!(resolved.coordinate, DEVICE);
        assert!(matches!(
            resolved.warning,
            Some(LocationWarning::GeocodeUnavailable { ref query, .. }) if query == "Atlantis"
        ));
    }

    #[tokio::test]
    async fn failed_search_falls_back_to_default() {
        let request = LocationRequest {
            query: Some("Atlantis".into()),
            device: None,
        };
        let resolved = resolve_location(&OnePlace, &request, Some(DEFAULT)).await.unwrap();
        assert_eq!(resolved.source, LocationSource::Default);
        assert!(resolved.warning.is_some());
    }

    #[tokio::test]
    async fn device_used_without_search() {
        let request = LocationRequest {
            query: Some("   ".into()),
            device: Some(DEVICE),
        };
        let resolved = resolve_location(&OnePlace, &request, Some(DEFAULT)).await.unwrap();
        assert_eq!(resolved.source, LocationSource::Device);
        assert!(resolved.warning.is_none());
    }

    #[tokio::test]
    async fn default_used_when_nothing_else() {
        let resolved = resolve_location(&OnePlace, &LocationRequest::default(), Some(DEFAULT))
            .await
            .unwrap();
        assert_eq!(resolved.source, LocationSource::Default);
        assert_eq!(resolved.coordinate, DEFAULT);
    }

    #[tokio::test]
    async fn non_finite_device_is_ignored() {
        let request = LocationRequest {
            query: None,
            device: Some(Coordinate::new(f64::NAN, 0.0)),
        };
        let resolved = resolve_location(&OnePlace, &request, Some(DEFAULT)).await.unwrap();
        assert_eq!(resolved.source, LocationSource::Default);
    }

    #[tokio::test]
    async fn nothing_resolves() {
        let request = LocationRequest {
            query: Some("Atlantis".into()),
            device: None,
        };
        let result = resolve_location(&OnePlace, &request, None).await;
        assert_eq!(result, Err(LocationError::CoordinateMissing));
    }
}
