//! Address → coordinate lookup and query-location resolution.
//!
//! Geocoding is treated as an oracle with a fail-soft contract: when it
//! cannot answer, the search falls back to the device position or the
//! configured default and carries a warning.

mod cache;
mod error;
mod nominatim;
mod resolve;

use std::future::Future;

use crate::domain::Coordinate;

pub use cache::{CachedGeocoder, GeocodeCacheConfig};
pub use error::GeocodeError;
pub use nominatim::{NominatimConfig, NominatimGeocoder};
pub use resolve::{
    LocationError, LocationRequest, LocationSource, LocationWarning, ResolvedLocation,
    resolve_location,
};

/// Resolves free text to a coordinate.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, text: &str) -> impl Future<Output = Result<Coordinate, GeocodeError>> + Send;
}
