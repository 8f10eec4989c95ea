//! Geofencing: great-circle distance and radius-bounded ranking of the
//! station catalog.

mod distance;
mod rank;

pub use distance::{EARTH_RADIUS_KM, distance_km, haversine_km};
pub use rank::{QueryPoint, RankedStation, rank};
