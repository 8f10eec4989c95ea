//! Great-circle distance.

use crate::domain::Coordinate;

/// Mean Earth radius used for all distance calculations, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometres.
///
/// Inputs are not validated; non-finite components produce a non-finite
/// result. Use [`distance_km`] when either side may be missing.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance in kilometres, or `None` when any of the four coordinates is not
/// a finite number.
pub fn distance_km(a: Coordinate, b: Coordinate) -> Option<f64> {
    if !a.is_finite() || !b.is_finite() {
        return None;
    }
    let d = haversine_km(a, b);
    d.is_finite().then_some(d)
}
