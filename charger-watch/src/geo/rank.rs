//! Ranking catalog stations against a query point.

use serde::Serialize;

use crate::domain::{Coordinate, Station};

use super::distance::distance_km;

/// Where to search and how far.
///
/// Fixed for the lifetime of a poll session; a new query starts a new
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

impl QueryPoint {
    pub fn new(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_km,
        }
    }

    /// Query centred on `coordinate`.
    pub fn around(coordinate: Coordinate, radius_km: f64) -> Self {
        Self::new(coordinate.latitude, coordinate.longitude, radius_km)
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// A station within the query radius, annotated with its distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedStation {
    pub station: Station,
    /// Great-circle distance from the query point; always `>= 0`.
    pub distance_km: f64,
}

/// Rank `catalog` by distance from `query`.
///
/// Stations without finite coordinates are skipped, as are stations further
/// than `query.radius_km`. The result is sorted by ascending distance; equal
/// distances keep catalog order. Pure: the same inputs always give the same
/// output.
pub fn rank(catalog: &[Station], query: &QueryPoint) -> Vec<RankedStation> {
    let origin = query.coordinate();

    let mut ranked: Vec<RankedStation> = catalog
        .iter()
        .filter_map(|station| {
            let distance = distance_km(origin, station.coordinate()?)?;
            (distance <= query.radius_km).then(|| RankedStation {
                station: station.clone(),
                distance_km: distance,
            })
        })
        .collect();

    // sort_by is stable, which gives catalog order on ties
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}
