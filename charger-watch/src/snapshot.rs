//! Snapshot assembly: one row per (station, charge point) for a poll cycle.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::domain::{ChargePointState, ChargeState, PointKey, StationId};
use crate::geo::RankedStation;
use crate::provider::{ProviderError, StationStatus};

/// Result of fetching one station during a cycle.
pub type FetchOutcome = Result<StationStatus, ProviderError>;

/// One charge point as observed in a cycle, annotated for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub point: ChargePointState,
    /// Catalog name of the station
    pub station_name: String,
    /// Distance of the station from the query point
    pub distance_km: f64,
}

impl SnapshotRow {
    pub fn key(&self) -> &PointKey {
        &self.point.key
    }

    pub fn state(&self) -> &ChargeState {
        &self.point.state
    }
}

/// Every charge-point state observed in one poll cycle.
///
/// Rows follow station distance order, then the provider's order within a
/// station. Keys are unique within a snapshot built by [`build`].
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    taken_at: DateTime<Utc>,
    rows: Vec<SnapshotRow>,
}

impl Snapshot {
    /// The snapshot before the first poll: no rows.
    pub fn empty() -> Self {
        Self {
            taken_at: DateTime::<Utc>::MIN_UTC,
            rows: Vec::new(),
        }
    }

    /// Wrap pre-assembled rows.
    pub fn from_rows(taken_at: DateTime<Utc>, rows: Vec<SnapshotRow>) -> Self {
        Self { taken_at, rows }
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows indexed by key. On a repeated key the first row wins.
    pub fn index(&self) -> HashMap<&PointKey, &SnapshotRow> {
        let mut index = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            index.entry(row.key()).or_insert(row);
        }
        index
    }

    /// Look up one charge point.
    pub fn get(&self, key: &PointKey) -> Option<&SnapshotRow> {
        self.rows.iter().find(|r| r.key() == key)
    }
}

/// Merge per-station fetch results into a snapshot.
///
/// Stations are visited in `ranked` order and each station's charge points
/// are flattened into rows. A station whose fetch failed, or which is
/// missing from `results`, contributes no rows. A key repeated within one
/// response keeps its first row.
pub fn build(
    ranked: &[RankedStation],
    results: &HashMap<StationId, FetchOutcome>,
    taken_at: DateTime<Utc>,
) -> Snapshot {
    let mut seen: HashSet<PointKey> = HashSet::new();
    let mut rows = Vec::new();

    for entry in ranked {
        let Some(Ok(status)) = results.get(&entry.station.id) else {
            continue;
        };

        for point in &status.points {
            if !seen.insert(point.key.clone()) {
                continue;
            }
            rows.push(SnapshotRow {
                point: point.clone(),
                station_name: entry.station.name.clone(),
                distance_km: entry.distance_km,
            });
        }
    }

    Snapshot { taken_at, rows }
}
