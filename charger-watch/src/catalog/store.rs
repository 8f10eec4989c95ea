//! Read-only station catalog.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::{Station, StationId};

use super::error::CatalogError;

/// The fixed set of known stations.
///
/// Loaded once at start-up and shared read-only between sessions. Row order
/// is preserved, since ranking uses it to break distance ties.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    stations: Vec<Station>,
}

impl Catalog {
    /// Build a catalog from rows, dropping any repeated station id.
    pub fn from_stations(stations: Vec<Station>) -> Self {
        let mut seen: HashSet<StationId> = HashSet::with_capacity(stations.len());
        let stations = stations
            .into_iter()
            .filter(|s| {
                let fresh = seen.insert(s.id.clone());
                if !fresh {
                    warn!(station = %s.id, "duplicate station id in catalog, keeping first row");
                }
                fresh
            })
            .collect();

        Self { stations }
    }

    /// Load a catalog from a JSON file containing an array of stations.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();

        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let stations: Vec<Station> =
            serde_json::from_str(&json).map_err(|e| CatalogError::Json {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let catalog = Self::from_stations(stations);
        let located = catalog.stations.iter().filter(|s| s.coordinate().is_some()).count();
        debug!(
            path = %path.display(),
            stations = catalog.len(),
            located,
            "loaded station catalog"
        );

        Ok(catalog)
    }

    /// All stations, in catalog order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
