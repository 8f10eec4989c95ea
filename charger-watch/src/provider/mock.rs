//! Mock status provider for development without provider access.
//!
//! Loads one status response per station from JSON files and serves them
//! as if they were live API responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::domain::StationId;

use super::StatusProvider;
use super::client::parse_status_body;
use super::convert::StationStatus;
use super::error::ProviderError;

/// Mock provider that serves raw status bodies read from disk.
///
/// Bodies are kept unparsed so a broken file behaves like a malformed
/// provider response rather than failing the load.
#[derive(Debug, Clone)]
pub struct MockProvider {
    bodies: Arc<HashMap<StationId, String>>,
}

impl MockProvider {
    /// Load every `{station_id}.json` file in `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let bodies = load_dir(data_dir.as_ref())?;
        Ok(Self {
            bodies: Arc::new(bodies),
        })
    }

    /// Stations with mock data.
    pub fn available_stations(&self) -> Vec<StationId> {
        let mut ids: Vec<StationId> = self.bodies.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl StatusProvider for MockProvider {
    async fn fetch(&self, station: &StationId) -> Result<StationStatus, ProviderError> {
        let body = self.bodies.get(station).ok_or(ProviderError::NotFound)?;
        parse_status_body(station, body)
    }
}

fn load_dir(data_dir: &Path) -> Result<HashMap<StationId, String>, ProviderError> {
    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        ProviderError::NotConfigured(format!("failed to read mock data directory: {e}"))
    })?;

    let mut bodies = HashMap::new();

    for entry in entries {
        let entry = entry.map_err(|e| {
            ProviderError::NotConfigured(format!("failed to read directory entry: {e}"))
        })?;

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let body = std::fs::read_to_string(&path)
            .map_err(|e| ProviderError::NotConfigured(format!("failed to read {path:?}: {e}")))?;

        bodies.insert(StationId::new(stem), body);
    }

    if bodies.is_empty() {
        return Err(ProviderError::NotConfigured(format!(
            "no mock status files found in {data_dir:?}"
        )));
    }

    Ok(bodies)
}
