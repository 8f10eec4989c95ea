//! Application state for the web layer.

use std::sync::Arc;

use crate::geocode::{CachedGeocoder, NominatimGeocoder};
use crate::notify::NotifierBackend;
use crate::poll::Monitor;
use crate::provider::ProviderBackend;

/// The monitor as wired up by the server binary.
pub type AppMonitor = Monitor<ProviderBackend, NotifierBackend, CachedGeocoder<NominatimGeocoder>>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Poll session supervisor
    pub monitor: Arc<AppMonitor>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(monitor: AppMonitor) -> Self {
        Self {
            monitor: Arc::new(monitor),
        }
    }
}
