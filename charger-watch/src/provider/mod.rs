//! Live charge-point status provider.
//!
//! The provider is an external service keyed by station id. Each call
//! returns the current state of every charge point at that station.
//!
//! Failure handling is per station: a transport failure or a non-2xx
//! status is reported as an error for that station only, and a response
//! with missing fields degrades to zero charge points. There is no retry
//! here; the next poll tick is the retry.

mod client;
mod convert;
mod error;
mod mock;
mod types;

use std::future::Future;

use crate::domain::StationId;

pub use client::{ProviderClient, ProviderConfig};
pub use convert::{StationStatus, convert_status};
pub use error::ProviderError;
pub use mock::MockProvider;
pub use types::{EvseEntry, EvseLabel, StationStatusResponse};

/// Source of live station status.
///
/// This abstraction allows the poll loop to be tested with scripted data.
pub trait StatusProvider: Send + Sync {
    /// Fetch the current state of every charge point at `station`.
    fn fetch(
        &self,
        station: &StationId,
    ) -> impl Future<Output = Result<StationStatus, ProviderError>> + Send;
}

/// The provider selected at start-up.
#[derive(Debug, Clone)]
pub enum ProviderBackend {
    /// Live HTTP provider
    Http(ProviderClient),
    /// JSON files on disk
    Mock(MockProvider),
}

impl StatusProvider for ProviderBackend {
    async fn fetch(&self, station: &StationId) -> Result<StationStatus, ProviderError> {
        match self {
            ProviderBackend::Http(client) => client.fetch(station).await,
            ProviderBackend::Mock(mock) => mock.fetch(station).await,
        }
    }
}
