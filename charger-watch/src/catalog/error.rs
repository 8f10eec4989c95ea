//! Catalog error types.

use std::path::PathBuf;

/// Errors that can occur while loading the station catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read
    #[error("failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not a JSON array of stations
    #[error("failed to parse catalog {path:?}: {message}")]
    Json { path: PathBuf, message: String },
}
