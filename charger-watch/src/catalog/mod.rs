//! Station catalog: the read-only reference data that ranking runs over.
//!
//! Stations are loaded from a JSON file at start-up. Rows without
//! coordinates are kept here and filtered out by ranking.

mod error;
mod store;

pub use error::CatalogError;
pub use store::Catalog;
