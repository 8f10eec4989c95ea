//! JSON API over the poll session monitor.
//!
//! This is the presentation boundary: it accepts search inputs and toggles,
//! and serves the latest cycle report.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppMonitor, AppState};
