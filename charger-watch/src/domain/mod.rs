//! Domain types for charging-station monitoring.
//!
//! Reference data (stations) and the live per-charge-point state reported
//! by the provider. These types carry no I/O.

mod charge_point;
mod station;

pub use charge_point::{ChargePointLabel, ChargePointState, ChargeState, PointKey};
pub use station::{Coordinate, Station, StationId};
