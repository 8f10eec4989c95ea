//! Conversion from wire types to domain charge-point states.

use tracing::debug;

use crate::domain::{ChargePointLabel, ChargePointState, ChargeState, StationId};

use super::types::StationStatusResponse;

/// Live status of one station, as far as the provider reported it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationStatus {
    /// Name reported by the provider, if any.
    pub name: Option<String>,
    /// One entry per charge point, in response order.
    pub points: Vec<ChargePointState>,
}

/// Interpret a status response for `station`.
///
/// Never fails: a missing charge-point list yields zero points, entries
/// without a usable label are dropped, and entries without a state are
/// recorded as [`ChargeState::UNKNOWN`].
pub fn convert_status(station: &StationId, response: StationStatusResponse) -> StationStatus {
    let entries = response.evses.unwrap_or_default();
    let mut points = Vec::with_capacity(entries.len());

    for entry in entries {
        let Some(label) = entry.label.as_ref().and_then(|l| l.to_text()) else {
            debug!(station = %station, "dropping charge point without label");
            continue;
        };

        let state = match entry.state {
            Some(s) if !s.trim().is_empty() => ChargeState::new(s),
            _ => ChargeState::UNKNOWN,
        };

        points.push(ChargePointState::new(
            station.clone(),
            ChargePointLabel::new(label),
            state,
        ));
    }

    StationStatus {
        name: response.name,
        points,
    }
}
