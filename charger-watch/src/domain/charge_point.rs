//! Charge-point (EVSE) state types.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::StationId;

/// Occupancy state reported by the provider for one charge point.
///
/// The provider's vocabulary is open: new values may appear at any time, so
/// this is a string wrapper rather than a closed enum. Only the named
/// constants below carry meaning inside the crate; anything else is passed
/// through untouched. Values are compared exactly as received.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChargeState(Cow<'static, str>);

impl ChargeState {
    /// A vehicle is connected and drawing power.
    pub const CHARGING: ChargeState = ChargeState(Cow::Borrowed("CHARGING"));
    /// A vehicle is connected but the session has stopped drawing power.
    pub const CHARGE_STOPPED: ChargeState = ChargeState(Cow::Borrowed("CHARGE_STOPPED"));
    /// The connector has been unplugged and the point is free.
    pub const PLUGGED_OUT: ChargeState = ChargeState(Cow::Borrowed("PLUGGED_OUT"));
    /// Idle, as reported by the provider.
    pub const IDLE: ChargeState = ChargeState(Cow::Borrowed("IDLE"));
    /// State could not be determined.
    pub const UNKNOWN: ChargeState = ChargeState(Cow::Borrowed("UNKNOWN"));

    /// Wrap a provider state string.
    pub fn new(state: impl Into<String>) -> Self {
        Self(Cow::Owned(state.into()))
    }

    /// Returns the raw state string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for states in which the point is occupied by a vehicle.
    pub fn is_occupied(&self) -> bool {
        *self == Self::CHARGING || *self == Self::CHARGE_STOPPED
    }

    /// True for the state that signals the point has become free.
    pub fn is_available(&self) -> bool {
        *self == Self::PLUGGED_OUT
    }
}

impl From<String> for ChargeState {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ChargeState {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ChargeState> for String {
    fn from(state: ChargeState) -> Self {
        state.0.into_owned()
    }
}

impl fmt::Debug for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChargeState({})", self.0)
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label of a charge point within its station (e.g. "1", "A2").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChargePointLabel(String);

impl ChargePointLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChargePointLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a charge point across polls: (station id, charge-point label).
///
/// This is the only key used to match rows between snapshots, so it must
/// not depend on ranking order or distance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PointKey {
    pub station_id: StationId,
    pub label: ChargePointLabel,
}

impl PointKey {
    pub fn new(station_id: StationId, label: ChargePointLabel) -> Self {
        Self { station_id, label }
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.station_id, self.label)
    }
}

/// Current state of one charge point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargePointState {
    pub key: PointKey,
    pub state: ChargeState,
}

impl ChargePointState {
    pub fn new(station_id: StationId, label: ChargePointLabel, state: ChargeState) -> Self {
        Self {
            key: PointKey::new(station_id, label),
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_states_compare_with_owned_strings() {
        assert_eq!(ChargeState::new("CHARGING"), ChargeState::CHARGING);
        assert_eq!(ChargeState::from("PLUGGED_OUT"), ChargeState::PLUGGED_OUT);
        assert_ne!(ChargeState::new("charging"), ChargeState::CHARGING);
    }

    #[test]
    fn occupied_and_available() {
        assert!(ChargeState::CHARGING.is_occupied());
        assert!(ChargeState::CHARGE_STOPPED.is_occupied());
        assert!(!ChargeState::IDLE.is_occupied());
        assert!(!ChargeState::UNKNOWN.is_occupied());

        assert!(ChargeState::PLUGGED_OUT.is_available());
        assert!(!ChargeState::IDLE.is_available());
    }

    #[test]
    fn unrecognised_states_pass_through() {
        let state = ChargeState::new("RESERVED");
        assert_eq!(state.as_str(), "RESERVED");
        assert!(!state.is_occupied());
        assert!(!state.is_available());
    }

    #[test]
    fn serde_as_plain_string() {
        let json = serde_json::to_string(&ChargeState::CHARGE_STOPPED).unwrap();
        assert_eq!(json, "\"CHARGE_STOPPED\"");

        let state: ChargeState = serde_json::from_str("\"FAULTED\"").unwrap();
        assert_eq!(state.as_str(), "FAULTED");
    }

    #[test]
    fn point_key_display() {
        let key = PointKey::new(StationId::new("88"), ChargePointLabel::new("2"));
        assert_eq!(key.to_string(), "88#2");
    }
}
