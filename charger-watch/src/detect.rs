//! Change detection between consecutive snapshots.
//!
//! Only one edge is actionable: a charge point that was occupied
//! (`CHARGING` or `CHARGE_STOPPED`) and is now `PLUGGED_OUT`. Every other
//! change, including a key seen for the first time, is absorbed silently.
//! Unknown or unrecognised states never match, so uncertainty produces
//! silence rather than a spurious notification.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::domain::{ChargeState, PointKey};
use crate::snapshot::Snapshot;

/// A charge point that became available between two polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub key: PointKey,
    pub previous: ChargeState,
    pub current: ChargeState,
    /// When the current snapshot was taken
    pub at: DateTime<Utc>,
}

/// True for the single (previous, current) pair that warrants a notification.
pub fn is_notifiable(previous: &ChargeState, current: &ChargeState) -> bool {
    previous.is_occupied() && current.is_available()
}

/// Compare two snapshots and return the charge points that became available.
///
/// Transitions come out in `current` row order, at most one per key.
/// `diff(&Snapshot::empty(), s)` is always empty.
pub fn diff(previous: &Snapshot, current: &Snapshot) -> Vec<Transition> {
    if previous.is_empty() {
        return Vec::new();
    }

    let before = previous.index();
    let mut emitted: HashSet<&PointKey> = HashSet::new();
    let mut transitions = Vec::new();

    for row in current.rows() {
        let Some(prev) = before.get(row.key()) else {
            continue;
        };

        if is_notifiable(prev.state(), row.state()) && emitted.insert(row.key()) {
            transitions.push(Transition {
                key: row.key().clone(),
                previous: prev.state().clone(),
                current: row.state().clone(),
                at: current.taken_at(),
            });
        }
    }

    transitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChargePointLabel, ChargePointState, StationId};
    use crate::snapshot::SnapshotRow;

    fn row(station: &str, label: &str, state: ChargeState) -> SnapshotRow {
        SnapshotRow {
            point: ChargePointState::new(
                StationId::new(station),
                ChargePointLabel::new(label),
                state,
            ),
            station_name: station.to_string(),
            distance_km: 1.0,
        }
    }

    fn snap(rows: Vec<SnapshotRow>) -> Snapshot {
        Snapshot::from_rows(Utc::now(), rows)
    }

    #[test]
    fn charging_to_plugged_out_emits_one() {
        let previous = snap(vec![row("stationA", "cp1", ChargeState::CHARGING)]);
        let current = snap(vec![row("stationA", "cp1", ChargeState::PLUGGED_OUT)]);

        let transitions = diff(&previous, &current);

        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].key.to_string(), "stationA#cp1");
        assert_eq!(transitions[0].previous, ChargeState::CHARGING);
        assert_eq!(transitions[0].current, ChargeState::PLUGGED_OUT);
        assert_eq!(transitions[0].at, current.taken_at());
    }

    #[test]
    fn charge_stopped_to_plugged_out_emits_one() {
        let previous = snap(vec![row("A", "1", ChargeState::CHARGE_STOPPED)]);
        let current = snap(vec![row("A", "1", ChargeState::PLUGGED_OUT)]);
        assert_eq!(diff(&previous, &current).len(), 1);
    }

    #[test]
    fn idle_to_plugged_out_is_silent() {
        let previous = snap(vec![row("stationA", "cp1", ChargeState::IDLE)]);
        let current = snap(vec![row("stationA", "cp1", ChargeState::PLUGGED_OUT)]);
        assert!(diff(&previous, &current).is_empty());
    }

    #[test]
    fn unknown_to_plugged_out_is_silent() {
        let previous = snap(vec![row("A", "1", ChargeState::UNKNOWN)]);
        let current = snap(vec![row("A", "1", ChargeState::PLUGGED_OUT)]);
        assert!(diff(&previous, &current).is_empty());
    }

    #[test]
    fn other_changes_are_silent() {
        let previous = snap(vec![
            row("A", "1", ChargeState::PLUGGED_OUT),
            row("A", "2", ChargeState::CHARGING),
            row("A", "3", ChargeState::CHARGING),
        ]);
        let current = snap(vec![
            row("A", "1", ChargeState::CHARGING),
            row("A", "2", ChargeState::CHARGE_STOPPED),
            row("A", "3", ChargeState::new("FAULTED")),
        ]);
        assert!(diff(&previous, &current).is_empty());
    }

    #[test]
    fn first_poll_never_emits() {
        let current = snap(vec![
            row("A", "1", ChargeState::PLUGGED_OUT),
            row("B", "1", ChargeState::PLUGGED_OUT),
        ]);
        assert!(diff(&Snapshot::empty(), &current).is_empty());
    }

    #[test]
    fn first_sighting_mid_session_is_silent() {
        let previous = snap(vec![row("A", "1", ChargeState::CHARGING)]);
        let current = snap(vec![
            row("A", "1", ChargeState::CHARGING),
            row("B", "1", ChargeState::PLUGGED_OUT),
        ]);
        assert!(diff(&previous, &current).is_empty());
    }

    #[test]
    fn identical_snapshots_emit_nothing() {
        let s = snap(vec![
            row("A", "1", ChargeState::PLUGGED_OUT),
            row("A", "2", ChargeState::CHARGING),
        ]);
        assert!(diff(&s, &s).is_empty());
    }

    #[test]
    fn matching_ignores_row_order() {
        let previous = snap(vec![
            row("A", "1", ChargeState::CHARGING),
            row("B", "1", ChargeState::CHARGING),
        ]);
        let current = snap(vec![
            row("B", "1", ChargeState::PLUGGED_OUT),
            row("A", "1", ChargeState::PLUGGED_OUT),
        ]);

        let keys: Vec<String> = diff(&previous, &current)
            .iter()
            .map(|t| t.key.to_string())
            .collect();
        assert_eq!(keys, vec!["B#1", "A#1"]);
    }

    #[test]
    fn repeated_key_in_current_emits_once() {
        let previous = snap(vec![row("A", "1", ChargeState::CHARGING)]);
        let current = snap(vec![
            row("A", "1", ChargeState::PLUGGED_OUT),
            row("A", "1", ChargeState::PLUGGED_OUT),
        ]);
        assert_eq!(diff(&previous, &current).len(), 1);
    }

    #[test]
    fn same_label_at_different_stations_are_distinct() {
        let previous = snap(vec![
            row("A", "1", ChargeState::CHARGING),
            row("B", "1", ChargeState::IDLE),
        ]);
        let current = snap(vec![
            row("A", "1", ChargeState::PLUGGED_OUT),
            row("B", "1", ChargeState::PLUGGED_OUT),
        ]);

        let transitions = diff(&previous, &current);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].key.station_id, StationId::new("A"));
    }
}
