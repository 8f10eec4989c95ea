//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::config::{KM_PER_MILE, RADIUS_OPTIONS_MILES};
use crate::detect::Transition;
use crate::geo::QueryPoint;
use crate::geocode::LocationSource;
use crate::poll::{
    CycleReport, FailureKind, MonitorStatus, PollState, SessionStarted, SessionSummary,
    StationFailure,
};
use crate::snapshot::SnapshotRow;

/// Round to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Message shown when the radius contains no stations.
pub fn no_stations_message(radius_km: f64) -> String {
    format!("No stations found within {} miles", (radius_km / KM_PER_MILE).round())
}

/// One selectable search radius.
#[derive(Debug, Serialize)]
pub struct RadiusOption {
    pub miles: u32,
    pub km: f64,
}

/// Response listing the radius choices.
#[derive(Debug, Serialize)]
pub struct RadiusOptionsResponse {
    pub options: Vec<RadiusOption>,

    /// Radius used when a session does not specify one
    pub default_miles: u32,
}

impl RadiusOptionsResponse {
    pub fn new(default_miles: u32) -> Self {
        let options = RADIUS_OPTIONS_MILES
            .iter()
            .map(|&miles| RadiusOption {
                miles,
                km: round2(f64::from(miles) * KM_PER_MILE),
            })
            .collect();
        Self {
            options,
            default_miles,
        }
    }
}

/// Request to start monitoring.
#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Address or place name to search around
    pub query: Option<String>,

    /// Device latitude (requires longitude)
    pub latitude: Option<f64>,

    /// Device longitude (requires latitude)
    pub longitude: Option<f64>,

    /// One of the offered radius options
    pub radius_miles: Option<u32>,
}

/// Query point in responses.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

impl From<&QueryPoint> for QueryResult {
    fn from(query: &QueryPoint) -> Self {
        Self {
            latitude: query.latitude,
            longitude: query.longitude,
            radius_km: round2(query.radius_km),
        }
    }
}

/// Response for a started session.
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub query: QueryResult,
    pub radius_miles: u32,

    /// Which input the location came from
    pub location_source: LocationSource,

    /// Non-fatal problem, e.g. search text that could not be located
    pub warning: Option<String>,

    pub stations_in_range: usize,

    /// Set when no station lies within the radius
    pub message: Option<String>,
}

impl From<SessionStarted> for StartSessionResponse {
    fn from(started: SessionStarted) -> Self {
        let message = (started.stations_in_range == 0)
            .then(|| no_stations_message(started.query.radius_km));
        Self {
            query: QueryResult::from(&started.query),
            radius_miles: started.radius_miles,
            location_source: started.source,
            warning: started.warning.map(|w| w.to_string()),
            stations_in_range: started.stations_in_range,
            message,
        }
    }
}

/// Current session status.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub state: PollState,
    pub notifications_enabled: bool,
    pub query: Option<QueryResult>,
    pub radius_miles: Option<u32>,
}

impl From<MonitorStatus> for SessionResponse {
    fn from(status: MonitorStatus) -> Self {
        Self {
            state: status.state,
            notifications_enabled: status.notifications_enabled,
            query: status.query.as_ref().map(QueryResult::from),
            radius_miles: status.radius_miles,
        }
    }
}

/// Response for stopping a session.
#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    /// False when nothing was running
    pub stopped: bool,
    pub summary: Option<SessionSummary>,
}

/// Request to toggle notifications.
#[derive(Debug, Deserialize)]
pub struct NotificationsRequest {
    pub enabled: bool,
}

/// Notification toggle state.
#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub enabled: bool,
}

/// A charge point row.
#[derive(Debug, Serialize)]
pub struct SnapshotRowResult {
    pub station_id: String,
    pub station_name: String,
    pub label: String,
    pub state: String,
    /// Kilometres, rounded to two decimals
    pub distance_km: f64,
}

impl From<&SnapshotRow> for SnapshotRowResult {
    fn from(row: &SnapshotRow) -> Self {
        Self {
            station_id: row.key().station_id.to_string(),
            station_name: row.station_name.clone(),
            label: row.key().label.to_string(),
            state: row.state().to_string(),
            distance_km: round2(row.distance_km),
        }
    }
}

/// A station that failed this cycle.
#[derive(Debug, Serialize)]
pub struct FailureResult {
    pub station_id: String,
    pub station_name: String,
    pub kind: FailureKind,
    pub message: String,
}

impl From<&StationFailure> for FailureResult {
    fn from(failure: &StationFailure) -> Self {
        Self {
            station_id: failure.station_id.to_string(),
            station_name: failure.station_name.clone(),
            kind: failure.kind,
            message: failure.message.clone(),
        }
    }
}

/// A charge point that became available.
#[derive(Debug, Serialize)]
pub struct TransitionResult {
    pub station_id: String,
    pub label: String,
    pub previous: String,
    pub current: String,
    /// RFC 3339 timestamp
    pub at: String,
}

impl From<&Transition> for TransitionResult {
    fn from(t: &Transition) -> Self {
        Self {
            station_id: t.key.station_id.to_string(),
            label: t.key.label.to_string(),
            previous: t.previous.to_string(),
            current: t.current.to_string(),
            at: t.at.to_rfc3339(),
        }
    }
}

/// Latest cycle report.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub cycle: u64,

    /// RFC 3339 timestamp
    pub taken_at: String,

    pub query: QueryResult,
    pub rows: Vec<SnapshotRowResult>,
    pub failures: Vec<FailureResult>,
    pub transitions: Vec<TransitionResult>,
    pub notifications_sent: usize,

    /// Set when no station lies within the radius
    pub message: Option<String>,
}

impl From<&CycleReport> for SnapshotResponse {
    fn from(report: &CycleReport) -> Self {
        let message =
            (report.stations_ranked == 0).then(|| no_stations_message(report.query.radius_km));
        Self {
            cycle: report.cycle,
            taken_at: report.snapshot.taken_at().to_rfc3339(),
            query: QueryResult::from(&report.query),
            rows: report.snapshot.rows().iter().map(SnapshotRowResult::from).collect(),
            failures: report.failures.iter().map(FailureResult::from).collect(),
            transitions: report.transitions.iter().map(TransitionResult::from).collect(),
            notifications_sent: report.notifications_sent,
            message,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
