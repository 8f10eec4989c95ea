//! What a poll session hands to the presentation side.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::detect::Transition;
use crate::domain::StationId;
use crate::geo::QueryPoint;
use crate::snapshot::Snapshot;

/// Why a station contributed no rows this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transport failure, timeout, non-2xx or unknown station
    Unavailable,
    /// The provider answered with something unusable
    Malformed,
}

/// A station whose fetch failed in a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationFailure {
    pub station_id: StationId,
    pub station_name: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of one polling cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle number within the session
    pub cycle: u64,
    pub query: QueryPoint,
    /// Number of stations inside the radius
    pub stations_ranked: usize,
    pub snapshot: Snapshot,
    pub failures: Vec<StationFailure>,
    pub transitions: Vec<Transition>,
    /// Notifications delivered successfully this cycle
    pub notifications_sent: usize,
}

/// Totals for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub cycles: u64,
    pub transitions: usize,
    pub notifications_sent: usize,
}

impl SessionSummary {
    pub(crate) fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.transitions += report.transitions.len();
        self.notifications_sent += report.notifications_sent;
    }
}

/// Receives each cycle's report.
pub trait SnapshotSink: Send + Sync {
    fn publish(&self, report: CycleReport);
}

/// Keep only the latest report; readers borrow it when they need it.
impl SnapshotSink for watch::Sender<Option<Arc<CycleReport>>> {
    fn publish(&self, report: CycleReport) {
        self.send_replace(Some(Arc::new(report)));
    }
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for Arc<S> {
    fn publish(&self, report: CycleReport) {
        (**self).publish(report);
    }
}
