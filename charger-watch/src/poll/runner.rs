//! The recurring poll cycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::MonitorConfig;
use crate::detect::{Transition, diff};
use crate::domain::StationId;
use crate::geo::{QueryPoint, RankedStation, rank};
use crate::notify::{Notification, Notifier};
use crate::provider::{ProviderError, StatusProvider};
use crate::snapshot::{self, FetchOutcome, Snapshot};

use super::report::{CycleReport, FailureKind, SessionSummary, SnapshotSink, StationFailure};
use super::state::PollState;

/// One poll session: rank once, then poll, diff and notify until cancelled.
///
/// The previous snapshot lives only inside [`PollLoop::run`] and is replaced
/// each cycle.
pub struct PollLoop<P, N, S> {
    catalog: Arc<Catalog>,
    provider: Arc<P>,
    notifier: Arc<N>,
    sink: S,
    query: QueryPoint,
    config: MonitorConfig,
    notifications: watch::Receiver<bool>,
    state: Arc<watch::Sender<PollState>>,
    ranked: Option<Vec<RankedStation>>,
}

impl<P, N, S> PollLoop<P, N, S>
where
    P: StatusProvider,
    N: Notifier,
    S: SnapshotSink,
{
    /// Create a loop with its own notification toggle and state channel,
    /// both seeded from `config`.
    pub fn new(
        catalog: Arc<Catalog>,
        provider: Arc<P>,
        notifier: Arc<N>,
        sink: S,
        query: QueryPoint,
        config: MonitorConfig,
    ) -> Self {
        let (_, notifications) = watch::channel(config.notifications_enabled);
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            catalog,
            provider,
            notifier,
            sink,
            query,
            config,
            notifications,
            state: Arc::new(state),
            ranked: None,
        }
    }

    /// Use an already computed ranking of the catalog for `query` instead of
    /// ranking again when the loop starts.
    pub fn with_ranked(mut self, ranked: Vec<RankedStation>) -> Self {
        self.ranked = Some(ranked);
        self
    }

    /// Follow an externally owned notification toggle.
    pub fn with_notifications(mut self, notifications: watch::Receiver<bool>) -> Self {
        self.notifications = notifications;
        self
    }

    /// Publish state changes on `state`.
    pub fn with_state(mut self, state: Arc<watch::Sender<PollState>>) -> Self {
        self.state = state;
        self
    }

    /// Watch this loop's state.
    pub fn subscribe_state(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// Run until `cancel` becomes `true` (or its sender is dropped).
    ///
    /// Cancellation never interrupts a cycle in progress: in-flight fetches
    /// finish, the cycle is published, and no further cycle starts.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) -> SessionSummary {
        let mut summary = SessionSummary::default();

        self.set_state(PollState::Ranking);
        let ranked = match self.ranked.take() {
            Some(ranked) => ranked,
            None => rank(self.catalog.stations(), &self.query),
        };
        info!(
            stations = ranked.len(),
            latitude = self.query.latitude,
            longitude = self.query.longitude,
            radius_km = self.query.radius_km,
            "Ranked catalog"
        );

        let mut previous = Snapshot::empty();

        while !is_cancelled(&cancel) {
            self.set_state(PollState::Polling);
            let report = self.poll_once(summary.cycles + 1, &ranked, &previous).await;
            summary.record(&report);
            previous = report.snapshot.clone();
            self.sink.publish(report);

            if is_cancelled(&cancel) {
                break;
            }

            self.set_state(PollState::Waiting);
            if !wait_or_cancel(self.config.poll_interval, &mut cancel).await {
                break;
            }
        }

        self.set_state(PollState::Stopped);
        info!(
            cycles = summary.cycles,
            transitions = summary.transitions,
            notifications = summary.notifications_sent,
            "Poll session stopped"
        );
        summary
    }

    /// Fetch every ranked station, build the snapshot, diff against
    /// `previous` and deliver notifications.
    async fn poll_once(
        &self,
        cycle: u64,
        ranked: &[RankedStation],
        previous: &Snapshot,
    ) -> CycleReport {
        let fetches = ranked.iter().map(|entry| {
            let id = entry.station.id.clone();
            async move {
                let outcome = self.fetch_with_timeout(&id).await;
                (id, outcome)
            }
        });
        let results: HashMap<StationId, FetchOutcome> =
            join_all(fetches).await.into_iter().collect();

        let failures = collect_failures(ranked, &results);
        let snapshot = snapshot::build(ranked, &results, Utc::now());
        let transitions = diff(previous, &snapshot);

        let notifications_enabled = *self.notifications.borrow();
        let notifications_sent = if notifications_enabled {
            self.deliver(&snapshot, &transitions).await
        } else {
            0
        };

        debug!(
            cycle,
            rows = snapshot.len(),
            failures = failures.len(),
            transitions = transitions.len(),
            notifications = notifications_sent,
            "Poll cycle complete"
        );

        CycleReport {
            cycle,
            query: self.query,
            stations_ranked: ranked.len(),
            snapshot,
            failures,
            transitions,
            notifications_sent,
        }
    }

    /// Sends one notification per transition, concurrently, each bounded by
    /// `notify_timeout`. Returns the number delivered.
    async fn deliver(&self, snapshot: &Snapshot, transitions: &[Transition]) -> usize {
        let sends = transitions.iter().map(|transition| {
            let station_name = snapshot
                .get(&transition.key)
                .map(|row| row.station_name.as_str())
                .unwrap_or(transition.key.station_id.as_str());
            let notification = Notification::for_transition(transition, station_name);
            async move {
                let outcome =
                    tokio::time::timeout(self.config.notify_timeout, self.notifier.notify(&notification))
                        .await;
                match outcome {
                    Ok(Ok(())) => true,
                    Ok(Err(e)) => {
                        warn!(point = %transition.key, error = %e, "Notification delivery failed");
                        false
                    }
                    Err(_) => {
                        warn!(point = %transition.key, "Notification delivery timed out");
                        false
                    }
                }
            }
        });
        join_all(sends).await.into_iter().filter(|sent| *sent).count()
    }

    async fn fetch_with_timeout(&self, station: &StationId) -> FetchOutcome {
        match tokio::time::timeout(self.config.fetch_timeout, self.provider.fetch(station)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProviderError::Timeout),
        }
    }

    fn set_state(&self, state: PollState) {
        self.state.send_replace(state);
    }
}

/// Failed stations in ranked order, logged by failure class.
fn collect_failures(
    ranked: &[RankedStation],
    results: &HashMap<StationId, FetchOutcome>,
) -> Vec<StationFailure> {
    ranked
        .iter()
        .filter_map(|entry| {
            let Some(Err(e)) = results.get(&entry.station.id) else {
                return None;
            };

            let kind = if e.is_malformed() {
                warn!(station = %entry.station.id, error = %e, "Malformed provider response");
                FailureKind::Malformed
            } else {
                warn!(station = %entry.station.id, error = %e, "Provider unavailable");
                FailureKind::Unavailable
            };

            Some(StationFailure {
                station_id: entry.station.id.clone(),
                station_name: entry.station.name.clone(),
                kind,
                message: e.to_string(),
            })
        })
        .collect()
}

fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow()
}

/// Sleep for `interval` unless cancelled first. Returns `false` on cancel.
async fn wait_or_cancel(interval: Duration, cancel: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(interval) => true,
        _ = cancel.wait_for(|cancelled| *cancelled) => false,
    }
}
