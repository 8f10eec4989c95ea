//! Single-session supervisor.
//!
//! At most one poll session runs at a time. Starting a new search stops
//! the current session and waits for it to finish before the new one is
//! spawned.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::{MonitorConfig, radius_km};
use crate::geo::{QueryPoint, rank};
use crate::geocode::{
    Geocoder, LocationError, LocationRequest, LocationSource, LocationWarning, resolve_location,
};
use crate::notify::Notifier;
use crate::provider::StatusProvider;

use super::report::{CycleReport, SessionSummary};
use super::runner::PollLoop;
use super::state::PollState;

/// Errors from starting a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonitorError {
    /// No usable coordinate; nothing was ranked
    #[error("no location available to search from")]
    CoordinateMissing,

    /// Radius is not one of the offered options
    #[error("unsupported radius: {0} miles")]
    InvalidRadius(u32),
}

impl From<LocationError> for MonitorError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::CoordinateMissing => MonitorError::CoordinateMissing,
        }
    }
}

/// Parameters for a new session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRequest {
    pub location: LocationRequest,
    /// One of the offered radius options; the configured default when `None`
    pub radius_miles: Option<u32>,
}

/// Result of starting a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStarted {
    pub query: QueryPoint,
    pub radius_miles: u32,
    pub source: LocationSource,
    pub warning: Option<LocationWarning>,
    /// Stations inside the radius
    pub stations_in_range: usize,
}

/// Point-in-time view of the monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorStatus {
    pub state: PollState,
    pub notifications_enabled: bool,
    /// Query of the current session, if one is running
    pub query: Option<QueryPoint>,
    pub radius_miles: Option<u32>,
}

struct Session {
    cancel: watch::Sender<bool>,
    task: JoinHandle<SessionSummary>,
}

impl Session {
    async fn stop(self) -> SessionSummary {
        // the receiver lives in the task, which may already have finished
        let _ = self.cancel.send(true);
        match self.task.await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Poll session task failed");
                SessionSummary::default()
            }
        }
    }
}

/// Owns the running poll session and the channels the web layer reads.
pub struct Monitor<P, N, G> {
    catalog: Arc<Catalog>,
    provider: Arc<P>,
    notifier: Arc<N>,
    geocoder: G,
    config: MonitorConfig,
    notifications: watch::Sender<bool>,
    state: Arc<watch::Sender<PollState>>,
    latest: Arc<watch::Sender<Option<Arc<CycleReport>>>>,
    /// Query and radius of the running session, readable without the session lock
    active: watch::Sender<Option<(QueryPoint, u32)>>,
    session: Mutex<Option<Session>>,
}

impl<P, N, G> Monitor<P, N, G>
where
    P: StatusProvider + 'static,
    N: Notifier + 'static,
    G: Geocoder,
{
    pub fn new(
        catalog: Arc<Catalog>,
        provider: P,
        notifier: N,
        geocoder: G,
        config: MonitorConfig,
    ) -> Self {
        let (notifications, _) = watch::channel(config.notifications_enabled);
        let (state, _) = watch::channel(PollState::Idle);
        let (latest, _) = watch::channel(None);
        let (active, _) = watch::channel(None);
        Self {
            catalog,
            provider: Arc::new(provider),
            notifier: Arc::new(notifier),
            geocoder,
            config,
            notifications,
            state: Arc::new(state),
            latest: Arc::new(latest),
            active,
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Resolve the location, then replace any running session with a new one.
    ///
    /// The previous session is stopped first, so a failed start leaves the
    /// monitor `Idle`.
    pub async fn start(&self, request: SessionRequest) -> Result<SessionStarted, MonitorError> {
        let radius_miles = request.radius_miles.unwrap_or(self.config.radius_miles);
        let radius = radius_km(radius_miles).ok_or(MonitorError::InvalidRadius(radius_miles))?;

        let mut session = self.session.lock().await;
        if let Some(previous) = session.take() {
            let summary = previous.stop().await;
            info!(cycles = summary.cycles, "Replaced previous poll session");
        }
        self.active.send_replace(None);
        self.latest.send_replace(None);

        let resolved = match resolve_location(
            &self.geocoder,
            &request.location,
            self.config.default_location,
        )
        .await
        {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(error = %e, "Cannot start poll session");
                self.state.send_replace(PollState::Idle);
                return Err(e.into());
            }
        };

        let query = QueryPoint::around(resolved.coordinate, radius);
        let ranked = rank(self.catalog.stations(), &query);
        let stations_in_range = ranked.len();

        let (cancel, cancel_rx) = watch::channel(false);
        let poll = PollLoop::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.provider),
            Arc::clone(&self.notifier),
            Arc::clone(&self.latest),
            query,
            self.config.clone(),
        )
        .with_ranked(ranked)
        .with_notifications(self.notifications.subscribe())
        .with_state(Arc::clone(&self.state));
        let task = tokio::spawn(poll.run(cancel_rx));

        info!(
            latitude = query.latitude,
            longitude = query.longitude,
            radius_miles,
            source = ?resolved.source,
            stations = stations_in_range,
            "Started poll session"
        );

        *session = Some(Session { cancel, task });
        self.active.send_replace(Some((query, radius_miles)));

        Ok(SessionStarted {
            query,
            radius_miles,
            source: resolved.source,
            warning: resolved.warning,
            stations_in_range,
        })
    }

    /// Stop the running session, waiting for its current cycle to finish.
    pub async fn stop(&self) -> Option<SessionSummary> {
        let previous = self.session.lock().await.take();
        self.active.send_replace(None);
        match previous {
            Some(session) => Some(session.stop().await),
            None => None,
        }
    }

    /// Turn notification delivery on or off for the running and future sessions.
    pub fn set_notifications(&self, enabled: bool) {
        self.notifications.send_replace(enabled);
        info!(enabled, "Notifications toggled");
    }

    pub fn notifications_enabled(&self) -> bool {
        *self.notifications.borrow()
    }

    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    /// Report from the most recent cycle of the current session.
    pub fn latest(&self) -> Option<Arc<CycleReport>> {
        self.latest.borrow().clone()
    }

    /// Does not wait on a start or stop in progress.
    pub fn status(&self) -> MonitorStatus {
        let active = *self.active.borrow();
        MonitorStatus {
            state: self.state(),
            notifications_enabled: self.notifications_enabled(),
            query: active.map(|(query, _)| query),
            radius_miles: active.map(|(_, radius)| radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ChargePointLabel, ChargePointState, ChargeState, Coordinate, Station, StationId,
    };
    use crate::geocode::GeocodeError;
    use crate::notify::{Notification, NotifyError};
    use crate::provider::{ProviderError, StationStatus};
    use std::time::Duration;

    struct FixedProvider;

    impl StatusProvider for FixedProvider {
        async fn fetch(&self, station: &StationId) -> Result<StationStatus, ProviderError> {
            Ok(StationStatus {
                name: None,
                points: vec![ChargePointState::new(
                    station.clone(),
                    ChargePointLabel::new("1"),
                    ChargeState::CHARGING,
                )],
            })
        }
    }

    struct NullNotifier;

    impl Notifier for NullNotifier {
        async fn notify(&self, _: &Notification) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    struct NoGeocoder;

    impl Geocoder for NoGeocoder {
        async fn geocode(&self, text: &str) -> Result<Coordinate, GeocodeError> {
            Err(GeocodeError::NoMatch(text.to_string()))
        }
    }

    type TestMonitor = Monitor<FixedProvider, NullNotifier, NoGeocoder>;

    fn monitor(default_location: Option<Coordinate>) -> TestMonitor {
        let catalog = Catalog::from_stations(vec![
            Station::new("near", "Near", 0.0, 0.0),
            Station::new("far", "Far", 10.0, 10.0),
        ]);
        let config = MonitorConfig::default()
            .with_default_location(default_location)
            .with_poll_interval(Duration::from_secs(2));
        Monitor::new(Arc::new(catalog), FixedProvider, NullNotifier, NoGeocoder, config)
    }

    async fn wait_for_report(monitor: &TestMonitor) -> Arc<CycleReport> {
        loop {
            if let Some(report) = monitor.latest() {
                return report;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_poll_and_stop() {
        let monitor = monitor(Some(Coordinate::new(0.0, 0.0)));
        assert_eq!(monitor.state(), PollState::Idle);

        let started = monitor.start(SessionRequest::default()).await.unwrap();
        assert_eq!(started.source, LocationSource::Default);
        assert_eq!(started.radius_miles, 4);
        assert_eq!(started.stations_in_range, 1);
        assert!(started.warning.is_none());

        let report = wait_for_report(&monitor).await;
        assert_eq!(report.cycle, 1);
        assert_eq!(report.snapshot.len(), 1);
        assert!(report.transitions.is_empty());

        let status = monitor.status();
        assert!(status.state.is_active());
        assert_eq!(status.radius_miles, Some(4));

        let summary = monitor.stop().await.unwrap();
        assert!(summary.cycles >= 1);
        assert_eq!(monitor.state(), PollState::Stopped);
        assert!(monitor.status().query.is_none());
        assert!(monitor.stop().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_coordinate_stays_idle() {
        let monitor = monitor(None);
        let err = monitor.start(SessionRequest::default()).await.unwrap_err();
        assert_eq!(err, MonitorError::CoordinateMissing);
        assert_eq!(monitor.state(), PollState::Idle);
        assert!(monitor.latest().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_radius_rejected() {
        let monitor = monitor(Some(Coordinate::new(0.0, 0.0)));
        let request = SessionRequest {
            radius_miles: Some(5),
            ..SessionRequest::default()
        };
        assert_eq!(monitor.start(request).await.unwrap_err(), MonitorError::InvalidRadius(5));
        assert_eq!(monitor.state(), PollState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn new_search_replaces_session() {
        let monitor = monitor(Some(Coordinate::new(0.0, 0.0)));
        monitor.start(SessionRequest::default()).await.unwrap();
        wait_for_report(&monitor).await;

        let request = SessionRequest {
            location: LocationRequest {
                query: Some("somewhere".into()),
                device: Some(Coordinate::new(10.0, 10.0)),
            },
            radius_miles: Some(12),
        };
        let started = monitor.start(request).await.unwrap();
        assert_eq!(started.source, LocationSource::Device);
        assert!(started.warning.is_some());
        assert_eq!(started.stations_in_range, 1);

        let report = wait_for_report(&monitor).await;
        assert_eq!(report.cycle, 1);
        assert_eq!(report.snapshot.rows()[0].key().station_id.as_str(), "far");
        monitor.stop().await;
    }

    #[tokio::test]
    async fn notification_toggle() {
        let monitor = monitor(None);
        assert!(monitor.notifications_enabled());
        monitor.set_notifications(false);
        assert!(!monitor.notifications_enabled());
        assert!(!monitor.status().notifications_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn status_does_not_wait_for_session_lock() {
        let monitor = monitor(Some(Coordinate::new(0.0, 0.0)));
        let started = monitor.start(SessionRequest::default()).await.unwrap();
        wait_for_report(&monitor).await;

        let held = monitor.session.lock().await;
        let status = monitor.status();
        assert_eq!(status.query, Some(started.query));
        assert_eq!(status.radius_miles, Some(4));
        assert!(status.state.is_active());
        drop(held);

        monitor.stop().await;
        assert_eq!(monitor.status().query, None);
    }

    #[tokio::test(start_paused = true)]
    async fn session_polls_only_stations_in_range() {
        let monitor = monitor(Some(Coordinate::new(0.0, 0.0)));
        monitor.start(SessionRequest::default()).await.unwrap();

        let report = wait_for_report(&monitor).await;
        assert_eq!(report.stations_ranked, 1);
        assert_eq!(report.snapshot.rows()[0].key().station_id.as_str(), "near");
        monitor.stop().await;
    }
}
