//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use tracing::{error, warn};

use crate::domain::Coordinate;
use crate::geocode::LocationRequest;
use crate::poll::{MonitorError, SessionRequest};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/radius-options", get(radius_options))
        .route(
            "/api/session",
            post(start_session).get(session_status).delete(stop_session),
        )
        .route("/api/notifications", put(set_notifications))
        .route("/api/snapshot", get(latest_snapshot))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The radius choices and the default.
async fn radius_options(State(state): State<AppState>) -> Json<RadiusOptionsResponse> {
    Json(RadiusOptionsResponse::new(state.monitor.config().radius_miles))
}

/// Start (or restart) monitoring around a location.
async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, AppError> {
    let device = match (req.latitude, req.longitude) {
        (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest {
                message: "latitude and longitude must be given together".to_string(),
            });
        }
    };

    let request = SessionRequest {
        location: LocationRequest {
            query: req.query,
            device,
        },
        radius_miles: req.radius_miles,
    };

    let started = state.monitor.start(request).await?;
    Ok(Json(StartSessionResponse::from(started)))
}

/// Current poll state and notification toggle.
async fn session_status(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse::from(state.monitor.status()))
}

/// Stop monitoring.
async fn stop_session(State(state): State<AppState>) -> Json<StopSessionResponse> {
    let summary = state.monitor.stop().await;
    Json(StopSessionResponse {
        stopped: summary.is_some(),
        summary,
    })
}

/// Turn notifications on or off.
async fn set_notifications(
    State(state): State<AppState>,
    Json(req): Json<NotificationsRequest>,
) -> Json<NotificationsResponse> {
    state.monitor.set_notifications(req.enabled);
    Json(NotificationsResponse {
        enabled: state.monitor.notifications_enabled(),
    })
}

/// The most recent cycle of the running session.
async fn latest_snapshot(State(state): State<AppState>) -> Result<Json<SnapshotResponse>, AppError> {
    let report = state.monitor.latest().ok_or_else(|| AppError::NotFound {
        message: "No snapshot yet: start a session and wait for the first poll".to_string(),
    })?;
    Ok(Json(SnapshotResponse::from(report.as_ref())))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<MonitorError> for AppError {
    fn from(e: MonitorError) -> Self {
        match e {
            MonitorError::InvalidRadius(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            MonitorError::CoordinateMissing => AppError::Conflict {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
