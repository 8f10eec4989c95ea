//! Delivery of "charge point became available" messages.
//!
//! The notifier is fire-and-forget from the poll loop's point of view:
//! errors are logged by the caller and never affect the cycle. De-duplication
//! is the change detector's job, not the notifier's.

mod log;
mod webhook;

use std::fmt;
use std::future::Future;

use serde::Serialize;

use crate::detect::Transition;

pub use self::log::LogNotifier;
pub use webhook::{WebhookConfig, WebhookNotifier};

/// Errors from delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Receiver returned a non-success status
    #[error("delivery rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Message for one transition: which charge point, and what it is now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Human-readable charge point, e.g. "Civic Center #2"
    pub subject: String,
    /// New state label, e.g. "PLUGGED_OUT"
    pub state: String,
}

impl Notification {
    /// Build the message for `transition` at a station called `station_name`.
    pub fn for_transition(transition: &Transition, station_name: &str) -> Self {
        Self {
            subject: format!("{} #{}", station_name, transition.key.label),
            state: transition.current.to_string(),
        }
    }

    /// Single-line text form.
    pub fn text(&self) -> String {
        format!("{} is now available ({})", self.subject, self.state)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Something that can deliver a notification.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// The notifier selected at start-up.
#[derive(Debug, Clone)]
pub enum NotifierBackend {
    Webhook(WebhookNotifier),
    Log(LogNotifier),
}

impl Notifier for NotifierBackend {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        match self {
            NotifierBackend::Webhook(n) => n.notify(notification).await,
            NotifierBackend::Log(n) => n.notify(notification).await,
        }
    }
}
