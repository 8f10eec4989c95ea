//! Notifier that only writes to the log.

use tracing::info;

use super::{Notification, Notifier, NotifyError};

/// Logs each notification at info level. Used when no webhook is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            subject = %notification.subject,
            state = %notification.state,
            "charge point available"
        );
        Ok(())
    }
}
