//! Log-only notification delivery.

use async_trait::async_trait;

use crate::notifier::{NotifyError, Notifier};

/// Writes each notification as an `info` log event and never fails.
///
/// Used when no SMTP server is configured, so reminders remain visible in
/// the service logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to, subject, body, "Reminder");
        Ok(())
    }
}
