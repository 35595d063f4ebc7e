//! Outbound notifications for StudySync.
//!
//! - [`Notifier`] is the capability the reminder worker depends on:
//!   `send(to, subject, body)`.
//! - [`EmailDelivery`] sends over SMTP when `SMTP_HOST` is configured.
//! - [`LogNotifier`] writes a structured log line instead.

pub mod delivery;
pub mod notifier;

pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::log::LogNotifier;
pub use notifier::{NotifyError, Notifier};
