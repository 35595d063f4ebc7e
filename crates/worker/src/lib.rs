//! Background jobs that run alongside the HTTP server.

pub mod reminder;

pub use reminder::{due_window, ReminderWorker, ScanReport, REMINDER_WINDOW_MINS, SCAN_INTERVAL};
