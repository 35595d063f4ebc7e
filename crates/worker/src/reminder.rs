//! Deadline reminder worker.
//!
//! [`ReminderWorker`] wakes once per [`SCAN_INTERVAL`], finds every deadline
//! due within the next [`REMINDER_WINDOW_MINS`] minutes and notifies the owning user.
//! The window is `(now, now + 15 min]`. Nothing records which deadlines were
//! already reminded, so a deadline is normally picked up by several
//! consecutive scans until it falls out of the window; a process that is down
//! for the whole window sends nothing for it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use studysync_core::types::Timestamp;
use studysync_db::models::deadline::DueReminder;
use studysync_db::repositories::DeadlineRepo;
use studysync_db::DbPool;
use studysync_events::Notifier;
use tokio_util::sync::CancellationToken;

/// How often the worker scans for due deadlines.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(60);

/// How far ahead of `now`, in minutes, a deadline counts as due.
pub const REMINDER_WINDOW_MINS: i64 = 15;

/// The `(exclusive, inclusive]` due-date range scanned at `now`.
pub fn due_window(now: Timestamp) -> (Timestamp, Timestamp) {
    (now, now + chrono::Duration::minutes(REMINDER_WINDOW_MINS))
}

/// Outcome of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Deadlines found in the window.
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
    /// Deadlines whose user has no contact address.
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// ReminderWorker
// ---------------------------------------------------------------------------

pub struct ReminderWorker {
    pool: DbPool,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl ReminderWorker {
    pub fn new(pool: DbPool, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            pool,
            notifier,
            interval: SCAN_INTERVAL,
        }
    }

    /// Override the scan interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the scan loop until `cancel` fires.
    ///
    /// The first scan happens one interval after start. Cancellation is
    /// observed between scans; a scan that has started always runs to
    /// completion.
    pub async fn run(&self, cancel: CancellationToken) {
        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);

        tracing::info!(interval_secs = self.interval.as_secs(), "Reminder worker started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder worker cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    match self.scan(Utc::now()).await {
                        Ok(report) if report.due > 0 => {
                            tracing::info!(
                                due = report.due,
                                sent = report.sent,
                                failed = report.failed,
                                skipped = report.skipped,
                                "Reminder scan complete"
                            );
                        }
                        Ok(_) => tracing::debug!("Reminder scan found nothing due"),
                        Err(e) => tracing::error!(error = %e, "Reminder scan query failed"),
                    }
                }
            }
        }
    }

    /// Notify every deadline due in the window at `now`.
    ///
    /// Only the lookup query can fail the scan; each notification failure is
    /// logged and counted without affecting the others.
    pub async fn scan(&self, now: Timestamp) -> Result<ScanReport, sqlx::Error> {
        let (from, to) = due_window(now);
        let due = DeadlineRepo::list_due_between(&self.pool, from, to).await?;

        let mut report = ScanReport {
            due: due.len(),
            ..ScanReport::default()
        };

        for reminder in &due {
            if reminder.user_email.trim().is_empty() {
                tracing::warn!(
                    deadline_id = reminder.deadline_id,
                    user_id = reminder.user_id,
                    "Skipping reminder: user has no email"
                );
                report.skipped += 1;
                continue;
            }

            let (subject, body) = render(reminder);
            match self.notifier.send(&reminder.user_email, &subject, &body).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    tracing::error!(
                        deadline_id = reminder.deadline_id,
                        error = %e,
                        "Failed to send reminder"
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

fn render(reminder: &DueReminder) -> (String, String) {
    let subject = format!("Reminder: {}", reminder.task_title);
    let body = format!(
        "Task '{}' is due at {} (deadline id={}).",
        reminder.task_title,
        reminder.due_date.to_rfc3339(),
        reminder.deadline_id
    );
    (subject, body)
}
