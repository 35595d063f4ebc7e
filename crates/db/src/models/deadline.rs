//! Deadline (reminder) entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use studysync_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::task::Task;

/// A row from the `deadlines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Deadline {
    pub id: DbId,
    pub task_id: DbId,
    pub user_id: DbId,
    pub due_date: Timestamp,
    pub created_at: Timestamp,
}

/// A deadline with the task it refers to embedded.
#[derive(Debug, Clone, Serialize)]
pub struct DeadlineWithTask {
    #[serde(flatten)]
    pub deadline: Deadline,
    pub task: Task,
}

/// Decodes a `deadlines d JOIN tasks t` row whose task columns are aliased
/// with a `task_` prefix.
impl<'r> FromRow<'r, PgRow> for DeadlineWithTask {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            deadline: Deadline::from_row(row)?,
            task: Task {
                id: row.try_get("task_ref_id")?,
                title: row.try_get("task_title")?,
                description: row.try_get("task_description")?,
                status: row.try_get("task_status")?,
                deadline: row.try_get("task_deadline")?,
                subject_id: row.try_get("task_subject_id")?,
                sprint_id: row.try_get("task_sprint_id")?,
                created_at: row.try_get("task_created_at")?,
            },
        })
    }
}

/// Request body for creating a deadline.
///
/// `user_id` names the user to remind; when omitted the handler fills in
/// the authenticated caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDeadline {
    #[validate(range(min = 1, message = "task_id must be a positive id"))]
    pub task_id: DbId,
    pub due_date: Timestamp,
    #[validate(range(min = 1, message = "user_id must be a positive id"))]
    pub user_id: Option<DbId>,
}

/// Insert payload with the recipient resolved.
#[derive(Debug, Clone)]
pub struct NewDeadline {
    pub task_id: DbId,
    pub user_id: DbId,
    pub due_date: Timestamp,
}

/// One deadline due for a reminder, with everything needed to send it.
#[derive(Debug, Clone, FromRow)]
pub struct DueReminder {
    pub deadline_id: DbId,
    pub due_date: Timestamp,
    pub task_id: DbId,
    pub task_title: String,
    pub user_id: DbId,
    pub user_email: String,
}
