//! Task entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use studysync_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::patch;
use crate::models::subject::Subject;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub deadline: Option<Timestamp>,
    pub subject_id: DbId,
    pub sprint_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// A task with its owning subject embedded, as returned by reads.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithSubject {
    #[serde(flatten)]
    pub task: Task,
    pub subject: Subject,
}

/// Decodes a `tasks t JOIN subjects s` row whose subject columns are aliased
/// with a `subject_` prefix.
impl<'r> FromRow<'r, PgRow> for TaskWithSubject {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            task: Task::from_row(row)?,
            subject: Subject {
                id: row.try_get("subject_ref_id")?,
                name: row.try_get("subject_name")?,
                description: row.try_get("subject_description")?,
                created_at: row.try_get("subject_created_at")?,
            },
        })
    }
}

/// DTO for creating a task.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `todo` if omitted.
    #[validate(length(min = 1, message = "status must not be empty"))]
    pub status: Option<String>,
    pub deadline: Option<Timestamp>,
    #[validate(range(min = 1, message = "subject_id must be a positive id"))]
    pub subject_id: DbId,
    pub sprint_id: Option<DbId>,
}

/// DTO for updating a task. Absent fields are left unchanged; `deadline`
/// and `sprint_id` are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateTask {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "status must not be empty"))]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub deadline: Option<Option<Timestamp>>,
    #[validate(range(min = 1, message = "subject_id must be a positive id"))]
    pub subject_id: Option<DbId>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub sprint_id: Option<Option<DbId>>,
}
