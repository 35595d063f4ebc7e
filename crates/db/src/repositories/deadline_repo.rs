//! Repository for the `deadlines` table.

use sqlx::PgPool;
use studysync_core::types::{DbId, Timestamp};

use crate::models::deadline::{Deadline, DeadlineWithTask, DueReminder, NewDeadline};

const COLUMNS: &str = "id, task_id, user_id, due_date, created_at";

/// Deadline columns plus the embedded task, for `deadlines d JOIN tasks t`.
const JOINED_COLUMNS: &str = "d.id, d.task_id, d.user_id, d.due_date, d.created_at, \
     t.id AS task_ref_id, t.title AS task_title, t.description AS task_description, \
     t.status AS task_status, t.deadline AS task_deadline, \
     t.subject_id AS task_subject_id, t.sprint_id AS task_sprint_id, \
     t.created_at AS task_created_at";

const JOINED_FROM: &str = " FROM deadlines d JOIN tasks t ON t.id = d.task_id";

pub struct DeadlineRepo;

impl DeadlineRepo {
    pub async fn create(pool: &PgPool, input: &NewDeadline) -> Result<Deadline, sqlx::Error> {
        let query = format!(
            "INSERT INTO deadlines (task_id, user_id, due_date)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deadline>(&query)
            .bind(input.task_id)
            .bind(input.user_id)
            .bind(input.due_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_with_task(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DeadlineWithTask>, sqlx::Error> {
        let query = format!("SELECT {JOINED_COLUMNS}{JOINED_FROM} WHERE d.id = $1");
        sqlx::query_as::<_, DeadlineWithTask>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every deadline, soonest first.
    pub async fn list_with_task(pool: &PgPool) -> Result<Vec<DeadlineWithTask>, sqlx::Error> {
        let query = format!("SELECT {JOINED_COLUMNS}{JOINED_FROM} ORDER BY d.due_date, d.id");
        sqlx::query_as::<_, DeadlineWithTask>(&query)
            .fetch_all(pool)
            .await
    }

    /// Deadlines with `from < due_date <= to`, joined with the task title and
    /// the email of the user to remind.
    pub async fn list_due_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<DueReminder>, sqlx::Error> {
        sqlx::query_as::<_, DueReminder>(
            "SELECT d.id AS deadline_id, d.due_date, t.id AS task_id, t.title AS task_title,
                    u.id AS user_id, u.email AS user_email
             FROM deadlines d
             JOIN tasks t ON t.id = d.task_id
             JOIN users u ON u.id = d.user_id
             WHERE d.due_date > $1 AND d.due_date <= $2
             ORDER BY d.due_date, d.id",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM deadlines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
