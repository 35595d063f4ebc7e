//! Repository for the `subjects` table.

use sqlx::PgPool;
use studysync_core::types::DbId;

use crate::models::subject::{CreateSubject, Subject, UpdateSubject};

const COLUMNS: &str = "id, name, description, created_at";

pub struct SubjectRepo;

impl SubjectRepo {
    pub async fn create(pool: &PgPool, input: &CreateSubject) -> Result<Subject, sqlx::Error> {
        let query = format!(
            "INSERT INTO subjects (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(Option::as_deref))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subjects WHERE id = $1");
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Subject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subjects ORDER BY id");
        sqlx::query_as::<_, Subject>(&query).fetch_all(pool).await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update a subject. Only non-`None` fields in `input` are applied;
    /// `description` is set to NULL when supplied as `Some(None)`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubject,
    ) -> Result<Option<Subject>, sqlx::Error> {
        let query = format!(
            "UPDATE subjects SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(Option::as_deref))
            .fetch_optional(pool)
            .await
    }

    /// Delete a subject and, by cascade, its tasks and their deadlines.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
