//! Repository for the `tasks` table, including the filtered listing query.

use sqlx::{PgPool, Postgres, QueryBuilder};
use studysync_core::task_query::{escape_like, TaskFilter};
use studysync_core::types::DbId;

use crate::models::task::{CreateTask, Task, TaskWithSubject, UpdateTask};

/// Column list shared across single-table queries.
const COLUMNS: &str =
    "id, title, description, status, deadline, subject_id, sprint_id, created_at";

/// Task columns plus the embedded subject, for `tasks t JOIN subjects s`.
const JOINED_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.deadline, \
     t.subject_id, t.sprint_id, t.created_at, \
     s.id AS subject_ref_id, s.name AS subject_name, \
     s.description AS subject_description, s.created_at AS subject_created_at";

const JOINED_FROM: &str = " FROM tasks t JOIN subjects s ON s.id = t.subject_id";

pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task. `status` defaults to `todo`, `description` to `''`.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (title, description, status, deadline, subject_id, sprint_id)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, 'todo'), $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.deadline.is_some())
            .bind(input.deadline.flatten())
            .bind(input.subject_id)
            .bind(input.sprint_id.is_some())
            .bind(input.sprint_id.flatten())
            .fetch_one(pool)
            .await
    }

    /// Find a task by id with its subject embedded.
    pub async fn find_with_subject(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TaskWithSubject>, sqlx::Error> {
        let query = format!("SELECT {JOINED_COLUMNS}{JOINED_FROM} WHERE t.id = $1");
        sqlx::query_as::<_, TaskWithSubject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Return one page of tasks matching `filter` plus the total number of
    /// matching rows.
    ///
    /// The count and the page are built from the same predicate set, so
    /// `total` always describes the rows being paged over.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &TaskFilter,
    ) -> Result<(Vec<TaskWithSubject>, i64), sqlx::Error> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks t");
        push_predicates(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

        let mut page_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {JOINED_COLUMNS}{JOINED_FROM}"));
        push_predicates(&mut page_query, filter);

        let column = filter.sort.field.column();
        let direction = filter.sort.direction.keyword();
        page_query.push(format!(
            " ORDER BY t.{column} {direction} NULLS LAST, t.id {direction}"
        ));
        page_query.push(" LIMIT ").push_bind(filter.limit);
        page_query.push(" OFFSET ").push_bind(filter.offset());

        let rows = page_query
            .build_query_as::<TaskWithSubject>()
            .fetch_all(pool)
            .await?;

        Ok((rows, total))
    }

    /// Update a task. Only non-`None` fields in `input` are applied;
    /// `deadline` and `sprint_id` are set to NULL when supplied as `Some(None)`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                deadline = CASE WHEN $5 THEN $6 ELSE deadline END,
                subject_id = COALESCE($7, subject_id),
                sprint_id = CASE WHEN $8 THEN $9 ELSE sprint_id END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.deadline.is_some())
            .bind(input.deadline.flatten())
            .bind(input.subject_id)
            .bind(input.sprint_id.is_some())
            .bind(input.sprint_id.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Delete a task and, by cascade, its deadlines.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Append the `WHERE` clause for `filter`. Every value is bound.
fn push_predicates(query: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
    query.push(" WHERE TRUE");

    if let Some(status) = &filter.status {
        query.push(" AND t.status = ").push_bind(status.clone());
    }
    if let Some(subject_id) = filter.subject_id {
        query.push(" AND t.subject_id = ").push_bind(subject_id);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        query
            .push(" AND (t.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR t.description ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(before) = filter.deadline_before {
        query.push(" AND t.deadline < ").push_bind(before);
    }
    if let Some(after) = filter.deadline_after {
        query.push(" AND t.deadline > ").push_bind(after);
    }
}
