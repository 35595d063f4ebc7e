//! Handlers for the `/tasks` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use studysync_core::cache::ListKey;
use studysync_core::error::CoreError;
use studysync_core::task_query::{TaskFilter, TaskListQuery};
use studysync_core::types::DbId;
use studysync_db::models::task::{CreateTask, Task, TaskWithSubject, UpdateTask};
use studysync_db::repositories::{SubjectRepo, TaskRepo};
use studysync_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::response::{PageMeta, Paginated};
use crate::state::AppState;

/// POST /tasks
pub async fn create(
    _user: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    input.validate()?;
    ensure_subject_exists(&state.pool, input.subject_id).await?;

    let task = TaskRepo::create(&state.pool, &input).await?;
    state.cache.invalidate_after_write(ListKey::Tasks).await;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /tasks
///
/// Only the plain first page is served from the list cache; any filter,
/// search, sort or paging goes straight to the store.
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TaskListQuery>,
) -> AppResult<Response> {
    if query.is_unfiltered() {
        let filter = TaskFilter::default();
        let body = state
            .cache
            .get_or_load(ListKey::Tasks, || load_page(&state.pool, &filter))
            .await?;
        return Ok(body.into_response());
    }

    let filter = query.to_filter()?;
    let page = load_page(&state.pool, &filter).await?;
    Ok(Json(page).into_response())
}

/// GET /tasks/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<TaskWithSubject>> {
    state.cache.invalidate(ListKey::Tasks).await;

    let task = TaskRepo::find_with_subject(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Task", id))?;
    Ok(Json(task))
}

/// PUT /tasks/{id}
pub async fn update(
    _user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTask>,
) -> AppResult<Json<Task>> {
    input.validate()?;
    if let Some(subject_id) = input.subject_id {
        ensure_subject_exists(&state.pool, subject_id).await?;
    }

    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Task", id))?;
    state.cache.invalidate_after_write(ListKey::Tasks).await;
    Ok(Json(task))
}

/// DELETE /tasks/{id}
pub async fn delete(
    _user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if !TaskRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Task", id));
    }
    state.cache.invalidate_after_write(ListKey::Tasks).await;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_page(pool: &DbPool, filter: &TaskFilter) -> AppResult<Paginated<TaskWithSubject>> {
    let (data, total) = TaskRepo::list_filtered(pool, filter).await?;
    Ok(Paginated {
        data,
        meta: PageMeta::new(filter, total),
    })
}

async fn ensure_subject_exists(pool: &DbPool, subject_id: DbId) -> AppResult<()> {
    if SubjectRepo::exists(pool, subject_id).await? {
        Ok(())
    } else {
        Err(CoreError::validation(format!("subject {subject_id} does not exist")).into())
    }
}
