//! Handlers for the `/deadlines` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use studysync_core::cache::ListKey;
use studysync_core::error::CoreError;
use studysync_core::types::DbId;
use studysync_db::models::deadline::{CreateDeadline, Deadline, DeadlineWithTask, NewDeadline};
use studysync_db::repositories::{DeadlineRepo, TaskRepo, UserRepo};
use validator::Validate;

use crate::cache::CachedJson;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /deadlines
///
/// The task (and the user to remind, which defaults to the caller) must
/// exist; otherwise 400.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateDeadline>,
) -> AppResult<(StatusCode, Json<Deadline>)> {
    input.validate()?;

    if !TaskRepo::exists(&state.pool, input.task_id).await? {
        return Err(CoreError::validation(format!("task {} does not exist", input.task_id)).into());
    }

    let user_id = input.user_id.unwrap_or(user.user_id);
    if !UserRepo::exists(&state.pool, user_id).await? {
        return Err(CoreError::validation(format!("user {user_id} does not exist")).into());
    }

    let deadline = DeadlineRepo::create(
        &state.pool,
        &NewDeadline {
            task_id: input.task_id,
            user_id,
            due_date: input.due_date,
        },
    )
    .await?;

    state.cache.invalidate_after_write(ListKey::Deadlines).await;
    Ok((StatusCode::CREATED, Json(deadline)))
}

/// GET /deadlines
pub async fn list(_user: AuthUser, State(state): State<AppState>) -> AppResult<CachedJson> {
    state
        .cache
        .get_or_load(ListKey::Deadlines, || async {
            Ok::<_, AppError>(DeadlineRepo::list_with_task(&state.pool).await?)
        })
        .await
}

/// GET /deadlines/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DeadlineWithTask>> {
    state.cache.invalidate(ListKey::Deadlines).await;

    let deadline = DeadlineRepo::find_with_task(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Deadline", id))?;
    Ok(Json(deadline))
}

/// DELETE /deadlines/{id}
pub async fn delete(
    _user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if !DeadlineRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Deadline", id));
    }
    state.cache.invalidate_after_write(ListKey::Deadlines).await;
    Ok(StatusCode::NO_CONTENT)
}
