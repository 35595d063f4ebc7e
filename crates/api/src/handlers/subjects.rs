//! Handlers for the `/subjects` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use studysync_core::cache::ListKey;
use studysync_core::types::DbId;
use studysync_db::models::subject::{CreateSubject, Subject, UpdateSubject};
use studysync_db::repositories::SubjectRepo;
use validator::Validate;

use crate::cache::CachedJson;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /subjects
pub async fn create(
    _user: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateSubject>,
) -> AppResult<(StatusCode, Json<Subject>)> {
    input.validate()?;
    let subject = SubjectRepo::create(&state.pool, &input).await?;
    state.cache.invalidate_after_write(ListKey::Subjects).await;
    Ok((StatusCode::CREATED, Json(subject)))
}

/// GET /subjects
pub async fn list(_user: AuthUser, State(state): State<AppState>) -> AppResult<CachedJson> {
    state
        .cache
        .get_or_load(ListKey::Subjects, || async {
            Ok::<_, AppError>(SubjectRepo::list(&state.pool).await?)
        })
        .await
}

/// GET /subjects/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Subject>> {
    state.cache.invalidate(ListKey::Subjects).await;

    let subject = SubjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Subject", id))?;
    Ok(Json(subject))
}

/// PUT /subjects/{id}
pub async fn update(
    _user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateSubject>,
) -> AppResult<Json<Subject>> {
    input.validate()?;
    let subject = SubjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Subject", id))?;
    state.cache.invalidate_after_write(ListKey::Subjects).await;
    Ok(Json(subject))
}

/// DELETE /subjects/{id}
pub async fn delete(
    _user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if !SubjectRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Subject", id));
    }
    state.cache.invalidate_after_write(ListKey::Subjects).await;
    Ok(StatusCode::NO_CONTENT)
}
