//! Handlers for the `/users` resource. Admin only.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use studysync_core::cache::ListKey;
use studysync_core::types::DbId;
use studysync_db::models::user::UserResponse;
use studysync_db::repositories::UserRepo;

use crate::cache::CachedJson;
use crate::error::{AppError, AppResult};
use crate::extract::AppPath;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /users
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<CachedJson> {
    state
        .cache
        .get_or_load(ListKey::Users, || async {
            let users: Vec<UserResponse> = UserRepo::list(&state.pool)
                .await?
                .into_iter()
                .map(UserResponse::from)
                .collect();
            Ok::<_, AppError>(users)
        })
        .await
}

/// GET /users/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<UserResponse>> {
    state.cache.invalidate(ListKey::Users).await;

    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("User", id))?;
    Ok(Json(user.into()))
}

/// DELETE /users/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("User", id));
    }

    state.cache.invalidate_after_write(ListKey::Users).await;

    tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
