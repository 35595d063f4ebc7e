//! Handlers for the `/auth` resource (register, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use studysync_core::cache::ListKey;
use studysync_core::error::CoreError;
use studysync_core::roles::Role;
use studysync_db::models::user::{CreateUser, UserResponse};
use studysync_db::repositories::UserRepo;
use validator::Validate;

use crate::auth::jwt::issue_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    /// `admin` or `user`; defaults to `user`.
    pub role: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.validate()?;

    let role = match input.role.as_deref().map(str::trim) {
        None | Some("") => Role::default(),
        Some(raw) => raw.parse::<Role>()?,
    };

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            password_hash,
            role: role.as_str().to_string(),
        },
    )
    .await?;

    state.cache.invalidate_after_write(ListKey::Users).await;

    tracing::info!(user_id = user.id, role = %role, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/login
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    input.validate()?;

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| CoreError::unauthorized("invalid credentials"))?;

    if !verify_password(&input.password, &user.password_hash) {
        return Err(CoreError::unauthorized("invalid credentials").into());
    }

    let token = issue_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    state.cache.invalidate(ListKey::Users).await;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}
