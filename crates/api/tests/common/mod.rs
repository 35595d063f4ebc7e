#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use studysync_api::auth::jwt::{issue_token, JwtConfig};
use studysync_api::auth::password::hash_password;
use studysync_api::cache::ListCache;
use studysync_api::config::ServerConfig;
use studysync_api::router::build_app_router;
use studysync_api::state::AppState;
use studysync_core::cache::Cache;
use studysync_core::types::DbId;
use studysync_db::models::user::{CreateUser, User};
use studysync_db::repositories::UserRepo;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";
pub const TEST_PASSWORD: &str = "secret123";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 10,
        database_url: String::new(),
        redis_url: None,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
    }
}

/// Build the full application router over `pool` with a fresh in-memory
/// list cache.
///
/// The returned router is `Clone`; clones share the cache, so a test that
/// checks caching behaviour must reuse one router across requests.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_with(pool, ListCache::in_memory())
}

/// Same as [`build_test_app`] with a caller-supplied cache backend.
pub fn build_test_app_with_cache(pool: PgPool, backend: Arc<dyn Cache>) -> Router {
    build_app_with(pool, ListCache::new(backend))
}

fn build_app_with(pool: PgPool, cache: ListCache) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] directly into the database.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash,
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Sign a token for `user_id` with the test secret.
pub fn token_for(user_id: DbId, role: &str) -> String {
    issue_token(user_id, role, &test_config().jwt).expect("token should sign")
}

/// Create a user and return it with a valid token.
pub async fn user_with_token(pool: &PgPool, email: &str, role: &str) -> (User, String) {
    let user = create_user(pool, email, role).await;
    let token = token_for(user.id, role);
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router should respond")
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Send a raw request, for cases the helpers above do not cover.
pub async fn send_raw(app: Router, request: Request<Body>) -> Response<Body> {
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Resource shortcuts
// ---------------------------------------------------------------------------

/// POST /subjects and return the new id.
pub async fn create_subject(app: Router, token: &str, name: &str) -> DbId {
    let body = serde_json::json!({ "name": name });
    let response = post_json_auth(app, "/subjects", body, token).await;
    assert_eq!(response.status(), 201, "subject creation should succeed");
    body_json(response).await["id"].as_i64().expect("id")
}

/// POST /tasks and return the new id.
pub async fn create_task(app: Router, token: &str, body: serde_json::Value) -> DbId {
    let response = post_json_auth(app, "/tasks", body, token).await;
    assert_eq!(response.status(), 201, "task creation should succeed");
    body_json(response).await["id"].as_i64().expect("id")
}
