pub mod auth;
pub mod deadlines;
pub mod health;
pub mod subjects;
pub mod tasks;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree. Paths are mounted at the root.
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
///
/// /users                         list (admin)
/// /users/{id}                    get, delete (admin)
///
/// /subjects                      list, create
/// /subjects/{id}                 get, update, delete
///
/// /tasks                         filtered list, create
/// /tasks/{id}                    get, update, delete
///
/// /deadlines                     list, create
/// /deadlines/{id}                get, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/subjects", subjects::router())
        .nest("/tasks", tasks::router())
        .nest("/deadlines", deadlines::router())
}
