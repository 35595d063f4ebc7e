use axum::routing::get;
use axum::Router;

use crate::handlers::deadlines;
use crate::state::AppState;

/// Routes mounted at `/deadlines`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(deadlines::list).post(deadlines::create))
        .route(
            "/{id}",
            get(deadlines::get_by_id).delete(deadlines::delete),
        )
}
