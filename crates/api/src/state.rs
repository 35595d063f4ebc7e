use std::sync::Arc;

use crate::cache::ListCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool and cache are handles, the config is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: studysync_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Cache-aside store for the unfiltered entity lists.
    pub cache: ListCache,
}
