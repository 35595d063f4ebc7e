//! Cache-aside handling for the unfiltered entity lists.
//!
//! Reads go through [`ListCache::get_or_load`]: a hit returns the stored
//! JSON bytes untouched, a miss loads from the store, serializes once, stores
//! the bytes for [`LIST_TTL`] and returns them. Writes call
//! [`ListCache::invalidate_after_write`] once the store mutation succeeded.
//!
//! Cache failures are logged and otherwise ignored: a failed read is a miss,
//! a failed write or delete leaves the entry to expire on its own.

mod memory;
mod redis_impl;

use std::future::Future;
use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use studysync_core::cache::{Cache, ListKey, LIST_TTL};

pub use memory::MemoryCache;
pub use redis_impl::{map_redis_error, RedisCache};

use crate::error::{AppError, AppResult};

/// Entry limit for the in-process fallback cache.
const MEMORY_CACHE_ENTRIES: usize = 64;

/// Serialized JSON ready to be sent as a response body.
#[derive(Debug, Clone)]
pub struct CachedJson(pub Vec<u8>);

impl IntoResponse for CachedJson {
    fn into_response(self) -> Response {
        (
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            self.0,
        )
            .into_response()
    }
}

/// Handle to the list cache shared through `AppState`.
#[derive(Clone)]
pub struct ListCache {
    backend: Arc<dyn Cache>,
}

impl ListCache {
    pub fn new(backend: Arc<dyn Cache>) -> Self {
        Self { backend }
    }

    /// In-process cache, used when no Redis URL is configured.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new(MEMORY_CACHE_ENTRIES)))
    }

    /// Connect to Redis when `redis_url` is given, falling back to the
    /// in-process cache if it is absent or unreachable.
    pub async fn connect(redis_url: Option<&str>) -> Self {
        let Some(url) = redis_url else {
            tracing::info!("REDIS_URL not set, using in-memory list cache");
            return Self::in_memory();
        };

        match RedisCache::new(url).await {
            Ok(cache) => {
                tracing::info!("Connected to Redis list cache");
                Self::new(Arc::new(cache))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, using in-memory list cache");
                Self::in_memory()
            }
        }
    }

    /// Return the cached list under `key`, or build it with `load`.
    pub async fn get_or_load<T, F, Fut>(&self, key: ListKey, load: F) -> AppResult<CachedJson>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        match self.backend.get(key.as_str()).await {
            Ok(Some(bytes)) => {
                tracing::debug!(key = key.as_str(), "List cache hit");
                return Ok(CachedJson(bytes));
            }
            Ok(None) => tracing::debug!(key = key.as_str(), "List cache miss"),
            Err(e) => {
                tracing::warn!(key = key.as_str(), error = %e, "List cache read failed");
            }
        }

        let value = load().await?;
        let bytes = serde_json::to_vec(&value)
            .map_err(|e| AppError::InternalError(format!("Failed to serialize list: {e}")))?;

        if let Err(e) = self.backend.set(key.as_str(), &bytes, Some(LIST_TTL)).await {
            tracing::warn!(key = key.as_str(), error = %e, "List cache write failed");
        }

        Ok(CachedJson(bytes))
    }

    /// Drop a single list entry.
    pub async fn invalidate(&self, key: ListKey) {
        if let Err(e) = self.backend.delete(key.as_str()).await {
            tracing::warn!(key = key.as_str(), error = %e, "List cache delete failed");
        }
    }

    /// Drop every list made stale by a write to `key`'s entity.
    pub async fn invalidate_after_write(&self, key: ListKey) {
        for stale in key.invalidated_by_write() {
            self.invalidate(*stale).await;
        }
    }
}
