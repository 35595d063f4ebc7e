//! Cache contract for list responses.
//!
//! The cache stores opaque serialized bytes under a small fixed set of keys,
//! one per entity list. Backends live in the API crate; everything here is
//! storage-agnostic.

use std::time::Duration;

use async_trait::async_trait;

/// Lifetime of every cached list entry.
pub const LIST_TTL: Duration = Duration::from_secs(30);

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value store holding serialized list payloads.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get the stored bytes for `key`, or `None` on a miss or expired entry.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()>;

    /// Remove `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;
}

/// The cached entity lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKey {
    Users,
    Subjects,
    Tasks,
    Deadlines,
}

impl ListKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ListKey::Users => "users:all",
            ListKey::Subjects => "subjects:all",
            ListKey::Tasks => "tasks:all",
            ListKey::Deadlines => "deadlines:all",
        }
    }

    /// Keys to drop after a write to this entity.
    ///
    /// Task lists embed their subject and deadline lists embed their task, and
    /// deletes cascade down the same chain, so a write also stales every list
    /// below it.
    pub fn invalidated_by_write(self) -> &'static [ListKey] {
        match self {
            ListKey::Users => &[ListKey::Users, ListKey::Deadlines],
            ListKey::Subjects => &[ListKey::Subjects, ListKey::Tasks, ListKey::Deadlines],
            ListKey::Tasks => &[ListKey::Tasks, ListKey::Deadlines],
            ListKey::Deadlines => &[ListKey::Deadlines],
        }
    }
}
