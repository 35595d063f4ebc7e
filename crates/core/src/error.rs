//! Domain error taxonomy shared by the repository, API and worker layers.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A direct lookup by id found no row.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Client input rejected before any store access.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A uniqueness rule would be broken (e.g. an already registered email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing, malformed, or expired credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credentials without the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}
