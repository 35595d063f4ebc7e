//! Subject entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studysync_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::patch;

/// A row from the `subjects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subject {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a subject.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubject {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating a subject. Absent fields are left unchanged; an
/// explicit `"description": null` clears the description.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateSubject {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub description: Option<Option<String>>,
}
