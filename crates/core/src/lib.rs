//! Domain types shared by every StudySync crate.

pub mod cache;
pub mod error;
pub mod roles;
pub mod task_query;
pub mod types;
