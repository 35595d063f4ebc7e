//! Repository layer: one zero-sized type per table, each method taking the
//! pool explicitly.

pub mod deadline_repo;
pub mod subject_repo;
pub mod task_repo;
pub mod user_repo;

pub use deadline_repo::DeadlineRepo;
pub use subject_repo::SubjectRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
