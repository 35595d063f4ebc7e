pub mod deadline;
pub mod patch;
pub mod subject;
pub mod task;
pub mod user;
