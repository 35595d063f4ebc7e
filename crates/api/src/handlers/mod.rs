pub mod auth;
pub mod deadlines;
pub mod subjects;
pub mod tasks;
pub mod users;
