//! Concrete [`Notifier`](crate::Notifier) implementations.

pub mod email;
pub mod log;
