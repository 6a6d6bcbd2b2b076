//! Task state for a conversation.
//!
//! - [`TaskStore`]: caller-owned list of tasks with an explicit `reset`
//! - [`TaskObserver`]: stream observer that feeds one task of a shared store

mod binding;
mod task;

pub use binding::TaskObserver;
pub use task::{Task, TaskStatus, TaskStore};
