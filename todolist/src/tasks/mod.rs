//! The task list: canonical store, persistence, and derived views.
//!
//! [`TaskStore`] owns the authoritative list and is the only thing that
//! mutates it. Persistence to the JSON file is best-effort and happens in
//! the background; views are read-only copies.

pub mod persist;
pub mod store;
pub mod subscription;
pub mod view;

pub use store::TaskStore;
pub use subscription::{TaskSnapshot, TaskSubscription};
pub use view::{SortCriterion, filter_tasks, sort_tasks};

use thiserror::Error;

/// Errors that can occur during task operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task name is empty after trimming.
    #[error("Task name cannot be empty")]
    NameEmpty,
    /// A task with this id is already in the list.
    #[error("task id already in use: {0}")]
    DuplicateId(String),
    /// An edit named no field to change.
    #[error("Nothing to change: give --name or --description")]
    NothingToChange,
    /// No task at the given position of the list.
    #[error("No task at position {0}")]
    NoSuchPosition(usize),
}
