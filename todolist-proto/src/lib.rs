//! Shared task schema and persisted JSON format for `todolist`.

pub mod codec;
pub mod task;

pub use task::{Task, TaskId};
