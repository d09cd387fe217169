//! The task record shared by the in-memory list and the persisted file.
//!
//! A single serde schema drives both forms: field names are renamed to the
//! camel-case keys of the on-disk document (`isCompleted`,
//! `originalPosition`), so a [`Task`] is written and read as-is.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, unique identifier of a task.
///
/// New ids are UUID v7 strings. Ids read back from disk are accepted
/// verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps an existing identifier string.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, fixed at creation.
    pub id: TaskId,
    /// Display name. Never empty when created through the add flow.
    pub name: String,
    /// Free-form description, may be empty.
    pub description: String,
    /// Whether the task has been marked done.
    pub is_completed: bool,
    /// Creation-order key assigned by the store on insertion.
    ///
    /// Survives deletions of other tasks untouched, so gaps are normal.
    pub original_position: usize,
}

impl Task {
    /// Creates an incomplete task with a fresh id.
    ///
    /// `original_position` is left at zero; the store assigns the real
    /// value when the task is added.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            description: description.into(),
            is_completed: false,
            original_position: 0,
        }
    }

    /// Returns `true` if `needle` occurs in the name or the description,
    /// ignoring case.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}
