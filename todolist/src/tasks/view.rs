//! Derived views over the canonical task list.
//!
//! Everything here works on borrowed slices and returns fresh vectors (or
//! reorders a caller-owned buffer). Nothing in this module touches the
//! store, so a view can never leak back into the source of truth.

use std::str::FromStr;

use todolist_proto::task::Task;

/// Ordering applied by [`sort_tasks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriterion {
    /// Name, case-insensitive ascending. Ties keep list order.
    ByName,
    /// `original_position` ascending, i.e. creation order.
    ByCreation,
}

impl FromStr for SortCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "alpha" | "alphabetical" | "alphabetically" => Ok(Self::ByName),
            "created" | "creation" | "creation-date" | "position" => Ok(Self::ByCreation),
            other => Err(format!(
                "unknown sort criterion `{other}` (expected `name` or `created`)"
            )),
        }
    }
}

impl std::fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByName => write!(f, "name"),
            Self::ByCreation => write!(f, "created"),
        }
    }
}

/// Returns a copy of `tasks` ordered by `criterion`.
///
/// Both orderings are stable.
#[must_use]
pub fn sort_tasks(tasks: &[Task], criterion: SortCriterion) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    match criterion {
        SortCriterion::ByName => sorted.sort_by_cached_key(|t| t.name.to_lowercase()),
        SortCriterion::ByCreation => sorted.sort_by_key(|t| t.original_position),
    }
    sorted
}

/// Returns the tasks whose name or description contains `query`,
/// ignoring case, in their original order.
///
/// An empty query matches everything.
#[must_use]
pub fn filter_tasks(tasks: &[Task], query: &str) -> Vec<Task> {
    if query.is_empty() {
        return tasks.to_vec();
    }
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|t| t.matches_lowercase(&needle))
        .cloned()
        .collect()
}

/// Stable partition: incomplete tasks first, completed last.
///
/// Relative order inside each group is whatever the slice already had.
/// Applied to freshly loaded lists.
pub fn incomplete_first(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| t.is_completed);
}

/// Incomplete before completed, each group in creation order.
///
/// Applied to the canonical list after a completion toggle.
pub fn completion_order(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| (t.is_completed, t.original_position));
}
