//! The canonical task list.
//!
//! `TaskStore` is the single source of truth for tasks. Every mutation
//! updates the in-memory list, publishes the new list to subscribers, and
//! queues a snapshot for the background writer, all while the list lock is
//! held. Observers therefore see each change before the mutating call
//! returns, and the file receives changes in the order they were made.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use todolist_proto::task::{Task, TaskId};

use super::TaskError;
use super::persist::{self, TaskWriter};
use super::subscription::{TaskSnapshot, TaskSubscription};
use super::view::{self, SortCriterion};
use crate::config::StorageConfig;

struct Inner {
    tasks: Mutex<Vec<Task>>,
    notifier: watch::Sender<TaskSnapshot>,
    writer: TaskWriter,
    path: PathBuf,
}

/// Shared handle to the task list and its backing file.
///
/// Cloning is cheap; all clones operate on the same list. Construct one
/// per application with [`TaskStore::open`] and pass it to whoever needs
/// it.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("path", &self.inner.path)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl TaskStore {
    /// Creates a store backed by the configured file and starts its
    /// background writer.
    ///
    /// The list starts empty; call [`load`](Self::load) to read the file.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn open(config: &StorageConfig) -> Self {
        let (notifier, _) = watch::channel(TaskSnapshot::from(Vec::new()));
        let writer = TaskWriter::spawn(config.data_file.clone(), config.layout);
        tracing::debug!(path = %config.data_file.display(), "task store opened");
        Self {
            inner: Arc::new(Inner {
                tasks: Mutex::new(Vec::new()),
                notifier,
                writer,
                path: config.data_file.clone(),
            }),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Reads the backing file and makes its contents the canonical list.
    ///
    /// Loaded tasks are ordered incomplete-first, keeping file order within
    /// each group. A missing, unreadable, or malformed file is logged and
    /// leaves the list as it was. Subscribers are notified either way.
    ///
    /// Tasks added before the load finished are discarded, and the loaded
    /// list is queued for writing so the file does not keep them either.
    ///
    /// Returns the canonical list after the load.
    pub async fn load(&self) -> Vec<Task> {
        let loaded = match persist::read_tasks_in_background(self.inner.path.clone()).await {
            Ok(Some(tasks)) => Some(tasks),
            Ok(None) => {
                tracing::info!(path = %self.inner.path.display(), "no task file yet");
                None
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.inner.path.display(),
                    error = %e,
                    "failed to load tasks; starting with an empty list"
                );
                None
            }
        };

        let mut tasks = self.inner.tasks.lock();
        let Some(mut fresh) = loaded else {
            self.publish(&tasks);
            return tasks.clone();
        };

        drop_duplicate_ids(&mut fresh);
        view::incomplete_first(&mut fresh);
        tracing::info!(count = fresh.len(), "tasks loaded");
        let replaced_early_adds = !tasks.is_empty();
        *tasks = fresh;

        if replaced_early_adds {
            // Those adds already queued their own snapshots; overwrite them
            // so the file matches the list again.
            tracing::warn!("load finished after tasks were added; replacing them");
            self.commit(&tasks);
        } else {
            self.publish(&tasks);
        }
        tasks.clone()
    }

    /// Appends `task` and assigns its creation-order position.
    ///
    /// The position is the current list length, or one past the highest
    /// surviving position if deletions left that higher, so positions keep
    /// increasing in insertion order.
    ///
    /// Returns the task as stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::DuplicateId`] if a task with the same id is
    /// already present. The list is left unchanged.
    pub fn add(&self, mut task: Task) -> Result<Task, TaskError> {
        let mut tasks = self.inner.tasks.lock();
        if tasks.iter().any(|t| t.id == task.id) {
            tracing::error!(task_id = %task.id, "refusing to add task with duplicate id");
            return Err(TaskError::DuplicateId(task.id.to_string()));
        }

        task.original_position = next_position(&tasks);
        tasks.push(task.clone());
        tracing::debug!(
            task_id = %task.id,
            position = task.original_position,
            name = %task.name,
            "task added"
        );
        self.commit(&tasks);
        Ok(task)
    }

    /// Replaces the task with the same id, keeping its position in the
    /// list and its `original_position`.
    ///
    /// Unknown ids are ignored. Returns whether a task was replaced.
    pub fn update(&self, task: Task) -> bool {
        let mut tasks = self.inner.tasks.lock();
        let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) else {
            tracing::debug!(task_id = %task.id, "update for unknown task ignored");
            return false;
        };
        let original_position = slot.original_position;
        *slot = task;
        slot.original_position = original_position;
        tracing::debug!(task_id = %slot.id, "task updated");
        self.commit(&tasks);
        true
    }

    /// Removes the task at `index` in the canonical list.
    ///
    /// Out-of-range indices are ignored. Returns the removed task.
    pub fn delete_at(&self, index: usize) -> Option<Task> {
        let mut tasks = self.inner.tasks.lock();
        if index >= tasks.len() {
            tracing::debug!(index, len = tasks.len(), "delete out of range ignored");
            return None;
        }
        let removed = tasks.remove(index);
        tracing::debug!(task_id = %removed.id, index, "task deleted");
        self.commit(&tasks);
        Some(removed)
    }

    /// Flips the completion flag of the task with `id`, then reorders the
    /// list: incomplete before completed, each group in creation order.
    ///
    /// Unknown ids are ignored. Returns the updated task.
    pub fn toggle_completion(&self, id: &TaskId) -> Option<Task> {
        let mut tasks = self.inner.tasks.lock();
        let task = tasks.iter_mut().find(|t| &t.id == id)?;
        task.is_completed = !task.is_completed;
        let toggled = task.clone();
        view::completion_order(&mut tasks);
        tracing::debug!(
            task_id = %id,
            completed = toggled.is_completed,
            "task completion toggled"
        );
        self.commit(&tasks);
        Some(toggled)
    }

    /// Returns the tasks ordered by `criterion`. The canonical list is not
    /// reordered.
    #[must_use]
    pub fn sorted_view(&self, criterion: SortCriterion) -> Vec<Task> {
        view::sort_tasks(&self.inner.tasks.lock(), criterion)
    }

    /// Returns the tasks whose name or description contains `query`,
    /// ignoring case, in canonical order. An empty query returns every task.
    #[must_use]
    pub fn filtered_view(&self, query: &str) -> Vec<Task> {
        view::filter_tasks(&self.inner.tasks.lock(), query)
    }

    /// Registers for change notifications.
    #[must_use]
    pub fn subscribe(&self) -> TaskSubscription {
        TaskSubscription::new(self.inner.notifier.subscribe())
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.notifier.receiver_count()
    }

    /// Copy of the canonical list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.inner.tasks.lock().clone()
    }

    /// Task at `index` in the canonical list.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Task> {
        self.inner.tasks.lock().get(index).cloned()
    }

    /// Task with the given id.
    #[must_use]
    pub fn find(&self, id: &TaskId) -> Option<Task> {
        self.inner.tasks.lock().iter().find(|t| &t.id == id).cloned()
    }

    /// Number of tasks in the canonical list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.tasks.lock().len()
    }

    /// Whether the canonical list has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.tasks.lock().is_empty()
    }

    /// Queues the current list for writing without changing it.
    pub fn save(&self) {
        let tasks = self.inner.tasks.lock();
        self.inner.writer.enqueue(TaskSnapshot::from(tasks.as_slice()));
    }

    /// Waits for every write queued so far to finish.
    pub async fn flush(&self) {
        self.inner.writer.flush().await;
    }

    /// Publishes and persists `tasks`. Call with the list lock held.
    fn commit(&self, tasks: &[Task]) {
        let snapshot = self.publish(tasks);
        self.inner.writer.enqueue(snapshot);
    }

    fn publish(&self, tasks: &[Task]) -> TaskSnapshot {
        let snapshot = TaskSnapshot::from(tasks);
        self.inner.notifier.send_replace(Arc::clone(&snapshot));
        snapshot
    }
}

fn next_position(tasks: &[Task]) -> usize {
    tasks
        .iter()
        .map(|t| t.original_position.saturating_add(1))
        .fold(tasks.len(), usize::max)
}

/// Keeps the first task for each id.
fn drop_duplicate_ids(tasks: &mut Vec<Task>) {
    let mut seen = HashSet::new();
    let before = tasks.len();
    tasks.retain(|t| seen.insert(t.id.clone()));
    if tasks.len() != before {
        tracing::warn!(
            dropped = before - tasks.len(),
            "task file contained duplicate ids; kept the first of each"
        );
    }
}
