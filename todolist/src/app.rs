//! Command-line front end over the task store.
//!
//! Each [`Command`] maps to one store operation. Positions given on the
//! command line always index the canonical list as printed by `list`;
//! sorted and filtered output is display-only and shows canonical
//! positions too, so it can be used to pick a task for a later command.

use std::fmt::Write as _;

use todolist_proto::task::Task;

use crate::tasks::{SortCriterion, TaskError, TaskStore, TaskSubscription};

/// A single user action.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new task.
    Add {
        /// Task name.
        name: String,
        /// Optional description.
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List tasks in stored order.
    #[command(visible_alias = "ls")]
    List,
    /// Change the name or description of a task.
    Edit {
        /// Position shown by `list`.
        index: usize,
        /// New name.
        #[arg(short, long)]
        name: Option<String>,
        /// New description.
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Mark a task completed, or incomplete again.
    #[command(visible_alias = "done")]
    Toggle {
        /// Position shown by `list`.
        index: usize,
    },
    /// Delete a task.
    #[command(visible_alias = "rm")]
    Delete {
        /// Position shown by `list`.
        index: usize,
    },
    /// Show tasks ordered by name or by creation, without reordering them.
    Sort {
        /// `name` or `created`.
        criterion: SortCriterion,
    },
    /// Show tasks whose name or description contains a query.
    Search {
        /// Text to look for, ignoring case.
        query: String,
    },
}

/// Presentation state: the store handle plus a live view of its list.
pub struct App {
    store: TaskStore,
    tasks: TaskSubscription,
}

impl App {
    /// Creates the front end and subscribes to the store.
    #[must_use]
    pub fn new(store: TaskStore) -> Self {
        let tasks = store.subscribe();
        Self { store, tasks }
    }

    /// Runs one command and returns the text to print.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NameEmpty`] for a blank name on `add` or
    /// `edit`, [`TaskError::NothingToChange`] for an `edit` without
    /// `--name` or `--description`, and [`TaskError::NoSuchPosition`] for a
    /// position not in the list.
    pub fn execute(&self, command: Command) -> Result<String, TaskError> {
        match command {
            Command::Add { name, description } => {
                let name = validate_name(&name)?;
                let task = self.store.add(Task::new(name, description.trim()))?;
                tracing::info!(task_id = %task.id, "new task added");
                Ok(format!("New task '{}' added\n", task.name))
            }
            Command::List => Ok(self.render_canonical()),
            Command::Edit {
                index,
                name,
                description,
            } => {
                if name.is_none() && description.is_none() {
                    return Err(TaskError::NothingToChange);
                }
                let mut task = self.task_at(index)?;
                if let Some(name) = name {
                    task.name = validate_name(&name)?;
                }
                if let Some(description) = description {
                    task.description = description.trim().to_string();
                }
                if !self.store.update(task.clone()) {
                    return Err(TaskError::NoSuchPosition(index));
                }
                Ok(format!("Task '{}' updated\n", task.name))
            }
            Command::Toggle { index } => {
                let task = self.task_at(index)?;
                let toggled = self
                    .store
                    .toggle_completion(&task.id)
                    .ok_or(TaskError::NoSuchPosition(index))?;
                let state = if toggled.is_completed {
                    "completed"
                } else {
                    "incomplete"
                };
                tracing::info!(task_id = %toggled.id, state, "task toggled");
                Ok(format!("Task '{}' marked as {state}\n", toggled.name))
            }
            Command::Delete { index } => {
                let removed = self
                    .store
                    .delete_at(index)
                    .ok_or(TaskError::NoSuchPosition(index))?;
                Ok(format!("Task '{}' deleted\n", removed.name))
            }
            Command::Sort { criterion } => {
                let sorted = self.store.sorted_view(criterion);
                tracing::debug!(%criterion, count = sorted.len(), "tasks sorted");
                Ok(self.render_view(&sorted))
            }
            Command::Search { query } => {
                let hits = self.store.filtered_view(query.trim());
                if hits.is_empty() {
                    return Ok(format!("No tasks match '{}'\n", query.trim()));
                }
                Ok(self.render_view(&hits))
            }
        }
    }

    fn task_at(&self, index: usize) -> Result<Task, TaskError> {
        self.store
            .get(index)
            .ok_or(TaskError::NoSuchPosition(index))
    }

    fn render_canonical(&self) -> String {
        let tasks = self.tasks.current();
        render_lines(tasks.iter().enumerate())
    }

    /// Renders a derived view, labelling each task with its canonical
    /// position.
    fn render_view(&self, view: &[Task]) -> String {
        let canonical = self.tasks.current();
        render_lines(view.iter().filter_map(|task| {
            canonical
                .iter()
                .position(|t| t.id == task.id)
                .map(|index| (index, task))
        }))
    }
}

/// Trims `name` and rejects it if nothing is left.
///
/// # Errors
///
/// Returns [`TaskError::NameEmpty`] for blank names.
pub fn validate_name(name: &str) -> Result<String, TaskError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TaskError::NameEmpty);
    }
    Ok(trimmed.to_string())
}

/// One line per task: position, checkbox, name, optional description.
#[must_use]
pub fn render_line(index: usize, task: &Task) -> String {
    let checkbox = if task.is_completed { "[x]" } else { "[ ]" };
    if task.description.is_empty() {
        format!("{index:>3}. {checkbox} {}", task.name)
    } else {
        format!("{index:>3}. {checkbox} {} ({})", task.name, task.description)
    }
}

fn render_lines<'a>(rows: impl Iterator<Item = (usize, &'a Task)>) -> String {
    let mut out = String::new();
    for (index, task) in rows {
        let _ = writeln!(out, "{}", render_line(index, task));
    }
    if out.is_empty() {
        out.push_str("No tasks\n");
    }
    out
}
