//! Change notifications for the canonical task list.

use std::sync::Arc;

use tokio::sync::watch;

use todolist_proto::task::Task;

/// Immutable copy of the canonical list at one point in time.
pub type TaskSnapshot = Arc<[Task]>;

/// A registration for task-list changes, obtained from
/// [`TaskStore::subscribe`](super::TaskStore::subscribe).
///
/// Behaves like an observable value with replay: the first call to
/// [`next`](Self::next) or [`try_next`](Self::try_next) yields the list
/// as it was when the subscription was created, later calls yield the
/// latest list after each change. Changes that land between two reads are
/// coalesced into the newest state.
///
/// Dropping the subscription (or calling [`unsubscribe`](Self::unsubscribe))
/// deregisters it.
#[derive(Debug)]
pub struct TaskSubscription {
    rx: watch::Receiver<TaskSnapshot>,
    replay_pending: bool,
}

impl TaskSubscription {
    pub(crate) const fn new(rx: watch::Receiver<TaskSnapshot>) -> Self {
        Self {
            rx,
            replay_pending: true,
        }
    }

    /// Returns the latest list without consuming a notification.
    #[must_use]
    pub fn current(&self) -> TaskSnapshot {
        Arc::clone(&self.rx.borrow())
    }

    /// Waits for the next list to observe.
    ///
    /// Returns `None` once the store has been dropped and no unseen change
    /// remains.
    pub async fn next(&mut self) -> Option<TaskSnapshot> {
        if std::mem::take(&mut self.replay_pending) {
            return Some(Arc::clone(&self.rx.borrow_and_update()));
        }
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }

    /// Non-blocking variant of [`next`](Self::next).
    pub fn try_next(&mut self) -> Option<TaskSnapshot> {
        let replay = std::mem::take(&mut self.replay_pending);
        if replay || self.rx.has_changed().unwrap_or(false) {
            Some(Arc::clone(&self.rx.borrow_and_update()))
        } else {
            None
        }
    }

    /// Ends this subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}
