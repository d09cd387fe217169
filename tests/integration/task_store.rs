//! Integration tests for the task store's in-memory behavior.
//!
//! Covers position assignment, update/delete edge cases, completion
//! toggling, derived views, and change notifications.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use todolist::config::StorageConfig;
use todolist::tasks::{SortCriterion, TaskError, TaskStore};
use todolist_proto::codec::Layout;
use todolist_proto::task::{Task, TaskId};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn open_store(dir: &tempfile::TempDir) -> TaskStore {
    TaskStore::open(&StorageConfig {
        data_file: dir.path().join("tasks_data.json"),
        layout: Layout::Compact,
    })
}

fn names(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| t.name.clone()).collect()
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[tokio::test]
async fn sorted_by_name_puts_buy_before_call() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let a = store.add(Task::new("Buy milk", "2%")).unwrap();
    let b = store.add(Task::new("Call mom", "")).unwrap();

    // "buy" < "call" in plain ASCII order as well.
    assert!("Buy" < "Call");
    let sorted = store.sorted_view(SortCriterion::ByName);
    assert_eq!(sorted, vec![a, b]);
}

#[tokio::test]
async fn toggling_first_task_moves_it_after_second() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let a = store.add(Task::new("A", "")).unwrap();
    let b = store.add(Task::new("B", "")).unwrap();

    store.toggle_completion(&a.id).unwrap();

    let ids: Vec<TaskId> = store.snapshot().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
async fn add_after_middle_delete_takes_next_position() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.add(Task::new("A", "")).unwrap();
    let b = store.add(Task::new("B", "")).unwrap();
    let c = store.add(Task::new("C", "")).unwrap();

    let removed = store.delete_at(1).unwrap();
    assert_eq!(removed.id, b.id);

    let d = store.add(Task::new("D", "")).unwrap();
    assert_eq!(d.original_position, 3);
    assert!(d.original_position > c.original_position);
    assert_eq!(names(&store.snapshot()), ["A", "C", "D"]);
}

#[tokio::test]
async fn positions_equal_length_before_each_add() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    for i in 0..25 {
        let before = store.len();
        let task = store.add(Task::new(format!("task {i}"), "")).unwrap();
        assert_eq!(task.original_position, before);
    }
}

// ===========================================================================
// Edge cases
// ===========================================================================

#[tokio::test]
async fn update_unknown_id_leaves_list_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.add(Task::new("A", "")).unwrap();
    store.add(Task::new("B", "")).unwrap();
    let before = store.snapshot();

    let mut stranger = Task::new("Z", "");
    stranger.id = TaskId::from_string("not-in-store");
    assert!(!store.update(stranger));

    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn update_never_inserts() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.update(Task::new("ghost", ""));
    assert!(store.is_empty());
}

#[tokio::test]
async fn delete_out_of_range_leaves_list_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.add(Task::new("A", "")).unwrap();
    let before = store.snapshot();

    assert!(store.delete_at(1).is_none());
    assert!(store.delete_at(100).is_none());
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn delete_on_empty_store_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    assert!(store.delete_at(0).is_none());
}

#[tokio::test]
async fn duplicate_id_add_is_rejected_and_list_kept() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let original = store.add(Task::new("original", "")).unwrap();

    let mut copy = Task::new("copy", "");
    copy.id = original.id.clone();
    assert_eq!(
        store.add(copy),
        Err(TaskError::DuplicateId(original.id.to_string()))
    );
    assert_eq!(store.snapshot(), vec![original]);
}

#[tokio::test]
async fn toggle_keeps_creation_order_within_groups() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let a = store.add(Task::new("A", "")).unwrap();
    let b = store.add(Task::new("B", "")).unwrap();
    let c = store.add(Task::new("C", "")).unwrap();
    store.add(Task::new("D", "")).unwrap();

    store.toggle_completion(&c.id).unwrap();
    store.toggle_completion(&a.id).unwrap();
    assert_eq!(names(&store.snapshot()), ["B", "D", "A", "C"]);

    store.toggle_completion(&b.id).unwrap();
    assert_eq!(names(&store.snapshot()), ["D", "A", "B", "C"]);
}

#[tokio::test]
async fn update_can_mark_completed_without_reordering() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let mut a = store.add(Task::new("A", "")).unwrap();
    store.add(Task::new("B", "")).unwrap();

    a.is_completed = true;
    assert!(store.update(a));
    // Only toggle_completion re-sorts.
    assert_eq!(names(&store.snapshot()), ["A", "B"]);
    assert!(store.get(0).unwrap().is_completed);
}

// ===========================================================================
// Views
// ===========================================================================

#[tokio::test]
async fn empty_filter_returns_canonical_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let a = store.add(Task::new("zeta", "")).unwrap();
    store.add(Task::new("alpha", "")).unwrap();
    store.toggle_completion(&a.id).unwrap();

    assert_eq!(store.filtered_view(""), store.snapshot());
}

#[tokio::test]
async fn filter_searches_descriptions_too() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.add(Task::new("Groceries", "milk, eggs")).unwrap();
    store.add(Task::new("Milk the cow", "")).unwrap();
    store.add(Task::new("Laundry", "")).unwrap();

    assert_eq!(
        names(&store.filtered_view("MILK")),
        ["Groceries", "Milk the cow"]
    );
}

#[tokio::test]
async fn sort_by_name_is_case_insensitive_and_stable() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.add(Task::new("beta", "1")).unwrap();
    store.add(Task::new("Alpha", "")).unwrap();
    store.add(Task::new("BETA", "2")).unwrap();
    store.add(Task::new("alpha2", "")).unwrap();

    let sorted = store.sorted_view(SortCriterion::ByName);
    let labels: Vec<String> = sorted
        .iter()
        .map(|t| format!("{}{}", t.name, t.description))
        .collect();
    assert_eq!(labels, ["Alpha", "alpha2", "beta1", "BETA2"]);
}

#[tokio::test]
async fn sort_by_creation_undoes_completion_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let a = store.add(Task::new("A", "")).unwrap();
    store.add(Task::new("B", "")).unwrap();
    store.toggle_completion(&a.id).unwrap();

    assert_eq!(
        names(&store.sorted_view(SortCriterion::ByCreation)),
        ["A", "B"]
    );
    assert_eq!(names(&store.snapshot()), ["B", "A"]);
}

// ===========================================================================
// Notifications
// ===========================================================================

#[tokio::test]
async fn subscriber_sees_mutation_before_call_returns() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let sub = store.subscribe();

    store.add(Task::new("A", "")).unwrap();
    assert_eq!(names(&sub.current()), ["A"]);

    store.delete_at(0).unwrap();
    assert!(sub.current().is_empty());
}

#[tokio::test]
async fn late_subscriber_gets_latest_list_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.add(Task::new("A", "")).unwrap();
    store.add(Task::new("B", "")).unwrap();

    let mut sub = store.subscribe();
    let first = tokio::time::timeout(Duration::from_secs(1), sub.next())
        .await
        .expect("replay should be immediate")
        .unwrap();
    assert_eq!(names(&first), ["A", "B"]);
}

#[tokio::test]
async fn subscriber_task_is_woken_by_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let mut sub = store.subscribe();
    sub.try_next();

    let waiter = tokio::spawn(async move { sub.next().await });
    store.add(Task::new("A", "")).unwrap();

    let seen = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("subscriber should be notified")
        .unwrap()
        .unwrap();
    assert_eq!(names(&seen), ["A"]);
}

#[tokio::test]
async fn multiple_subscribers_observe_same_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let mut first = store.subscribe();
    let mut second = store.subscribe();
    first.try_next();
    second.try_next();

    let a = store.add(Task::new("A", "")).unwrap();
    store.toggle_completion(&a.id).unwrap();

    let one = first.try_next().unwrap();
    let two = second.try_next().unwrap();
    assert_eq!(one, two);
    assert!(one[0].is_completed);
}

#[tokio::test]
async fn subscription_ends_when_store_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let mut sub = store.subscribe();
    sub.try_next();
    drop(store);
    assert!(sub.next().await.is_none());
}

#[tokio::test]
async fn clones_share_one_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let handle = store.clone();
    handle.add(Task::new("via clone", "")).unwrap();
    assert_eq!(names(&store.snapshot()), ["via clone"]);
}
