//! Pure state transitions for the per-list task collections.
//!
//! `apply()` is THE transition codepath: no I/O, no mutation of the
//! input. Each list's sequence sits behind an `Arc`: a transition
//! clones the map (cheap, refcount bumps) and swaps in a new sequence
//! only for the entry it touches, so consumers can change-detect
//! untouched lists by pointer identity.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{Task, TaskPatch, TodoList};

// ── Actions ────────────────────────────────────────────────────

/// Everything the store understands. Task actions mutate the task
/// collections; list actions arrive from the sibling list store and
/// keep the two in lockstep; status/error actions land in
/// [`RequestState`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RemoveTask {
        list_id: String,
        task_id: String,
    },
    AddTask {
        task: Task,
    },
    UpdateTask {
        list_id: String,
        task_id: String,
        patch: TaskPatch,
    },
    AddList {
        list: TodoList,
    },
    RemoveList {
        list_id: String,
    },
    SetLists {
        lists: Vec<TodoList>,
    },
    SetTasks {
        list_id: String,
        tasks: Vec<Task>,
    },
    SetStatus {
        status: RequestStatus,
    },
    SetError {
        message: Option<String>,
    },
}

// ── Request status ─────────────────────────────────────────────

/// Global request status surfaced to the UI:
/// idle → loading → succeeded | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// The status/error pair the workflows signal into. Its own tiny
/// reducer over the shared action vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestState {
    pub status: RequestStatus,
    pub error: Option<String>,
}

impl RequestState {
    /// Apply one action. Everything except the status/error actions is
    /// a no-op here.
    pub fn apply(&self, action: &Action) -> RequestState {
        match action {
            Action::SetStatus { status } => RequestState {
                status: *status,
                error: self.error.clone(),
            },
            Action::SetError { message } => RequestState {
                status: self.status,
                error: message.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Back to idle with the error cleared. Runs before each workflow
    /// trigger.
    pub fn reset(&self) -> RequestState {
        RequestState::default()
    }
}

// ── Task collections ───────────────────────────────────────────

/// Per-list task sequences, keyed by parent list id.
///
/// Invariant: every list id known to the sibling list store has an
/// entry here (possibly empty), maintained by reacting to the list
/// actions. Insertion order matters: newly added tasks prepend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasksState {
    lists: HashMap<String, Arc<Vec<Task>>>,
}

impl TasksState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Task sequence for a list; empty if the list is unknown.
    pub fn tasks(&self, list_id: &str) -> &[Task] {
        self.lists
            .get(list_id)
            .map(|tasks| tasks.as_slice())
            .unwrap_or(&[])
    }

    /// Shared handle to a list's sequence, if the entry exists. Lets
    /// consumers change-detect by `Arc::ptr_eq`.
    pub fn entry(&self, list_id: &str) -> Option<&Arc<Vec<Task>>> {
        self.lists.get(list_id)
    }

    pub fn contains_list(&self, list_id: &str) -> bool {
        self.lists.contains_key(list_id)
    }

    /// Number of list entries (not tasks).
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Look up one task by id within a list.
    pub fn find(&self, list_id: &str, task_id: &str) -> Option<&Task> {
        self.tasks(list_id).iter().find(|t| t.id == task_id)
    }

    /// Apply one action, producing the next state. The input is left
    /// untouched; untouched entries share their allocation with it.
    pub fn apply(&self, action: &Action) -> TasksState {
        let mut lists = self.lists.clone();

        match action {
            Action::RemoveTask { list_id, task_id } => {
                if let Some(tasks) = lists.get_mut(list_id) {
                    // Unknown task id: keep the sequence identity.
                    if tasks.iter().any(|t| t.id == *task_id) {
                        *tasks = Arc::new(
                            tasks
                                .iter()
                                .filter(|t| t.id != *task_id)
                                .cloned()
                                .collect(),
                        );
                    }
                }
            }

            Action::AddTask { task } => {
                // The entry normally exists already (AddList/SetLists
                // initialize it). Tolerate a missing one by creating it.
                let tasks = lists.entry(task.todo_list_id.clone()).or_default();
                let mut next = Vec::with_capacity(tasks.len() + 1);
                next.push(task.clone());
                next.extend(tasks.iter().cloned());
                *tasks = Arc::new(next);
            }

            Action::UpdateTask {
                list_id,
                task_id,
                patch,
            } => {
                if let Some(tasks) = lists.get_mut(list_id) {
                    if tasks.iter().any(|t| t.id == *task_id) {
                        *tasks = Arc::new(
                            tasks
                                .iter()
                                .map(|t| {
                                    if t.id == *task_id {
                                        t.with_patch(patch)
                                    } else {
                                        t.clone()
                                    }
                                })
                                .collect(),
                        );
                    }
                }
            }

            Action::AddList { list } => {
                lists.insert(list.id.clone(), Arc::default());
            }

            Action::RemoveList { list_id } => {
                lists.remove(list_id);
            }

            Action::SetLists { lists: incoming } => {
                // Every named list gets a fresh empty entry, existing
                // ones included. The bulk load is a full resync.
                for list in incoming {
                    lists.insert(list.id.clone(), Arc::default());
                }
            }

            Action::SetTasks { list_id, tasks } => {
                lists.insert(list_id.clone(), Arc::new(tasks.clone()));
            }

            // Status/error actions belong to RequestState.
            Action::SetStatus { .. } | Action::SetError { .. } => {}
        }

        TasksState { lists }
    }
}

// ── Tests ──────────────────────────────────────────────────────
