//! Domain types for the task store.
//!
//! Field names and enum encodings mirror the remote API's JSON wire
//! format: camelCase keys, integer status/priority codes. Dates are
//! opaque strings; the server owns their format, we never parse them.

use serde::{Deserialize, Serialize};

// ── Status & priority codes ────────────────────────────────────

/// Task lifecycle as the remote API encodes it: New → InProgress →
/// Completed, with Draft for tasks not yet published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum TaskStatus {
    New = 0,
    InProgress = 1,
    Completed = 2,
    Draft = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum TaskPriority {
    Low = 0,
    Middle = 1,
    High = 2,
    Urgent = 3,
    Later = 4,
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> u8 {
        status as u8
    }
}

impl TryFrom<u8> for TaskStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TaskStatus::New),
            1 => Ok(TaskStatus::InProgress),
            2 => Ok(TaskStatus::Completed),
            3 => Ok(TaskStatus::Draft),
            other => Err(format!("unknown task status code: {other}")),
        }
    }
}

impl From<TaskPriority> for u8 {
    fn from(priority: TaskPriority) -> u8 {
        priority as u8
    }
}

impl TryFrom<u8> for TaskPriority {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TaskPriority::Low),
            1 => Ok(TaskPriority::Middle),
            2 => Ok(TaskPriority::High),
            3 => Ok(TaskPriority::Urgent),
            4 => Ok(TaskPriority::Later),
            other => Err(format!("unknown task priority code: {other}")),
        }
    }
}

// ── Entities ───────────────────────────────────────────────────

/// A single to-do item, exactly as the remote API returns it.
///
/// `id` is unique within its parent list only: two lists may both
/// hold a task "1". `order` is the server-side display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub todo_list_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub added_date: String,
    pub order: i32,
}

/// The parent list. Owned by the sibling list store; it only passes
/// through here as the payload of list actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub added_date: String,
    pub order: i32,
}

// ── Partial updates ────────────────────────────────────────────

/// Partial update to a task's mutable fields. `None` leaves the
/// target field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl Task {
    /// Copy of this task with the patch folded in. Fields the patch
    /// leaves as `None` keep their current value.
    pub fn with_patch(&self, patch: &TaskPatch) -> Task {
        let mut task = self.clone();
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = description.clone();
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(start_date) = &patch.start_date {
            task.start_date = start_date.clone();
        }
        if let Some(deadline) = &patch.deadline {
            task.deadline = deadline.clone();
        }
        task
    }
}

// ── Tests ──────────────────────────────────────────────────────
