//! The store: serialized dispatch over the pure reducers.
//!
//! One RwLock guards the whole state and every dispatch applies both
//! reducers under the write lock, so apply-order is dispatch-order.
//! Workflows talk to it through [`StoreHandle`], which is also the
//! seam the workflow tests substitute a recording double into.

use std::sync::{Arc, RwLock};

use crate::state::{Action, RequestState, RequestStatus, TasksState};

/// What a workflow needs from the store: dispatch, a snapshot of the
/// task collections, and the status-context reset that runs before
/// each trigger.
pub trait StoreHandle: Send + Sync {
    fn dispatch(&self, action: Action);

    /// Snapshot of the task collections at this instant. Cheap: the
    /// sequences are Arc-shared, only the map is copied.
    fn tasks(&self) -> TasksState;

    /// Status context lifecycle: back to idle, error cleared.
    fn reset_status(&self);
}

impl<S: StoreHandle + ?Sized> StoreHandle for Arc<S> {
    fn dispatch(&self, action: Action) {
        (**self).dispatch(action);
    }

    fn tasks(&self) -> TasksState {
        (**self).tasks()
    }

    fn reset_status(&self) {
        (**self).reset_status();
    }
}

#[derive(Default)]
struct StoreInner {
    tasks: TasksState,
    request: RequestState,
}

/// Task collections plus the global request status/error pair.
#[derive(Default)]
pub struct Store {
    inner: RwLock<StoreInner>,
}

pub type SharedStore = Arc<Store>;

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle for use across workflow instances.
    pub fn shared() -> SharedStore {
        Arc::new(Store::new())
    }

    pub fn status(&self) -> RequestStatus {
        self.inner.read().unwrap().request.status
    }

    pub fn error(&self) -> Option<String> {
        self.inner.read().unwrap().request.error.clone()
    }
}

impl StoreHandle for Store {
    fn dispatch(&self, action: Action) {
        let mut inner = self.inner.write().unwrap();
        inner.tasks = inner.tasks.apply(&action);
        inner.request = inner.request.apply(&action);
    }

    fn tasks(&self) -> TasksState {
        self.inner.read().unwrap().tasks.clone()
    }

    fn reset_status(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.request = inner.request.reset();
    }
}

// ── Tests ──────────────────────────────────────────────────────
