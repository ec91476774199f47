//! Client-side state for a todo-list application: a pure reducer over
//! per-list task collections, plus the async workflows that keep them
//! in sync with the remote todo API.

//---------------------------------------
pub mod model;
pub mod state;
pub mod store;

pub use model::{Task, TaskPatch, TaskPriority, TaskStatus, TodoList};
pub use state::{Action, RequestState, RequestStatus, TasksState};
pub use store::{SharedStore, Store, StoreHandle};
//---------------------------------------

//---------------------------------------
pub mod api;
pub mod error;
pub mod workflows;

pub use api::{ApiResponse, Empty, GetTasksResponse, HttpTodoApi, TaskItem, TodoApi, UpdateTaskPayload};
pub use error::ApiError;
pub use workflows::{TaskWorkflows, Trigger};
//---------------------------------------
