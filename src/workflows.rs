//! Effect workflows: fetch, add, remove, update.
//!
//! Each workflow is a plain async fn: signal status, make the one
//! remote call, translate the outcome into dispatches. They all hang
//! off [`TaskWorkflows::run`], which resets the status context before
//! handing the trigger to its workflow body. Failures of both kinds,
//! server rejections and transport errors, route through the
//! classifiers in `error.rs` at every call site.

use tracing::warn;

use crate::api::{TodoApi, UpdateTaskPayload};
use crate::error::{handle_network_error, handle_server_error};
use crate::model::TaskPatch;
use crate::state::{Action, RequestStatus};
use crate::store::StoreHandle;

// ── Triggers ───────────────────────────────────────────────────

/// What a UI event asks for. One variant per workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    FetchTasks {
        list_id: String,
    },
    AddTask {
        list_id: String,
        title: String,
    },
    RemoveTask {
        list_id: String,
        task_id: String,
    },
    UpdateTask {
        list_id: String,
        task_id: String,
        patch: TaskPatch,
    },
}

// ── Workflows ──────────────────────────────────────────────────

/// The four effect workflows over one API client and one store
/// handle. Concurrent triggers are not sequenced against each other:
/// the last dispatch to land wins.
pub struct TaskWorkflows<A, S> {
    api: A,
    store: S,
}

impl<A: TodoApi, S: StoreHandle> TaskWorkflows<A, S> {
    pub fn new(api: A, store: S) -> Self {
        TaskWorkflows { api, store }
    }

    /// Trigger entry point. Resets the status context to idle, then
    /// runs the matching workflow to completion.
    pub async fn run(&self, trigger: Trigger) {
        self.store.reset_status();
        match trigger {
            Trigger::FetchTasks { list_id } => self.fetch_tasks(&list_id).await,
            Trigger::AddTask { list_id, title } => self.add_task(&list_id, &title).await,
            Trigger::RemoveTask { list_id, task_id } => {
                self.remove_task(&list_id, &task_id).await;
            }
            Trigger::UpdateTask {
                list_id,
                task_id,
                patch,
            } => self.update_task(&list_id, &task_id, &patch).await,
        }
    }

    /// Load a list's tasks wholesale.
    pub async fn fetch_tasks(&self, list_id: &str) {
        self.set_status(RequestStatus::Loading);
        match self.api.get_tasks(list_id).await {
            Ok(response) => {
                if let Some(message) = response.error.filter(|e| !e.is_empty()) {
                    handle_server_error(&self.store, &[message]);
                    return;
                }
                self.store.dispatch(Action::SetTasks {
                    list_id: list_id.to_string(),
                    tasks: response.items,
                });
                self.set_status(RequestStatus::Succeeded);
            }
            Err(err) => handle_network_error(&self.store, &err),
        }
    }

    /// Create a task on the server, then prepend the stored copy
    /// locally.
    pub async fn add_task(&self, list_id: &str, title: &str) {
        self.set_status(RequestStatus::Loading);
        match self.api.create_task(list_id, title).await {
            // An accepted create without an item is a malformed
            // response; classify it like any other rejection.
            Ok(response) if response.is_ok() => match response.data.item {
                Some(task) => {
                    self.store.dispatch(Action::AddTask { task });
                    self.set_status(RequestStatus::Succeeded);
                }
                None => handle_server_error(&self.store, &response.messages),
            },
            Ok(response) => handle_server_error(&self.store, &response.messages),
            Err(err) => handle_network_error(&self.store, &err),
        }
    }

    /// Delete on the server, then drop the local copy. This workflow
    /// never signals loading/succeeded; failures still classify.
    pub async fn remove_task(&self, list_id: &str, task_id: &str) {
        match self.api.delete_task(list_id, task_id).await {
            Ok(response) if response.is_ok() => {
                self.store.dispatch(Action::RemoveTask {
                    list_id: list_id.to_string(),
                    task_id: task_id.to_string(),
                });
            }
            Ok(response) => handle_server_error(&self.store, &response.messages),
            Err(err) => handle_network_error(&self.store, &err),
        }
    }

    /// Push a partial update. The API wants the full mutable field
    /// set, so the payload is the current snapshot's task merged with
    /// the patch; the local dispatch carries only the patch.
    pub async fn update_task(&self, list_id: &str, task_id: &str, patch: &TaskPatch) {
        let snapshot = self.store.tasks();
        let Some(task) = snapshot.find(list_id, task_id) else {
            warn!(list_id, task_id, "task not found in the state");
            return;
        };
        let payload = UpdateTaskPayload::from_task(task, patch);

        match self.api.update_task(list_id, task_id, &payload).await {
            Ok(response) if response.is_ok() => {
                self.store.dispatch(Action::UpdateTask {
                    list_id: list_id.to_string(),
                    task_id: task_id.to_string(),
                    patch: patch.clone(),
                });
            }
            Ok(response) => handle_server_error(&self.store, &response.messages),
            Err(err) => handle_network_error(&self.store, &err),
        }
    }

    fn set_status(&self, status: RequestStatus) {
        self.store.dispatch(Action::SetStatus { status });
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::api::{ApiResponse, Empty, GetTasksResponse, TaskItem};
    use crate::error::{ApiError, GENERIC_ERROR};
    use crate::model::{Task, TaskPriority, TaskStatus};
    use crate::state::TasksState;
    use crate::store::Store;

    fn task(id: &str, list_id: &str, title: &str) -> Task {
        Task {
            id: id.into(),
            todo_list_id: list_id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::New,
            priority: TaskPriority::Low,
            start_date: String::new(),
            deadline: String::new(),
            added_date: String::new(),
            order: 0,
        }
    }

    fn accepted<T>(data: T) -> ApiResponse<T> {
        ApiResponse {
            result_code: 0,
            messages: vec![],
            data,
        }
    }

    fn rejected<T>(data: T, messages: &[&str]) -> ApiResponse<T> {
        ApiResponse {
            result_code: 1,
            messages: messages.iter().map(|m| m.to_string()).collect(),
            data,
        }
    }

    /// Records dispatches instead of applying them, and hands out a
    /// preset snapshot.
    #[derive(Default)]
    struct Recording {
        actions: Mutex<Vec<Action>>,
        snapshot: Mutex<TasksState>,
    }

    impl Recording {
        fn with_snapshot(snapshot: TasksState) -> Arc<Self> {
            Arc::new(Recording {
                actions: Mutex::new(vec![]),
                snapshot: Mutex::new(snapshot),
            })
        }

        fn actions(&self) -> Vec<Action> {
            self.actions.lock().unwrap().clone()
        }
    }

    impl StoreHandle for Recording {
        fn dispatch(&self, action: Action) {
            self.actions.lock().unwrap().push(action);
        }

        fn tasks(&self) -> TasksState {
            self.snapshot.lock().unwrap().clone()
        }

        fn reset_status(&self) {}
    }

    /// One-shot scripted API: each endpoint yields its queued result
    /// once, and every call is logged.
    #[derive(Default)]
    struct ScriptedApi {
        calls: Mutex<Vec<String>>,
        on_get: Mutex<Option<Result<GetTasksResponse, ApiError>>>,
        on_create: Mutex<Option<Result<ApiResponse<TaskItem>, ApiError>>>,
        on_delete: Mutex<Option<Result<ApiResponse<Empty>, ApiError>>>,
        on_update: Mutex<Option<Result<ApiResponse<Empty>, ApiError>>>,
        sent_payload: Mutex<Option<UpdateTaskPayload>>,
    }

    impl ScriptedApi {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TodoApi for ScriptedApi {
        async fn get_tasks(&self, list_id: &str) -> Result<GetTasksResponse, ApiError> {
            self.calls.lock().unwrap().push(format!("get_tasks({list_id})"));
            self.on_get.lock().unwrap().take().expect("get_tasks not scripted")
        }

        async fn create_task(
            &self,
            list_id: &str,
            title: &str,
        ) -> Result<ApiResponse<TaskItem>, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("create_task({list_id}, {title})"));
            self.on_create.lock().unwrap().take().expect("create_task not scripted")
        }

        async fn delete_task(
            &self,
            list_id: &str,
            task_id: &str,
        ) -> Result<ApiResponse<Empty>, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("delete_task({list_id}, {task_id})"));
            self.on_delete.lock().unwrap().take().expect("delete_task not scripted")
        }

        async fn update_task(
            &self,
            list_id: &str,
            task_id: &str,
            payload: &UpdateTaskPayload,
        ) -> Result<ApiResponse<Empty>, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("update_task({list_id}, {task_id})"));
            *self.sent_payload.lock().unwrap() = Some(payload.clone());
            self.on_update.lock().unwrap().take().expect("update_task not scripted")
        }
    }

    fn loading() -> Action {
        Action::SetStatus {
            status: RequestStatus::Loading,
        }
    }

    fn succeeded() -> Action {
        Action::SetStatus {
            status: RequestStatus::Succeeded,
        }
    }

    fn failed() -> Action {
        Action::SetStatus {
            status: RequestStatus::Failed,
        }
    }

    fn error(message: &str) -> Action {
        Action::SetError {
            message: Some(message.into()),
        }
    }

    #[tokio::test]
    async fn fetch_success_flow() {
        let item = task("todolistid", "todolistId1", "CSS");
        let api = Arc::new(ScriptedApi::default());
        *api.on_get.lock().unwrap() = Some(Ok(GetTasksResponse {
            items: vec![item.clone()],
            total_count: 1,
            error: None,
        }));
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api.clone(), store.clone())
            .run(Trigger::FetchTasks {
                list_id: "todolistid".into(),
            })
            .await;

        assert_eq!(api.calls(), ["get_tasks(todolistid)"]);
        assert_eq!(
            store.actions(),
            vec![
                loading(),
                Action::SetTasks {
                    list_id: "todolistid".into(),
                    tasks: vec![item],
                },
                succeeded(),
            ]
        );
    }

    #[tokio::test]
    async fn fetch_transport_error_classifies() {
        let api = Arc::new(ScriptedApi::default());
        *api.on_get.lock().unwrap() = Some(Err(ApiError::Other("connection refused".into())));
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api, store.clone())
            .run(Trigger::FetchTasks {
                list_id: "list-1".into(),
            })
            .await;

        assert_eq!(
            store.actions(),
            vec![loading(), error("connection refused"), failed()]
        );
    }

    #[tokio::test]
    async fn fetch_error_field_classifies_as_rejection() {
        let api = Arc::new(ScriptedApi::default());
        *api.on_get.lock().unwrap() = Some(Ok(GetTasksResponse {
            items: vec![],
            total_count: 0,
            error: Some("list gone".into()),
        }));
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api, store.clone())
            .run(Trigger::FetchTasks {
                list_id: "list-1".into(),
            })
            .await;

        assert_eq!(store.actions(), vec![loading(), error("list gone"), failed()]);
    }

    #[tokio::test]
    async fn add_error_flow() {
        let api = Arc::new(ScriptedApi::default());
        *api.on_create.lock().unwrap() = Some(Err(ApiError::Other("some error".into())));
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api.clone(), store.clone())
            .run(Trigger::AddTask {
                list_id: "todolistid".into(),
                title: "task title".into(),
            })
            .await;

        assert_eq!(api.calls(), ["create_task(todolistid, task title)"]);
        assert_eq!(store.actions(), vec![loading(), error("some error"), failed()]);
    }

    #[tokio::test]
    async fn add_success_prepends_created_task() {
        let created = task("t-9", "list-1", "task title");
        let api = Arc::new(ScriptedApi::default());
        *api.on_create.lock().unwrap() = Some(Ok(accepted(TaskItem {
            item: Some(created.clone()),
        })));
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api, store.clone())
            .run(Trigger::AddTask {
                list_id: "list-1".into(),
                title: "task title".into(),
            })
            .await;

        assert_eq!(
            store.actions(),
            vec![loading(), Action::AddTask { task: created }, succeeded()]
        );
    }

    #[tokio::test]
    async fn add_rejection_uses_first_server_message() {
        let api = Arc::new(ScriptedApi::default());
        *api.on_create.lock().unwrap() = Some(Ok(rejected(
            TaskItem::default(),
            &["title is too long", "second"],
        )));
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api, store.clone())
            .run(Trigger::AddTask {
                list_id: "list-1".into(),
                title: "x".into(),
            })
            .await;

        assert_eq!(
            store.actions(),
            vec![loading(), error("title is too long"), failed()]
        );
    }

    #[tokio::test]
    async fn add_rejection_without_messages_falls_back() {
        let api = Arc::new(ScriptedApi::default());
        *api.on_create.lock().unwrap() = Some(Ok(rejected(TaskItem::default(), &[])));
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api, store.clone())
            .run(Trigger::AddTask {
                list_id: "list-1".into(),
                title: "x".into(),
            })
            .await;

        assert_eq!(store.actions(), vec![loading(), error(GENERIC_ERROR), failed()]);
    }

    #[tokio::test]
    async fn add_accepted_without_item_is_treated_as_rejection() {
        let api = Arc::new(ScriptedApi::default());
        *api.on_create.lock().unwrap() = Some(Ok(accepted(TaskItem::default())));
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api, store.clone())
            .run(Trigger::AddTask {
                list_id: "list-1".into(),
                title: "x".into(),
            })
            .await;

        assert_eq!(store.actions(), vec![loading(), error(GENERIC_ERROR), failed()]);
    }

    #[tokio::test]
    async fn remove_success_dispatches_without_status() {
        let api = Arc::new(ScriptedApi::default());
        *api.on_delete.lock().unwrap() = Some(Ok(accepted(Empty {})));
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api.clone(), store.clone())
            .run(Trigger::RemoveTask {
                list_id: "list-1".into(),
                task_id: "t-1".into(),
            })
            .await;

        assert_eq!(api.calls(), ["delete_task(list-1, t-1)"]);
        assert_eq!(
            store.actions(),
            vec![Action::RemoveTask {
                list_id: "list-1".into(),
                task_id: "t-1".into(),
            }]
        );
    }

    #[tokio::test]
    async fn remove_rejection_still_classifies() {
        let api = Arc::new(ScriptedApi::default());
        *api.on_delete.lock().unwrap() = Some(Ok(rejected(Empty {}, &["not yours"])));
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api, store.clone())
            .run(Trigger::RemoveTask {
                list_id: "list-1".into(),
                task_id: "t-1".into(),
            })
            .await;

        assert_eq!(store.actions(), vec![error("not yours"), failed()]);
    }

    #[tokio::test]
    async fn update_missing_task_aborts_silently() {
        let api = Arc::new(ScriptedApi::default());
        let store = Recording::with_snapshot(TasksState::new());

        TaskWorkflows::new(api.clone(), store.clone())
            .run(Trigger::UpdateTask {
                list_id: "list-1".into(),
                task_id: "ghost".into(),
                patch: TaskPatch::default(),
            })
            .await;

        // no remote call, no dispatch
        assert!(api.calls().is_empty());
        assert!(store.actions().is_empty());
    }

    #[tokio::test]
    async fn update_sends_merged_payload_and_dispatches_patch() {
        let current = task("t-1", "list-1", "old title");
        let snapshot = TasksState::new().apply(&Action::SetTasks {
            list_id: "list-1".into(),
            tasks: vec![current],
        });

        let api = Arc::new(ScriptedApi::default());
        *api.on_update.lock().unwrap() = Some(Ok(accepted(Empty {})));
        let store = Recording::with_snapshot(snapshot);

        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        };
        TaskWorkflows::new(api.clone(), store.clone())
            .run(Trigger::UpdateTask {
                list_id: "list-1".into(),
                task_id: "t-1".into(),
                patch: patch.clone(),
            })
            .await;

        // payload: current fields, patch wins on status
        let sent = api.sent_payload.lock().unwrap().clone().unwrap();
        assert_eq!(sent.title, "old title");
        assert_eq!(sent.status, TaskStatus::Completed);
        assert_eq!(sent.priority, TaskPriority::Low);

        // local dispatch carries only the patch
        assert_eq!(
            store.actions(),
            vec![Action::UpdateTask {
                list_id: "list-1".into(),
                task_id: "t-1".into(),
                patch,
            }]
        );
    }

    #[tokio::test]
    async fn update_rejection_classifies() {
        let snapshot = TasksState::new().apply(&Action::SetTasks {
            list_id: "list-1".into(),
            tasks: vec![task("t-1", "list-1", "old")],
        });
        let api = Arc::new(ScriptedApi::default());
        *api.on_update.lock().unwrap() = Some(Ok(rejected(Empty {}, &["stale"])));
        let store = Recording::with_snapshot(snapshot);

        TaskWorkflows::new(api, store.clone())
            .run(Trigger::UpdateTask {
                list_id: "list-1".into(),
                task_id: "t-1".into(),
                patch: TaskPatch::default(),
            })
            .await;

        assert_eq!(store.actions(), vec![error("stale"), failed()]);
    }

    #[tokio::test]
    async fn run_resets_stale_error_before_the_workflow() {
        // drive a real store through failure, then a successful fetch
        let store = Store::shared();
        store.dispatch(Action::SetError {
            message: Some("old failure".into()),
        });
        store.dispatch(Action::SetStatus {
            status: RequestStatus::Failed,
        });

        let api = Arc::new(ScriptedApi::default());
        *api.on_get.lock().unwrap() = Some(Ok(GetTasksResponse {
            items: vec![task("1", "list-1", "HTML")],
            total_count: 1,
            error: None,
        }));

        TaskWorkflows::new(api, store.clone())
            .run(Trigger::FetchTasks {
                list_id: "list-1".into(),
            })
            .await;

        assert_eq!(store.status(), RequestStatus::Succeeded);
        assert_eq!(store.error(), None);
        assert_eq!(store.tasks().tasks("list-1").len(), 1);
    }
}
