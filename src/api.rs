//! Remote todo API: contract types, the client trait, and the
//! reqwest-backed implementation.
//!
//! Endpoints live under `/todo-lists/{list}/tasks`. Mutating endpoints
//! wrap their payload in [`ApiResponse`]; the task listing has its own
//! shape. All JSON is camelCase on the wire.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{ApiError, GENERIC_ERROR};
use crate::model::{Task, TaskPatch, TaskPriority, TaskStatus};

// ── Response envelopes ─────────────────────────────────────────

/// Envelope every mutating endpoint returns. `result_code == 0` means
/// the server accepted the operation; anything else is a rejection
/// explained by `messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub result_code: i32,
    #[serde(default)]
    pub messages: Vec<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.result_code == 0
    }

    /// First server message, or the generic fallback.
    pub fn error_message(&self) -> String {
        self.messages
            .first()
            .cloned()
            .unwrap_or_else(|| GENERIC_ERROR.to_string())
    }
}

/// `data` of the create endpoint: the stored task on success. On a
/// rejection the server sends an empty object here instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Task>,
}

/// Empty `data` object on endpoints that return nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Empty {}

/// The task listing response. Not enveloped: a non-empty `error`
/// field is this endpoint's rejection signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTasksResponse {
    pub items: Vec<Task>,
    pub total_count: i32,
    #[serde(default)]
    pub error: Option<String>,
}

/// Full mutable field set the update endpoint wants. The update
/// workflow fills it from the current task merged with the caller's
/// patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub start_date: String,
    pub deadline: String,
}

impl UpdateTaskPayload {
    /// Current task fields with the patch folded in, patch wins.
    pub fn from_task(task: &Task, patch: &TaskPatch) -> Self {
        let merged = task.with_patch(patch);
        UpdateTaskPayload {
            title: merged.title,
            description: merged.description,
            status: merged.status,
            priority: merged.priority,
            start_date: merged.start_date,
            deadline: merged.deadline,
        }
    }
}

// ── Client trait ───────────────────────────────────────────────

/// The remote todo backend, as the workflows see it. One method per
/// endpoint; implemented by [`HttpTodoApi`] and by scripted doubles in
/// the workflow tests.
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn get_tasks(&self, list_id: &str) -> Result<GetTasksResponse, ApiError>;

    async fn create_task(
        &self,
        list_id: &str,
        title: &str,
    ) -> Result<ApiResponse<TaskItem>, ApiError>;

    async fn delete_task(
        &self,
        list_id: &str,
        task_id: &str,
    ) -> Result<ApiResponse<Empty>, ApiError>;

    async fn update_task(
        &self,
        list_id: &str,
        task_id: &str,
        payload: &UpdateTaskPayload,
    ) -> Result<ApiResponse<Empty>, ApiError>;
}

#[async_trait]
impl<A: TodoApi + ?Sized> TodoApi for std::sync::Arc<A> {
    async fn get_tasks(&self, list_id: &str) -> Result<GetTasksResponse, ApiError> {
        (**self).get_tasks(list_id).await
    }

    async fn create_task(
        &self,
        list_id: &str,
        title: &str,
    ) -> Result<ApiResponse<TaskItem>, ApiError> {
        (**self).create_task(list_id, title).await
    }

    async fn delete_task(
        &self,
        list_id: &str,
        task_id: &str,
    ) -> Result<ApiResponse<Empty>, ApiError> {
        (**self).delete_task(list_id, task_id).await
    }

    async fn update_task(
        &self,
        list_id: &str,
        task_id: &str,
        payload: &UpdateTaskPayload,
    ) -> Result<ApiResponse<Empty>, ApiError> {
        (**self).update_task(list_id, task_id, payload).await
    }
}

// ── HTTP implementation ────────────────────────────────────────

/// Environment variables [`HttpTodoApi::from_env`] reads.
const ENV_BASE_URL: &str = "TODO_API_BASE_URL";
const ENV_API_KEY: &str = "TODO_API_KEY";

/// Header carrying the API key, when one is configured.
const API_KEY_HEADER: &str = "API-KEY";

/// reqwest-backed client for the todo backend.
pub struct HttpTodoApi {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpTodoApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpTodoApi {
            base_url: base_url.into(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        HttpTodoApi {
            base_url: base_url.into(),
            api_key: Some(api_key.into()),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from `TODO_API_BASE_URL` and (optionally)
    /// `TODO_API_KEY`.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = std::env::var(ENV_BASE_URL).map_err(|_| ApiError::Config(ENV_BASE_URL))?;
        match std::env::var(ENV_API_KEY) {
            Ok(key) => Ok(Self::with_api_key(base_url, key)),
            Err(_) => Ok(Self::new(base_url)),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/todo-lists/{path}", self.base_url.trim_end_matches('/'))
    }

    fn decorate(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header(API_KEY_HEADER, key),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.decorate(req).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn get_tasks(&self, list_id: &str) -> Result<GetTasksResponse, ApiError> {
        debug!(list_id, "fetching tasks");
        self.send(self.client.get(self.url(&format!("{list_id}/tasks"))))
            .await
    }

    async fn create_task(
        &self,
        list_id: &str,
        title: &str,
    ) -> Result<ApiResponse<TaskItem>, ApiError> {
        debug!(list_id, title, "creating task");
        self.send(
            self.client
                .post(self.url(&format!("{list_id}/tasks")))
                .json(&json!({ "title": title })),
        )
        .await
    }

    async fn delete_task(
        &self,
        list_id: &str,
        task_id: &str,
    ) -> Result<ApiResponse<Empty>, ApiError> {
        debug!(list_id, task_id, "deleting task");
        self.send(
            self.client
                .delete(self.url(&format!("{list_id}/tasks/{task_id}"))),
        )
        .await
    }

    async fn update_task(
        &self,
        list_id: &str,
        task_id: &str,
        payload: &UpdateTaskPayload,
    ) -> Result<ApiResponse<Empty>, ApiError> {
        debug!(list_id, task_id, "updating task");
        self.send(
            self.client
                .put(self.url(&format!("{list_id}/tasks/{task_id}")))
                .json(payload),
        )
        .await
    }
}

// ── Tests ──────────────────────────────────────────────────────
