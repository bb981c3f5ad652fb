//! Todoist REST v2 task backend.
//!
//! Implements [`TaskBackend`] over the Todoist REST API. Search is
//! client-side: the API returns all active tasks and [`TodoistClient::find`]
//! filters them with a case-insensitive substring match on the content.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::ErrandError;
use crate::tasks::{Task, TaskBackend, TaskDraft, TaskPatch};

/// Client for the Todoist REST v2 API.
pub struct TodoistClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

/// A task as returned by the Todoist API.
#[derive(Debug, Clone, Deserialize)]
struct TodoistTask {
    id: String,
    content: String,
    #[serde(default)]
    due: Option<TodoistDue>,
    #[serde(default)]
    priority: Option<u8>,
}

/// The due object on a Todoist task.
#[derive(Debug, Clone, Deserialize)]
struct TodoistDue {
    #[serde(default)]
    string: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl From<TodoistTask> for Task {
    fn from(t: TodoistTask) -> Self {
        let due = t.due.and_then(|d| d.string.or(d.date));
        Task {
            id: t.id,
            content: t.content,
            due,
            priority: t.priority,
        }
    }
}

impl TodoistClient {
    /// Create a client against the given API base URL.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, task_id: &str) -> String {
        format!("{}/tasks/{}", self.base_url, task_id)
    }

    /// Map a non-success response to an error, distinguishing auth
    /// failures from other backend faults.
    async fn error_for(&self, response: reqwest::Response) -> ErrandError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            ErrandError::AuthError(format!("todoist rejected the API token ({status})"))
        } else {
            ErrandError::BackendError(format!("todoist returned {status}: {body}"))
        }
    }

    fn transport_error(e: reqwest::Error) -> ErrandError {
        ErrandError::BackendError(format!("todoist request failed: {e}"))
    }
}

#[async_trait]
impl TaskBackend for TodoistClient {
    async fn create(&self, draft: &TaskDraft) -> Result<Task, ErrandError> {
        let mut body = serde_json::json!({ "content": draft.content });
        if let Some(due) = &draft.due_string {
            body["due_string"] = serde_json::json!(due);
        }
        if let Some(priority) = draft.priority {
            body["priority"] = serde_json::json!(priority);
        }

        let response = self
            .client
            .post(self.tasks_url())
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }
        let task: TodoistTask = response.json().await.map_err(|e| {
            ErrandError::BackendError(format!("todoist returned an unreadable task: {e}"))
        })?;
        tracing::debug!(task_id = %task.id, "created task");
        Ok(task.into())
    }

    async fn find(&self, query: &str) -> Result<Vec<Task>, ErrandError> {
        let response = self
            .client
            .get(self.tasks_url())
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }
        let tasks: Vec<TodoistTask> = response.json().await.map_err(|e| {
            ErrandError::BackendError(format!("todoist returned an unreadable task list: {e}"))
        })?;

        let needle = query.to_lowercase();
        let matched: Vec<Task> = tasks
            .into_iter()
            .filter(|t| t.content.to_lowercase().contains(&needle))
            .map(Task::from)
            .collect();
        tracing::debug!(query, matched = matched.len(), "task search");
        Ok(matched)
    }

    async fn update(&self, task_id: &str, patch: &TaskPatch) -> Result<(), ErrandError> {
        let mut body = serde_json::Map::new();
        if let Some(content) = &patch.content {
            body.insert("content".into(), serde_json::json!(content));
        }
        if let Some(due) = &patch.due_string {
            body.insert("due_string".into(), serde_json::json!(due));
        }
        if let Some(priority) = patch.priority {
            body.insert("priority".into(), serde_json::json!(priority));
        }

        let response = self
            .client
            .post(self.task_url(task_id))
            .bearer_auth(&self.api_token)
            .json(&serde_json::Value::Object(body))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }
        tracing::debug!(task_id, "updated task");
        Ok(())
    }

    async fn delete(&self, task_id: &str) -> Result<(), ErrandError> {
        let response = self
            .client
            .delete(self.task_url(task_id))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }
        tracing::debug!(task_id, "deleted task");
        Ok(())
    }
}
