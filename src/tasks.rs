//! Task backend abstraction.
//!
//! Defines the [`TaskBackend`] trait the dispatcher calls and the task
//! record types shared between the dispatcher and concrete clients. The
//! backend handle is constructed explicitly and passed into the dialogue
//! loop, so tests can substitute doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ErrandError;

/// A task as seen by the core. Owned by the backend, referenced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque stable identifier.
    pub id: String,
    /// Task text.
    pub content: String,
    /// Free-form due-date expression, if any.
    pub due: Option<String>,
    /// Priority 1-4, if any.
    pub priority: Option<u8>,
}

/// Fields for creating a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    /// Task text (required).
    pub content: String,
    /// Free-form due-date expression.
    pub due_string: Option<String>,
    /// Priority 1-4.
    pub priority: Option<u8>,
}

/// Partial update for an existing task. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    /// New task text.
    pub content: Option<String>,
    /// New due-date expression.
    pub due_string: Option<String>,
    /// New priority 1-4.
    pub priority: Option<u8>,
}

impl TaskPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.due_string.is_none() && self.priority.is_none()
    }
}

/// The four operations the core needs from a task-tracking service.
///
/// Every method may fail with a backend fault; the dispatcher catches all
/// of them and never lets one propagate to the dialogue loop.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Create a new task, returning the backend's record of it.
    async fn create(&self, draft: &TaskDraft) -> Result<Task, ErrandError>;

    /// Find tasks whose content matches the query (keyword search).
    async fn find(&self, query: &str) -> Result<Vec<Task>, ErrandError>;

    /// Apply a partial update to the task with the given id.
    async fn update(&self, task_id: &str, patch: &TaskPatch) -> Result<(), ErrandError>;

    /// Delete the task with the given id.
    async fn delete(&self, task_id: &str) -> Result<(), ErrandError>;
}
