//! Invocation dispatcher.
//!
//! Translates one model-requested operation invocation into exactly one
//! task backend call and one human-readable outcome string. The raw JSON
//! payload is parsed into a typed [`OperationRequest`] at this boundary;
//! nothing malformed reaches the backend, and no backend fault propagates
//! past [`Dispatcher::dispatch`]; errors become outcome text the model is
//! expected to recover from on the next round.

use std::sync::Arc;

use crate::priority;
use crate::registry::{OP_CREATE_TASK, OP_DELETE_TASK, OP_FIND_TASKS, OP_UPDATE_TASK};
use crate::tasks::{Task, TaskBackend, TaskDraft, TaskPatch};

/// Hint appended when the model forgot the task id.
const FIND_FIRST_HINT: &str = "Use 'find_tasks' to look up the task_id first.";

/// A validated, typed operation invocation.
///
/// One variant per declared operation; anything that does not fit is
/// rejected before it reaches business logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    /// Create a new task.
    Create(TaskDraft),
    /// Keyword search over task content.
    Find {
        /// Search keywords.
        query: String,
    },
    /// Partial update of an existing task.
    Update {
        /// Target task id.
        task_id: String,
        /// Fields to change. Never contains the task id itself.
        patch: TaskPatch,
    },
    /// Delete an existing task.
    Delete {
        /// Target task id.
        task_id: String,
    },
}

/// Parse and validate one raw invocation payload into a typed request.
///
/// The returned `Err` is the outcome text to surface to the model.
pub fn parse_request(operation: &str, args: &serde_json::Value) -> Result<OperationRequest, String> {
    match operation {
        OP_CREATE_TASK => {
            let content = non_empty_str(args, "content")
                .ok_or("Error: task content is missing.")?
                .to_string();
            let due_string = non_empty_str(args, "due_string").map(String::from);
            let priority = priority_arg(args);
            Ok(OperationRequest::Create(TaskDraft {
                content,
                due_string,
                priority,
            }))
        }
        OP_FIND_TASKS => {
            let query = non_empty_str(args, "query")
                .ok_or("Error: search query is missing.")?
                .to_string();
            Ok(OperationRequest::Find { query })
        }
        OP_UPDATE_TASK => {
            let task_id = non_empty_str(args, "task_id")
                .ok_or_else(|| format!("Error: task_id is missing. {FIND_FIRST_HINT}"))?
                .to_string();
            // task_id is the target, never part of the patch payload.
            let patch = TaskPatch {
                content: non_empty_str(args, "content").map(String::from),
                due_string: non_empty_str(args, "due_string").map(String::from),
                priority: priority_arg(args),
            };
            if patch.is_empty() {
                return Err("Error: no update fields provided.".to_string());
            }
            Ok(OperationRequest::Update { task_id, patch })
        }
        OP_DELETE_TASK => {
            let task_id = non_empty_str(args, "task_id")
                .ok_or_else(|| format!("Error: task_id is missing. {FIND_FIRST_HINT}"))?
                .to_string();
            Ok(OperationRequest::Delete { task_id })
        }
        other => Err(format!("Error: unknown operation '{other}'.")),
    }
}

fn non_empty_str<'a>(args: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

/// The schema declares `priority` as a string, but models emit bare JSON
/// numbers too; both forms go through the same normalizer.
fn priority_arg(args: &serde_json::Value) -> Option<u8> {
    match args.get("priority") {
        Some(serde_json::Value::String(s)) => priority::parse(Some(s)),
        Some(serde_json::Value::Number(n)) => priority::parse(Some(&n.to_string())),
        _ => None,
    }
}

/// Dispatches validated invocations to the task backend.
///
/// The backend handle is injected so tests can count and script calls.
pub struct Dispatcher {
    tasks: Arc<dyn TaskBackend>,
}

impl Dispatcher {
    /// Create a dispatcher over the given task backend.
    pub fn new(tasks: Arc<dyn TaskBackend>) -> Self {
        Self { tasks }
    }

    /// Execute one invocation and render its outcome.
    ///
    /// Always returns a human-readable string: a success confirmation
    /// carrying the affected identifiers, or an error description. Exactly
    /// one backend call is made per invocation (zero when validation
    /// fails); no retries.
    pub async fn dispatch(&self, operation: &str, raw_arguments: &str) -> String {
        tracing::debug!(operation, "dispatching invocation");

        let args: serde_json::Value = match serde_json::from_str(raw_arguments) {
            Ok(serde_json::Value::Object(map)) => serde_json::Value::Object(map),
            Ok(_) | Err(_) => {
                tracing::warn!(operation, "invocation arguments are not a JSON object");
                return format!(
                    "Error: operation '{operation}' received invalid JSON arguments: {raw_arguments}"
                );
            }
        };

        let request = match parse_request(operation, &args) {
            Ok(request) => request,
            Err(outcome) => {
                tracing::warn!(operation, %outcome, "invocation rejected at validation");
                return outcome;
            }
        };

        let outcome = self.execute(request).await;
        tracing::info!(operation, %outcome, "invocation dispatched");
        outcome
    }

    async fn execute(&self, request: OperationRequest) -> String {
        match request {
            OperationRequest::Create(draft) => match self.tasks.create(&draft).await {
                Ok(task) => format!(
                    "Task '{}' created successfully (id: {}).",
                    draft.content, task.id
                ),
                Err(e) => format!("Error creating task: {}", e.message()),
            },
            OperationRequest::Find { query } => match self.tasks.find(&query).await {
                Ok(found) if found.is_empty() => {
                    "No tasks found matching that query.".to_string()
                }
                Ok(found) => format!("Found tasks: {}", render_tasks(&found)),
                Err(e) => format!("Error finding tasks: {}", e.message()),
            },
            OperationRequest::Update { task_id, patch } => {
                match self.tasks.update(&task_id, &patch).await {
                    Ok(()) => format!("Task {task_id} updated."),
                    Err(e) => format!("Error updating task {task_id}: {}", e.message()),
                }
            }
            OperationRequest::Delete { task_id } => match self.tasks.delete(&task_id).await {
                Ok(()) => format!("Task {task_id} deleted."),
                Err(e) => format!("Error deleting task {task_id}: {}", e.message()),
            },
        }
    }
}

/// Serialize matched tasks (id, content, due) for the model.
fn render_tasks(tasks: &[Task]) -> String {
    let simplified: Vec<serde_json::Value> = tasks
        .iter()
        .map(|t| {
            serde_json::json!({
                "id": t.id,
                "content": t.content,
                "due": t.due,
            })
        })
        .collect();
    serde_json::Value::Array(simplified).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrandError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Counting backend double: records every call and can be scripted
    /// to fail specific operations.
    #[derive(Default)]
    struct CountingBackend {
        creates: AtomicU32,
        finds: AtomicU32,
        updates: AtomicU32,
        deletes: AtomicU32,
        last_update: Mutex<Option<(String, TaskPatch)>>,
        find_results: Mutex<Vec<Task>>,
        fail_delete: Option<String>,
    }

    #[async_trait]
    impl TaskBackend for CountingBackend {
        async fn create(&self, draft: &TaskDraft) -> Result<Task, ErrandError> {
            self.creates.fetch_add(1, Ordering::Relaxed);
            Ok(Task {
                id: "T100".into(),
                content: draft.content.clone(),
                due: draft.due_string.clone(),
                priority: draft.priority,
            })
        }

        async fn find(&self, _query: &str) -> Result<Vec<Task>, ErrandError> {
            self.finds.fetch_add(1, Ordering::Relaxed);
            Ok(self
                .find_results
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone())
        }

        async fn update(&self, task_id: &str, patch: &TaskPatch) -> Result<(), ErrandError> {
            self.updates.fetch_add(1, Ordering::Relaxed);
            *self.last_update.lock().unwrap_or_else(|e| e.into_inner()) =
                Some((task_id.to_string(), patch.clone()));
            Ok(())
        }

        async fn delete(&self, task_id: &str) -> Result<(), ErrandError> {
            self.deletes.fetch_add(1, Ordering::Relaxed);
            if let Some(ref msg) = self.fail_delete {
                return Err(ErrandError::BackendError(msg.clone()));
            }
            let _ = task_id;
            Ok(())
        }
    }

    fn dispatcher_with(backend: Arc<CountingBackend>) -> Dispatcher {
        Dispatcher::new(backend)
    }

    // ── Validation failures make no backend call ─────────────

    #[tokio::test]
    async fn create_missing_content_makes_no_backend_call() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher.dispatch("create_task", "{}").await;

        assert!(outcome.contains("content is missing"));
        assert_eq!(backend.creates.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn update_missing_task_id_hints_find_tasks() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher
            .dispatch("update_task", r#"{"content":"new text"}"#)
            .await;

        assert!(outcome.contains("task_id is missing"));
        assert!(outcome.contains("find_tasks"));
        assert_eq!(backend.updates.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn delete_missing_task_id_hints_find_tasks() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher.dispatch("delete_task", "{}").await;

        assert!(outcome.contains("task_id is missing"));
        assert!(outcome.contains("find_tasks"));
        assert_eq!(backend.deletes.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn unknown_operation_is_rejected() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(backend);

        let outcome = dispatcher.dispatch("archive_task", "{}").await;

        assert!(outcome.contains("unknown operation 'archive_task'"));
    }

    #[tokio::test]
    async fn malformed_json_is_rejected_with_payload() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher.dispatch("create_task", "{not json").await;

        assert!(outcome.contains("invalid JSON arguments"));
        assert!(outcome.contains("create_task"));
        assert!(outcome.contains("{not json"));
        assert_eq!(backend.creates.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn non_object_json_is_rejected() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher.dispatch("find_tasks", r#"["milk"]"#).await;

        assert!(outcome.contains("invalid JSON arguments"));
        assert_eq!(backend.finds.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn update_with_empty_patch_is_rejected() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher
            .dispatch("update_task", r#"{"task_id":"T1"}"#)
            .await;

        assert!(outcome.contains("no update fields"));
        assert_eq!(backend.updates.load(Ordering::Relaxed), 0);
    }

    // ── Normalization ─────────────────────────────────────────

    #[tokio::test]
    async fn update_normalizes_priority_and_excludes_task_id_from_patch() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher
            .dispatch(
                "update_task",
                r#"{"task_id":"T1","priority":"priority 3"}"#,
            )
            .await;

        assert!(outcome.contains("T1"));
        assert_eq!(backend.updates.load(Ordering::Relaxed), 1);
        let recorded = backend
            .last_update
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let (task_id, patch) = match recorded {
            Some(pair) => pair,
            None => unreachable!("update was called"),
        };
        assert_eq!(task_id, "T1");
        assert_eq!(patch.priority, Some(3));
        assert!(patch.content.is_none());
        // The patch type has no task_id field at all; the serialized
        // payload therefore can never smuggle one.
        let json = serde_json::to_value(&patch).unwrap_or_default();
        assert!(json.get("task_id").is_none());
    }

    #[tokio::test]
    async fn update_accepts_bare_numeric_priority() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher
            .dispatch("update_task", r#"{"task_id":"T1","priority":3}"#)
            .await;

        assert_eq!(outcome, "Task T1 updated.");
        assert_eq!(backend.updates.load(Ordering::Relaxed), 1);
        let recorded = backend
            .last_update
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let (_, patch) = match recorded {
            Some(pair) => pair,
            None => unreachable!("update was called"),
        };
        assert_eq!(patch.priority, Some(3));
    }

    #[tokio::test]
    async fn create_drops_malformed_priority() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher
            .dispatch(
                "create_task",
                r#"{"content":"Buy milk","priority":"p9"}"#,
            )
            .await;

        assert!(outcome.contains("Buy milk"));
        assert!(outcome.contains("T100"));
        assert_eq!(backend.creates.load(Ordering::Relaxed), 1);
    }

    // ── Backend faults are caught here ────────────────────────

    #[tokio::test]
    async fn delete_backend_fault_is_rendered_not_raised() {
        let backend = Arc::new(CountingBackend {
            fail_delete: Some("task not found".into()),
            ..Default::default()
        });
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher
            .dispatch("delete_task", r#"{"task_id":"T9"}"#)
            .await;

        assert!(outcome.contains("T9"));
        assert!(outcome.contains("task not found"));
        assert_eq!(backend.deletes.load(Ordering::Relaxed), 1);
    }

    // ── Success outcomes ──────────────────────────────────────

    #[tokio::test]
    async fn find_with_no_matches() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher
            .dispatch("find_tasks", r#"{"query":"milk"}"#)
            .await;

        assert_eq!(outcome, "No tasks found matching that query.");
        assert_eq!(backend.finds.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn find_serializes_matches() {
        let backend = Arc::new(CountingBackend::default());
        *backend
            .find_results
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = vec![Task {
            id: "T7".into(),
            content: "Buy milk".into(),
            due: Some("tomorrow".into()),
            priority: None,
        }];
        let dispatcher = dispatcher_with(Arc::clone(&backend));

        let outcome = dispatcher
            .dispatch("find_tasks", r#"{"query":"milk"}"#)
            .await;

        assert!(outcome.starts_with("Found tasks:"));
        assert!(outcome.contains("T7"));
        assert!(outcome.contains("Buy milk"));
        assert!(outcome.contains("tomorrow"));
    }

    #[tokio::test]
    async fn delete_confirms_affected_id() {
        let backend = Arc::new(CountingBackend::default());
        let dispatcher = dispatcher_with(backend);

        let outcome = dispatcher
            .dispatch("delete_task", r#"{"task_id":"T3"}"#)
            .await;

        assert_eq!(outcome, "Task T3 deleted.");
    }

    // ── parse_request unit coverage ──────────────────────────

    #[test]
    fn parse_create_full() {
        let args = serde_json::json!({
            "content": "Finish paper",
            "due_string": "friday",
            "priority": "p2"
        });
        let request = parse_request("create_task", &args);
        assert_eq!(
            request,
            Ok(OperationRequest::Create(TaskDraft {
                content: "Finish paper".into(),
                due_string: Some("friday".into()),
                priority: Some(2),
            }))
        );
    }

    #[test]
    fn parse_create_numeric_priority() {
        let args = serde_json::json!({"content": "Buy milk", "priority": 2});
        let request = parse_request("create_task", &args);
        assert_eq!(
            request,
            Ok(OperationRequest::Create(TaskDraft {
                content: "Buy milk".into(),
                due_string: None,
                priority: Some(2),
            }))
        );
        // Out-of-range numbers still drop, same as their string forms.
        let args = serde_json::json!({"content": "Buy milk", "priority": 9});
        match parse_request("create_task", &args) {
            Ok(OperationRequest::Create(draft)) => assert_eq!(draft.priority, None),
            other => unreachable!("expected create request, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_blank_required_fields() {
        let args = serde_json::json!({"content": "   "});
        assert!(parse_request("create_task", &args).is_err());
        let args = serde_json::json!({"query": ""});
        assert!(parse_request("find_tasks", &args).is_err());
    }
}
