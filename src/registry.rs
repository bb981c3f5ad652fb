//! The fixed set of operations the model may invoke.
//!
//! The [`OperationRegistry`] declares the four task operations with their
//! names, model-facing descriptions, and argument schemas. The dialogue
//! loop passes the same ordered declarations to the language model on every
//! call, and the dispatcher validates incoming invocations against the
//! registered names.

use crate::chat::ToolDefinition;

/// Operation name for creating a task.
pub const OP_CREATE_TASK: &str = "create_task";
/// Operation name for keyword task search.
pub const OP_FIND_TASKS: &str = "find_tasks";
/// Operation name for updating a task.
pub const OP_UPDATE_TASK: &str = "update_task";
/// Operation name for deleting a task.
pub const OP_DELETE_TASK: &str = "delete_task";

/// Declaration of one callable operation.
#[derive(Debug, Clone)]
pub struct OperationDefinition {
    /// Unique operation name.
    pub name: &'static str,
    /// Free-text description shown to the model.
    pub description: &'static str,
    /// JSON Schema for the operation's arguments.
    pub parameters: serde_json::Value,
}

/// The fixed, ordered set of callable operations.
///
/// The order is stable so the model always sees the identical tool surface
/// within one version of the system.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    definitions: Vec<OperationDefinition>,
}

impl OperationRegistry {
    /// The standard four-operation registry.
    pub fn standard() -> Self {
        let definitions = vec![
            OperationDefinition {
                name: OP_CREATE_TASK,
                description: "Create a new task based on the user's request.",
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "content": {
                            "type": "string",
                            "description": "The content of the task (e.g. 'Buy groceries', 'Finish English paper')."
                        },
                        "due_string": {
                            "type": "string",
                            "description": "Due date in natural language (e.g. 'tomorrow at 5pm', 'next Monday'). Optional."
                        },
                        "priority": {
                            "type": "string",
                            "description": "Priority from 1 to 4 (e.g. 'priority 1', 'p2', '3'). Optional."
                        }
                    },
                    "required": ["content"]
                }),
            },
            OperationDefinition {
                name: OP_FIND_TASKS,
                description: "Find tasks by keywords in their content. Use this to get a task_id when the user wants to update or delete a task but doesn't provide its id.",
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Keywords to search for in task content (e.g. 'English paper', 'milk')."
                        }
                    },
                    "required": ["query"]
                }),
            },
            OperationDefinition {
                name: OP_UPDATE_TASK,
                description: "Update an existing task. If you don't have the task_id, call 'find_tasks' first to get it.",
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "task_id": {
                            "type": "string",
                            "description": "The id of the task to update. Get this with 'find_tasks' if not known."
                        },
                        "content": {
                            "type": "string",
                            "description": "New content for the task. Optional."
                        },
                        "due_string": {
                            "type": "string",
                            "description": "New due date for the task. Optional."
                        },
                        "priority": {
                            "type": "string",
                            "description": "New priority (1-4). Optional."
                        }
                    },
                    "required": ["task_id"]
                }),
            },
            OperationDefinition {
                name: OP_DELETE_TASK,
                description: "Delete a task by its id. If you don't have the task_id, call 'find_tasks' first to get it.",
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "task_id": {
                            "type": "string",
                            "description": "The id of the task to delete. Get this with 'find_tasks' if not known."
                        }
                    },
                    "required": ["task_id"]
                }),
            },
        ];

        Self { definitions }
    }

    /// The operation declarations, in stable order.
    pub fn definitions(&self) -> &[OperationDefinition] {
        &self.definitions
    }

    /// Export the declarations in the form the chat backend expects.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.definitions
            .iter()
            .map(|d| ToolDefinition::new(d.name, d.description, d.parameters.clone()))
            .collect()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
