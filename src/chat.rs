//! Language model backend abstraction.
//!
//! Defines the [`ChatBackend`] trait that concrete adapters implement and
//! the [`AssistantReply`] envelope the dialogue loop branches on. The core
//! contract is a single request/response: given the conversation so far and
//! the declared operations, the model returns text, invocation requests,
//! or both.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::{ToolCallRequest, Turn};
use crate::error::ErrandError;

/// An operation declaration shown to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The operation name (e.g. `"create_task"`).
    pub name: String,
    /// Human-readable description of the operation's purpose.
    pub description: String,
    /// JSON Schema describing the operation's arguments.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// One model response: optional text plus zero or more invocation requests,
/// in the order the model listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistantReply {
    /// Natural-language answer, if the model produced one.
    pub text: Option<String>,
    /// Requested operation invocations, in model order.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantReply {
    /// A plain-text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A reply consisting only of invocation requests.
    pub fn calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            text: None,
            tool_calls,
        }
    }

    /// Whether the reply carries neither text nor invocation requests.
    pub fn is_degenerate(&self) -> bool {
        self.tool_calls.is_empty() && self.text.as_deref().map_or(true, str::is_empty)
    }
}

/// Trait for language model backends.
///
/// Transport faults surface as [`ErrandError`]; the dialogue loop catches
/// them at its outer boundary and converts them into a fixed apology reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Returns the backend name (e.g. `"openai"`).
    fn name(&self) -> &str;

    /// Send the conversation and operation declarations, returning the
    /// model's reply.
    async fn complete(
        &self,
        turns: &[Turn],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, ErrandError>;
}
