//! Conversation types for the dialogue loop.
//!
//! Provides the [`Turn`], [`Role`], and [`TurnContent`] types used to
//! represent the conversation history sent to the language model, and the
//! append-only [`Conversation`] sequence the dialogue loop owns while
//! processing one utterance.

use serde::{Deserialize, Serialize};

/// The role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System framing for the assistant.
    System,
    /// User utterance.
    User,
    /// Assistant (model) output.
    Assistant,
    /// Result of one dispatched operation invocation.
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// The content of a turn.
///
/// Most turns carry plain text; tool-result turns additionally carry the
/// invocation id they answer, pairing them with the assistant turn that
/// requested the invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnContent {
    /// Plain text content.
    Text {
        /// The text content. Empty for assistant turns that only
        /// request invocations.
        text: String,
    },
    /// Result of one operation invocation.
    ToolResult {
        /// The invocation id this result answers.
        call_id: String,
        /// The human-readable outcome text.
        content: String,
    },
}

/// An operation invocation requested by the model.
///
/// `arguments` is the raw JSON payload exactly as the model emitted it;
/// parsing and validation happen at the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Unique id for this invocation within its assistant turn.
    pub call_id: String,
    /// The operation name (must match the registry).
    pub operation: String,
    /// Raw JSON-encoded arguments string.
    pub arguments: String,
}

/// One immutable entry in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn.
    pub role: Role,
    /// The turn content.
    pub content: TurnContent,
    /// Invocations requested by the assistant (only for Assistant role).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl Turn {
    /// Create a text turn with the given role.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: TurnContent::Text { text: text.into() },
            tool_calls: Vec::new(),
        }
    }

    /// Create a system turn.
    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }

    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    /// Create a plain-text assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    /// Create an assistant turn with invocation requests and optional text.
    pub fn assistant_with_calls(text: Option<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text {
                text: text.unwrap_or_default(),
            },
            tool_calls,
        }
    }

    /// Create a tool-result turn answering the given invocation id.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: TurnContent::ToolResult {
                call_id: call_id.into(),
                content: content.into(),
            },
            tool_calls: Vec::new(),
        }
    }

    /// Returns the text content, if this is a text turn.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            TurnContent::Text { text } => Some(text),
            TurnContent::ToolResult { .. } => None,
        }
    }
}

/// An append-only ordered sequence of turns.
///
/// Ownership passes into [`DialogueLoop::process`](crate::dialogue::DialogueLoop::process)
/// for the duration of one call and returns to the caller afterwards. In
/// session-persistent mode the session driver hands the same conversation
/// back in on the next utterance; in stateless mode it discards it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation seeded with a system turn.
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(prompt)],
        }
    }

    /// Append a turn. Turns are immutable once appended.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Returns the turns in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recently appended turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
