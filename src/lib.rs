//! errand: a conversational assistant for managing tasks by voice or text.
//!
//! One user utterance flows through the [`dialogue::DialogueLoop`], which
//! asks a language model what to do, dispatches any requested task
//! operations against a [`tasks::TaskBackend`], feeds the outcomes back,
//! and repeats until the model answers in plain text. The
//! [`session::SessionDriver`] wraps the loop in an interactive
//! capture / process / respond cycle.
//!
//! Both backends are traits: [`providers::OpenAiChat`] and
//! [`todoist::TodoistClient`] are the production implementations, and
//! tests substitute doubles.

pub mod capture;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod dialogue;
pub mod dispatch;
pub mod error;
pub mod priority;
pub mod providers;
pub mod registry;
pub mod session;
pub mod tasks;
pub mod todoist;

pub use capture::{ConsoleCapture, UtteranceSource};
pub use chat::{AssistantReply, ChatBackend, ToolDefinition};
pub use config::Settings;
pub use conversation::{Conversation, Role, ToolCallRequest, Turn, TurnContent};
pub use dialogue::{DialogueLoop, HistoryMode, LoopConfig};
pub use dispatch::Dispatcher;
pub use error::{ErrandError, Result};
pub use providers::{OpenAiChat, OpenAiConfig};
pub use registry::OperationRegistry;
pub use session::SessionDriver;
pub use tasks::{Task, TaskBackend, TaskDraft, TaskPatch};
pub use todoist::TodoistClient;
