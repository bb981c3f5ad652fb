//! The tool-calling dialogue loop.
//!
//! Turns one user utterance into zero or more backend operations and a
//! final natural-language answer. Each round sends the conversation plus
//! the declared operations to the chat backend; if the model requests
//! invocations they are dispatched strictly sequentially, their results
//! appended as tool-result turns, and the loop continues until the model
//! produces a plain-text answer or the round cap is reached.
//!
//! This is the single canonical loop: session-persistent and stateless
//! behavior differ only by [`HistoryMode`], not by parallel
//! implementations.

use std::sync::Arc;

use crate::chat::{ChatBackend, ToolDefinition};
use crate::conversation::{Conversation, Turn};
use crate::dispatch::Dispatcher;
use crate::registry::OperationRegistry;
use crate::tasks::TaskBackend;

/// Default cap on model round-trips per utterance.
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Default system framing for the assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful voice assistant for managing tasks. \
     If you need to ask for clarification, be concise.";

/// Reply when the chat backend fails mid-turn.
const TRANSPORT_APOLOGY: &str =
    "Sorry, I ran into a problem while processing that. Please try again.";

/// Reply when the model returns neither text nor invocation requests.
const DEGENERATE_FALLBACK: &str = "I have no further action to take.";

/// Reply when the round cap is exhausted.
const ROUNDS_EXHAUSTED: &str =
    "Sorry, I could not complete that request within the allowed number of steps.";

/// Whether conversation history survives across utterances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// The session driver threads the conversation back in on the next
    /// utterance; fresh conversations start with a system turn.
    Persistent,
    /// Every utterance starts a fresh conversation with no system turn.
    Stateless,
}

/// Configuration for the dialogue loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// History lifecycle across utterances.
    pub mode: HistoryMode,
    /// Maximum model round-trips per utterance.
    pub max_rounds: u32,
    /// System framing prepended to fresh persistent conversations.
    pub system_prompt: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            mode: HistoryMode::Persistent,
            max_rounds: DEFAULT_MAX_ROUNDS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl LoopConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the history mode.
    pub fn with_mode(mut self, mode: HistoryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the round cap.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

/// The dialogue loop engine.
///
/// Owns the chat backend handle, the dispatcher over the task backend,
/// and the operation declarations passed verbatim to the model on every
/// round. Both backends are injected; nothing here is process-global.
pub struct DialogueLoop {
    config: LoopConfig,
    chat: Arc<dyn ChatBackend>,
    dispatcher: Dispatcher,
    tools: Vec<ToolDefinition>,
}

impl DialogueLoop {
    /// Create a dialogue loop over the given backends.
    pub fn new(config: LoopConfig, chat: Arc<dyn ChatBackend>, tasks: Arc<dyn TaskBackend>) -> Self {
        let tools = OperationRegistry::standard().tool_definitions();
        Self {
            config,
            chat,
            dispatcher: Dispatcher::new(tasks),
            tools,
        }
    }

    /// The configured history mode.
    pub fn mode(&self) -> HistoryMode {
        self.config.mode
    }

    /// Process one user utterance.
    ///
    /// Returns the reply text and the conversation including every turn
    /// appended while producing it. No fault escapes this call: chat
    /// backend errors become a fixed apology, and the conversation
    /// accumulated so far is still returned, so one failed turn never
    /// corrupts the session.
    pub async fn process(
        &self,
        user_text: &str,
        prior: Option<Conversation>,
    ) -> (String, Conversation) {
        let mut conversation = match prior {
            Some(conversation) => conversation,
            None => match self.config.mode {
                HistoryMode::Persistent => Conversation::with_system(&self.config.system_prompt),
                HistoryMode::Stateless => Conversation::new(),
            },
        };
        conversation.push(Turn::user(user_text));

        for round in 0..self.config.max_rounds {
            tracing::debug!(round, turns = conversation.len(), "requesting completion");

            let reply = match self.chat.complete(conversation.turns(), &self.tools).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!(backend = self.chat.name(), error = %e, "chat backend fault");
                    return (TRANSPORT_APOLOGY.to_string(), conversation);
                }
            };

            // The raw assistant turn goes in before any results so every
            // tool-result turn is preceded by the turn that requested it.
            conversation.push(Turn::assistant_with_calls(
                reply.text.clone(),
                reply.tool_calls.clone(),
            ));

            if reply.is_degenerate() {
                tracing::warn!("degenerate model response: no text, no invocations");
                return (DEGENERATE_FALLBACK.to_string(), conversation);
            }
            if reply.tool_calls.is_empty() {
                return (reply.text.unwrap_or_default(), conversation);
            }

            tracing::info!(
                count = reply.tool_calls.len(),
                operations = ?reply
                    .tool_calls
                    .iter()
                    .map(|c| c.operation.as_str())
                    .collect::<Vec<_>>(),
                "model requested invocations"
            );

            // Strictly sequential, in model order: a later invocation in
            // the batch must not observe an earlier one's result until the
            // next round.
            for call in &reply.tool_calls {
                let outcome = self
                    .dispatcher
                    .dispatch(&call.operation, &call.arguments)
                    .await;
                conversation.push(Turn::tool_result(&call.call_id, outcome));
            }
        }

        tracing::warn!(
            max_rounds = self.config.max_rounds,
            "round cap exhausted without a text answer"
        );
        (ROUNDS_EXHAUSTED.to_string(), conversation)
    }
}
