//! OpenAI chat completions adapter.
//!
//! Speaks the `/chat/completions` wire format, including function-style
//! tool declarations and tool-call replies. [`build_chat_request`] and
//! [`parse_chat_response`] are pure so the wire mapping is unit-testable;
//! [`OpenAiChat`] wraps them with the HTTP transport.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::chat::{AssistantReply, ChatBackend, ToolDefinition};
use crate::conversation::{Role, ToolCallRequest, Turn, TurnContent};
use crate::error::ErrandError;

/// Configuration for the OpenAI adapter.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Model identifier (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// API base URL, without the `/chat/completions` suffix.
    pub base_url: String,
}

impl OpenAiConfig {
    /// Create a config with the default base URL.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: crate::config::DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at a different OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Convert one turn into a chat-completions message object.
fn message_for(turn: &Turn) -> serde_json::Value {
    match (&turn.content, turn.role) {
        (TurnContent::ToolResult { call_id, content }, _) => serde_json::json!({
            "role": "tool",
            "tool_call_id": call_id,
            "content": content,
        }),
        (TurnContent::Text { text }, Role::Assistant) if !turn.tool_calls.is_empty() => {
            let calls: Vec<serde_json::Value> = turn
                .tool_calls
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.call_id,
                        "type": "function",
                        "function": {
                            "name": c.operation,
                            "arguments": c.arguments,
                        }
                    })
                })
                .collect();
            let content = if text.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::Value::String(text.clone())
            };
            serde_json::json!({
                "role": "assistant",
                "content": content,
                "tool_calls": calls,
            })
        }
        (TurnContent::Text { text }, role) => serde_json::json!({
            "role": role.to_string(),
            "content": text,
        }),
    }
}

/// Build the request body for one completion call.
pub fn build_chat_request(
    model: &str,
    turns: &[Turn],
    tools: &[ToolDefinition],
) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = turns.iter().map(message_for).collect();
    let mut body = serde_json::json!({
        "model": model,
        "messages": messages,
    });
    if !tools.is_empty() {
        let declarations: Vec<serde_json::Value> = tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();
        body["tools"] = serde_json::Value::Array(declarations);
        body["tool_choice"] = serde_json::json!("auto");
    }
    body
}

/// Parse a completion response body into an [`AssistantReply`].
pub fn parse_chat_response(body: &serde_json::Value) -> Result<AssistantReply, ErrandError> {
    let message = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| {
            ErrandError::RequestError("response has no choices[0].message".to_string())
        })?;

    let text = message
        .get("content")
        .and_then(|c| c.as_str())
        .map(String::from);

    let mut tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(|c| c.as_array()) {
        for call in calls {
            let call_id = call
                .get("id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ErrandError::RequestError("tool call has no id".to_string()))?;
            let function = call.get("function").ok_or_else(|| {
                ErrandError::RequestError("tool call has no function object".to_string())
            })?;
            let name = function
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ErrandError::RequestError("tool call has no name".to_string()))?;
            // Arguments arrive as a JSON-encoded string; kept raw here and
            // validated at the dispatcher boundary.
            let arguments = function
                .get("arguments")
                .and_then(|v| v.as_str())
                .unwrap_or("{}");
            tool_calls.push(ToolCallRequest {
                call_id: call_id.to_string(),
                operation: name.to_string(),
                arguments: arguments.to_string(),
            });
        }
    }

    Ok(AssistantReply { text, tool_calls })
}

/// [`ChatBackend`] over the OpenAI chat completions API.
pub struct OpenAiChat {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiChat {
    /// Create an adapter with the given config.
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatBackend for OpenAiChat {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        turns: &[Turn],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, ErrandError> {
        let body = build_chat_request(&self.config.model, turns, tools);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ErrandError::RequestError(format!("completion request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ErrandError::AuthError(format!(
                "model endpoint rejected the API key ({status})"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrandError::RequestError(format!(
                "model endpoint returned {status}: {body}"
            )));
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            ErrandError::RequestError(format!("unreadable completion response: {e}"))
        })?;
        parse_chat_response(&payload)
    }
}
