//! Provider-agnostic message types for LLM communication.
//!
//! These types decouple the reasoning loop from any specific LLM SDK.
//! [`Conversation`] is the append-only turn log of a single query.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::tool::{ToolCall, ToolDefinition};

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
    /// Tool result.
    Tool,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Message content.
    pub content: String,
    /// Tool calls requested by the assistant (only for `Role::Assistant`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool call ID this message responds to (only for `Role::Tool`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Ordered, append-only record of turns for one query.
///
/// Dereferences to a slice for reading; the only mutation is [`push`](Self::push).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<ChatMessage>,
}

impl Conversation {
    /// Starts a conversation with the given turns.
    #[must_use]
    pub const fn new(turns: Vec<ChatMessage>) -> Self {
        Self { turns }
    }

    /// Appends a turn.
    pub fn push(&mut self, message: ChatMessage) {
        self.turns.push(message);
    }

    /// Content of the most recent text-only assistant turn.
    ///
    /// Turns that request tools are skipped: their text is narration
    /// around the call, not an answer.
    #[must_use]
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|m| {
                m.role == Role::Assistant
                    && m.tool_calls.is_empty()
                    && !m.content.trim().is_empty()
            })
            .map(|m| m.content.as_str())
    }
}

impl Deref for Conversation {
    type Target = [ChatMessage];

    fn deref(&self) -> &Self::Target {
        &self.turns
    }
}

/// A chat completion request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier (e.g., "gpt-4o").
    pub model: String,
    /// Ordered conversation turns.
    pub messages: Conversation,
    /// Sampling temperature (0.0–2.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Tool definitions available to the model.
    pub tools: Vec<ToolDefinition>,
    /// Whether the model may call tools on this turn. When `false` the
    /// definitions are still sent but the model must answer in text.
    pub allow_tools: bool,
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Adds another completion's usage to this total.
    pub const fn accumulate(&mut self, other: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

/// A chat completion response (provider-agnostic).
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Generated text content.
    pub content: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Tool calls requested by the model.
    pub tool_calls: Vec<ToolCall>,
    /// Finish reason from the model (e.g., `"stop"`, `"tool_calls"`).
    pub finish_reason: Option<String>,
}

/// Creates a system message.
#[must_use]
pub fn system_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::System,
        content: content.to_string(),
        tool_calls: Vec::new(),
        tool_call_id: None,
    }
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::User,
        content: content.to_string(),
        tool_calls: Vec::new(),
        tool_call_id: None,
    }
}

/// Creates an assistant message, optionally carrying tool calls.
#[must_use]
pub fn assistant_message(content: &str, tool_calls: Vec<ToolCall>) -> ChatMessage {
    ChatMessage {
        role: Role::Assistant,
        content: content.to_string(),
        tool_calls,
        tool_call_id: None,
    }
}

/// Creates a tool result message.
#[must_use]
pub fn tool_message(tool_call_id: &str, content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::Tool,
        content: content.to_string(),
        tool_calls: Vec::new(),
        tool_call_id: Some(tool_call_id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_message() {
        let msg = tool_message("call_123", "result data");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.content, "result data");
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_123"));
    }

    #[test]
    fn test_assistant_message_with_tool_calls() {
        let calls = vec![ToolCall {
            id: "call_1".to_string(),
            name: "google_search".to_string(),
            arguments: r#"{"query":"rust"}"#.to_string(),
        }];
        let msg = assistant_message("", calls);
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_empty());
        assert_eq!(msg.tool_calls[0].name, "google_search");
    }

    #[test]
    fn test_conversation_is_append_only_log() {
        let mut conv = Conversation::new(vec![system_message("sys"), user_message("q")]);
        assert_eq!(conv.len(), 2);
        assert!(conv.last_assistant_text().is_none());

        conv.push(assistant_message("thinking", Vec::new()));
        conv.push(tool_message("call_1", "obs"));
        conv.push(assistant_message("", Vec::new()));

        assert_eq!(conv.len(), 5);
        assert_eq!(conv[3].role, Role::Tool);
        assert_eq!(conv.last_assistant_text(), Some("thinking"));
    }

    #[test]
    fn test_last_assistant_text_skips_tool_call_turns() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "google_search".to_string(),
            arguments: r#"{"query":"paris"}"#.to_string(),
        };
        let mut conv = Conversation::new(vec![user_message("q")]);
        conv.push(assistant_message("Let me search Google for that.", vec![call]));
        conv.push(tool_message("call_1", "obs"));

        assert!(conv.last_assistant_text().is_none());
    }

    #[test]
    fn test_token_usage_accumulate() {
        let mut total = TokenUsage::default();
        total.accumulate(TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });
        total.accumulate(TokenUsage {
            prompt_tokens: 1,
            completion_tokens: 1,
            total_tokens: 2,
        });
        assert_eq!(total.total_tokens, 17);
        assert_eq!(total.prompt_tokens, 11);
    }

    #[test]
    fn test_chat_message_serialization() {
        let msg = user_message("test");
        let json = serde_json::to_string(&msg).unwrap_or_default();
        assert!(json.contains("\"user\""));
        assert!(!json.contains("tool_calls"));
        assert!(!json.contains("tool_call_id"));
    }
}
