//! Tool type definitions for function-calling.
//!
//! Provides provider-agnostic types for tool definitions, calls, and results,
//! plus the [`Tool`] capability every search and dataset tool implements.
//! All tools in this system take a single string parameter named `query`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AgentError;

/// Maximum raw byte length of tool argument JSON from the LLM.
pub const MAX_TOOL_ARGS_LEN: usize = 100_000;

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (unique within a registry).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Builds a definition whose only parameter is a required `query` string.
    #[must_use]
    pub fn single_query(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for or ask."
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// A decoded tool request: which tool, with which input string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Registered tool name.
    pub name: String,
    /// The single string argument.
    pub input: String,
}

impl ToolInvocation {
    /// Creates an invocation.
    #[must_use]
    pub fn new(name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
        }
    }

    /// Decodes the model's raw call into an invocation.
    ///
    /// Arguments are normally `{"query": "..."}`. Models occasionally send a
    /// bare string instead; that string is taken as the query itself.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolExecution`] for oversized arguments or JSON
    /// objects without a string `query` field.
    pub fn from_call(call: &ToolCall) -> Result<Self, AgentError> {
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return Err(AgentError::ToolExecution {
                name: call.name.clone(),
                message: format!(
                    "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ),
            });
        }

        let input = match serde_json::from_str::<serde_json::Value>(&call.arguments) {
            Ok(serde_json::Value::Object(map)) => map
                .get("query")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| AgentError::ToolExecution {
                    name: call.name.clone(),
                    message: "invalid arguments: missing string field `query`".to_string(),
                })?,
            Ok(serde_json::Value::String(s)) => s,
            _ => call.arguments.trim().to_string(),
        };

        Ok(Self::new(call.name.clone(), input))
    }
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Observation text fed back to the model.
    pub content: String,
    /// Whether this result represents an error.
    pub is_error: bool,
}

/// A callable tool exposed to the reasoning loop.
///
/// Invocation is infallible by contract: transport and decoding failures
/// are recovered inside the tool and surface as empty or placeholder text.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name the model uses to call it.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// Function-calling definition for this tool.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::single_query(self.name(), self.description())
    }

    /// Runs the tool on a single string input.
    async fn invoke(&self, input: &str) -> String;
}
