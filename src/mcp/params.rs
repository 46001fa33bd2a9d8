//! MCP tool parameter types.
//!
//! Input schemas are generated with `schemars`, as the MCP protocol
//! requires a JSON Schema per tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `ask` MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AskParams {
    /// The question to answer.
    pub query: String,

    /// Maximum tool calls before the model must answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}
