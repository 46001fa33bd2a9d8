//! Tool-calling reasoning agent.
//!
//! Answers a query by letting a language model call search and dataset
//! tools until it can state a final answer.
//!
//! # Architecture
//!
//! ```text
//! User query → Orchestrator
//!   └── agentic_loop
//!       ├── LlmProvider::chat (think)
//!       ├── ToolRegistry::execute (act, one call at a time)
//!       ├── repeat until final text or the tool cap is reached
//!       └── extract_answer → AgentResult
//! ```

pub mod agentic_loop;
pub mod answer;
pub mod config;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod result;
pub mod tool;

// Re-export key types
pub use answer::extract_answer;
pub use config::{AgentConfig, DataApiConfig};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Conversation, Role, TokenUsage};
pub use orchestrator::{AskOverrides, Orchestrator};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use registry::ToolRegistry;
pub use result::{AgentResult, StopReason, ToolTrace};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolInvocation, ToolResult};
