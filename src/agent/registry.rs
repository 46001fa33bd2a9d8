//! Tool registry that dispatches tool calls by exact name.
//!
//! The registry is built once at startup and shared read-only across
//! queries. Dispatch never fails: an unknown name or undecodable arguments
//! become an error observation the model can react to.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::tool::{Tool, ToolCall, ToolDefinition, ToolInvocation, ToolResult};
use crate::error::AgentError;

/// Fixed set of callable tools exposed to the reasoning loop.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool. A tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if let Some(&slot) = self.index.get(&name) {
            warn!(tool = %name, "replacing already registered tool");
            self.tools[slot] = tool;
        } else {
            self.index.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Looks up a tool by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Returns tool names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Returns function-calling definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Invokes the named tool with the given input.
    ///
    /// Returns the tool's text unchanged, or an error observation if the
    /// name is not registered.
    pub async fn dispatch(&self, invocation: &ToolInvocation) -> String {
        match self.try_dispatch(invocation).await {
            Ok(text) => text,
            Err(e) => self.error_observation(&e),
        }
    }

    async fn try_dispatch(&self, invocation: &ToolInvocation) -> Result<String, AgentError> {
        let tool = self
            .get(&invocation.name)
            .ok_or_else(|| AgentError::UnknownTool {
                name: invocation.name.clone(),
            })?;
        debug!(tool = %invocation.name, input = %invocation.input, "dispatching tool");
        Ok(tool.invoke(&invocation.input).await)
    }

    /// Decodes and executes a model tool call.
    ///
    /// The name is resolved before the arguments are decoded, so an unknown
    /// tool is reported as such whatever its arguments look like.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let outcome = if self.get(&call.name).is_none() {
            Err(AgentError::UnknownTool {
                name: call.name.clone(),
            })
        } else {
            match ToolInvocation::from_call(call) {
                Ok(invocation) => self.try_dispatch(&invocation).await,
                Err(e) => Err(e),
            }
        };

        match outcome {
            Ok(content) => ToolResult {
                tool_call_id: call.id.clone(),
                content,
                is_error: false,
            },
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call rejected");
                ToolResult {
                    tool_call_id: call.id.clone(),
                    content: self.error_observation(&e),
                    is_error: true,
                }
            }
        }
    }

    fn error_observation(&self, err: &AgentError) -> String {
        match err {
            AgentError::UnknownTool { .. } => format!(
                "Error: {err}. Available tools: {}",
                self.names().join(", ")
            ),
            _ => format!("Error: {err}"),
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Records every input it receives and echoes it back with a prefix.
    struct EchoTool {
        name: &'static str,
        seen: Mutex<Vec<String>>,
    }

    impl EchoTool {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().map(|v| v.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "echoes its input"
        }

        async fn invoke(&self, input: &str) -> String {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(input.to_string());
            }
            format!("{}:{input}", self.name)
        }
    }

    #[tokio::test]
    async fn test_dispatch_invokes_exactly_the_named_tool() {
        let google = EchoTool::new("google_search");
        let bing = EchoTool::new("bing_search");
        let mut registry = ToolRegistry::new();
        registry.register(google.clone());
        registry.register(bing.clone());

        let out = registry
            .dispatch(&ToolInvocation::new("bing_search", "rust"))
            .await;

        assert_eq!(out, "bing_search:rust");
        assert_eq!(bing.seen(), vec!["rust".to_string()]);
        assert!(google.seen().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool_returns_observation() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::new("google_search"));

        let out = registry
            .dispatch(&ToolInvocation::new("yahoo_search", "rust"))
            .await;

        assert!(out.starts_with("Error: unknown tool: yahoo_search"));
        assert!(out.contains("google_search"));
    }

    #[tokio::test]
    async fn test_execute_decodes_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::new("google_search"));

        let result = registry
            .execute(&ToolCall {
                id: "call_9".to_string(),
                name: "google_search".to_string(),
                arguments: r#"{"query":"capital of France"}"#.to_string(),
            })
            .await;

        assert_eq!(result.tool_call_id, "call_9");
        assert_eq!(result.content, "google_search:capital of France");
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn test_execute_bad_arguments_is_error_result() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::new("google_search"));

        let result = registry
            .execute(&ToolCall {
                id: "call_1".to_string(),
                name: "google_search".to_string(),
                arguments: r#"{"q":1}"#.to_string(),
            })
            .await;

        assert!(result.is_error);
        assert!(result.content.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_execute_unknown_tool_with_bad_arguments_lists_tools() {
        let google = EchoTool::new("google_search");
        let mut registry = ToolRegistry::new();
        registry.register(google.clone());
        registry.register(EchoTool::new("bing_search"));

        let result = registry
            .execute(&ToolCall {
                id: "call_2".to_string(),
                name: "yahoo_search".to_string(),
                arguments: r#"{"q":1}"#.to_string(),
            })
            .await;

        assert!(result.is_error);
        assert_eq!(result.tool_call_id, "call_2");
        assert!(result.content.contains("unknown tool: yahoo_search"));
        assert!(result.content.contains("Available tools: google_search, bing_search"));
        assert!(google.seen().is_empty());
    }

    #[test]
    fn test_register_replaces_duplicate_name() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::new("google_search"));
        registry.register(EchoTool::new("bing_search"));
        registry.register(EchoTool::new("google_search"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["google_search", "bing_search"]);
        assert_eq!(registry.definitions().len(), 2);
    }
}
