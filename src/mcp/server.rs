//! MCP server exposing the question-answering agent.
//!
//! One tool, `ask`, runs the reasoning loop and returns the
//! [`AgentResult`](crate::agent::AgentResult) as JSON.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use crate::agent::orchestrator::{AskOverrides, Orchestrator};
use crate::error::AgentError;

use super::params::AskParams;

/// Runs one query and renders the result as pretty JSON.
async fn run_ask(orchestrator: &Orchestrator, params: AskParams) -> Result<String, McpError> {
    let overrides = AskOverrides {
        max_iterations: params.max_iterations,
    };
    let result = orchestrator
        .ask_with(&params.query, overrides)
        .await
        .map_err(|e| match e {
            AgentError::InvalidQuery { .. } => McpError::invalid_params(e.to_string(), None),
            other => McpError::internal_error(format!("Query failed: {other}"), None),
        })?;

    serde_json::to_string_pretty(&result)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {e}"), None))
}

/// query-agent MCP server.
#[derive(Clone)]
pub struct QueryAgentMcpServer {
    tool_router: ToolRouter<Self>,
    orchestrator: Arc<Orchestrator>,
}

#[tool_router]
impl QueryAgentMcpServer {
    /// Answer a question with the web-search agent.
    #[tool(
        name = "ask",
        description = "Answer a question by searching the web (Google, Bing, Reddit, X) and asking ChatGPT or Perplexity as needed. Returns JSON with the answer, sources, stop reason, and the tool calls made."
    )]
    async fn ask(
        &self,
        Parameters(params): Parameters<AskParams>,
    ) -> Result<CallToolResult, McpError> {
        let json = run_ask(&self.orchestrator, params).await?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for QueryAgentMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "query-agent".to_string(),
                title: Some("query-agent MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Web-search question answering. Call `ask` with a question; the server \
                 searches, reads, and returns a sourced answer as JSON."
                    .to_string(),
            ),
        }
    }
}

impl QueryAgentMcpServer {
    /// Creates a server around an orchestrator.
    #[must_use]
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            tool_router: Self::tool_router(),
            orchestrator: Arc::new(orchestrator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::config::AgentConfig;
    use crate::agent::message::{ChatRequest, ChatResponse};
    use crate::agent::prompt::PromptSet;
    use crate::agent::provider::LlmProvider;
    use crate::agent::registry::ToolRegistry;
    use async_trait::async_trait;

    struct FixedProvider;

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            Ok(ChatResponse {
                content: "Final Answer: Paris\nSources: https://en.wikipedia.org/wiki/Paris"
                    .to_string(),
                ..ChatResponse::default()
            })
        }
    }

    fn orchestrator() -> Orchestrator {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        Orchestrator::new(Arc::new(FixedProvider), Arc::new(ToolRegistry::new()), config)
            .with_prompts(PromptSet::defaults())
    }

    #[tokio::test]
    async fn test_run_ask_returns_result_json() {
        let params = AskParams {
            query: "capital of France".to_string(),
            max_iterations: Some(2),
        };

        let json = run_ask(&orchestrator(), params)
            .await
            .unwrap_or_else(|e| unreachable!("{e:?}"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(value["answer"], "Paris");
        assert_eq!(value["sources"], "https://en.wikipedia.org/wiki/Paris");
        assert_eq!(value["stop_reason"], "final_answer");
    }

    #[tokio::test]
    async fn test_run_ask_rejects_empty_query() {
        let params = AskParams {
            query: String::new(),
            max_iterations: None,
        };
        assert!(run_ask(&orchestrator(), params).await.is_err());
    }

    #[test]
    fn test_server_info() {
        let server = QueryAgentMcpServer::new(orchestrator());
        let info = server.get_info();
        assert_eq!(info.server_info.name, "query-agent");
        assert!(info.capabilities.tools.is_some());
    }
}
