//! Orchestrator for a single question.
//!
//! Owns the read-only pieces shared by every query (provider, tool
//! registry, configuration, prompts) and starts one reasoning loop per
//! call to [`Orchestrator::ask`]. Queries never share mutable state, so one
//! orchestrator can serve concurrent callers.

use std::sync::Arc;

use tracing::info;

use super::agentic_loop::agentic_loop;
use super::config::AgentConfig;
use super::message::{ChatRequest, Conversation, system_message, user_message};
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::providers::create_provider;
use super::registry::ToolRegistry;
use super::result::AgentResult;
use crate::error::AgentError;
use crate::tools::{DataClient, default_registry};

/// Maximum accepted query length in bytes.
const MAX_QUERY_LEN: usize = 10_000;

/// Per-query overrides supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct AskOverrides {
    /// Replaces [`AgentConfig::max_tool_iterations`] for this query.
    pub max_iterations: Option<usize>,
}

/// Runs the tool-calling agent for user queries.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    config: AgentConfig,
    prompts: PromptSet,
}

impl Orchestrator {
    /// Creates a new orchestrator from its parts.
    ///
    /// Loads prompt templates from [`AgentConfig::prompt_dir`], falling
    /// back to compiled-in defaults.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Self {
            provider,
            registry,
            config,
            prompts,
        }
    }

    /// Builds the provider and the standard tool set from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedProvider`] for an unknown provider.
    pub fn from_config(config: AgentConfig) -> Result<Self, AgentError> {
        let provider = create_provider(&config)?;
        let client = DataClient::new(&config.data);
        let registry = default_registry(&config.data, &client);
        Ok(Self::new(
            Arc::from(provider),
            Arc::new(registry),
            config,
        ))
    }

    /// Replaces the prompt set.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Answers a query using the configured tool-calling limits.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidQuery`] for empty or oversized queries.
    /// Tool and model failures never surface here; they degrade the answer.
    pub async fn ask(&self, query: &str) -> Result<AgentResult, AgentError> {
        self.ask_with(query, AskOverrides::default()).await
    }

    /// Answers a query with per-call overrides.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidQuery`] for empty or oversized queries.
    #[allow(clippy::future_not_send)]
    pub async fn ask_with(
        &self,
        query: &str,
        overrides: AskOverrides,
    ) -> Result<AgentResult, AgentError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AgentError::InvalidQuery {
                message: "query cannot be empty".to_string(),
            });
        }
        if query.len() > MAX_QUERY_LEN {
            return Err(AgentError::InvalidQuery {
                message: format!(
                    "query exceeds maximum length ({} bytes, max {MAX_QUERY_LEN})",
                    query.len()
                ),
            });
        }

        let max_iterations = overrides
            .max_iterations
            .unwrap_or(self.config.max_tool_iterations);

        let mut request = ChatRequest {
            model: self.config.model.clone(),
            messages: Conversation::new(vec![
                system_message(&self.prompts.system),
                user_message(query),
            ]),
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            tools: self.registry.definitions(),
            allow_tools: true,
        };

        info!(
            provider = self.provider.name(),
            model = %self.config.model,
            max_iterations,
            "answering query"
        );

        let result = agentic_loop(
            self.provider.as_ref(),
            &mut request,
            &self.registry,
            max_iterations,
        )
        .await;

        info!(
            stop_reason = %result.stop_reason,
            tool_calls = result.tool_calls.len(),
            elapsed_secs = result.elapsed.as_secs_f64(),
            "query finished"
        );

        Ok(result)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("registry", &self.registry)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}
