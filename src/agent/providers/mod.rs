//! Concrete [`LlmProvider`] implementations and the factory that picks one.

mod openai;

pub use openai::OpenAiProvider;

use super::config::AgentConfig;
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Creates the provider named by [`AgentConfig::provider`].
///
/// Only `"openai"` is built in; it covers any `OpenAI`-compatible endpoint
/// through [`AgentConfig::base_url`].
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for any other name.
pub fn create_provider(config: &AgentConfig) -> Result<Box<dyn LlmProvider>, AgentError> {
    match config.provider.to_ascii_lowercase().as_str() {
        "openai" => Ok(Box::new(OpenAiProvider::new(config))),
        other => Err(AgentError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}
