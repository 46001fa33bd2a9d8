//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! The built [`AgentConfig`] is immutable and shared read-only by every query.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default model for the reasoning loop.
const DEFAULT_MODEL: &str = "gpt-4o";
/// Default LLM request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default maximum tokens per model response.
const DEFAULT_MAX_TOKENS: u32 = 2048;
/// Default maximum tool invocations per query.
const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;
/// Default data provider API base.
const DEFAULT_DATA_API_BASE: &str = "https://api.brightdata.com";
/// Default timeout for a single provider request in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default interval between job status polls in seconds.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Default number of job status polls before giving up (~5 minutes).
const DEFAULT_POLL_ATTEMPTS: u32 = 60;
/// Default character budget for rendered search results.
pub const DEFAULT_MAX_RESULT_CHARS: usize = 10_000;

/// Configuration for the agent system.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the LLM provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model driving the reasoning loop.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens per model response.
    pub max_tokens: u32,
    /// LLM request timeout.
    pub timeout: Duration,
    /// Maximum tool invocations before the loop is forced to finish.
    pub max_tool_iterations: usize,
    /// Directory containing prompt template files.
    pub prompt_dir: Option<PathBuf>,
    /// Search and dataset provider settings.
    pub data: DataApiConfig,
}

/// Settings for the search aggregator and dataset job provider.
///
/// A missing `api_key` or dataset id does not prevent startup; the
/// affected tools return empty results instead.
#[derive(Debug, Clone)]
pub struct DataApiConfig {
    /// Bearer credential for the provider.
    pub api_key: Option<String>,
    /// API base URL without trailing slash.
    pub api_base: String,
    /// SERP zone identifier for search requests.
    pub serp_zone: Option<String>,
    /// Dataset id of the `ChatGPT` job provider.
    pub gpt_dataset_id: Option<String>,
    /// Dataset id of the Perplexity job provider.
    pub perplexity_dataset_id: Option<String>,
    /// Timeout for each outbound request.
    pub request_timeout: Duration,
    /// Delay between job status polls.
    pub poll_interval: Duration,
    /// Number of status polls before a job is declared timed out.
    pub poll_attempts: u32,
    /// Character budget for rendered search results.
    pub max_result_chars: usize,
}

impl Default for DataApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_DATA_API_BASE.to_string(),
            serp_zone: None,
            gpt_dataset_id: None,
            perplexity_dataset_id: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            max_result_chars: DEFAULT_MAX_RESULT_CHARS,
        }
    }
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Masks a credential for logging: first 10 characters followed by `...`.
#[must_use]
pub fn mask_secret(secret: Option<&str>) -> String {
    secret.map_or_else(
        || "<unset>".to_string(),
        |s| format!("{}...", s.chars().take(10).collect::<String>()),
    )
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
    max_tool_iterations: Option<usize>,
    prompt_dir: Option<PathBuf>,
    data_api_key: Option<String>,
    data_api_base: Option<String>,
    serp_zone: Option<String>,
    gpt_dataset_id: Option<String>,
    perplexity_dataset_id: Option<String>,
    request_timeout: Option<Duration>,
    poll_interval: Option<Duration>,
    poll_attempts: Option<u32>,
    max_result_chars: Option<usize>,
}

/// Reads a non-empty environment variable.
fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Reads and parses an environment variable, ignoring parse failures.
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_nonempty(key).and_then(|v| v.trim().parse().ok())
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = env_nonempty("QA_PROVIDER");
        }
        if self.api_key.is_none() {
            self.api_key = env_nonempty("OPENAI_API_KEY").or_else(|| env_nonempty("QA_API_KEY"));
        }
        if self.base_url.is_none() {
            self.base_url = env_nonempty("OPENAI_BASE_URL").or_else(|| env_nonempty("QA_BASE_URL"));
        }
        if self.model.is_none() {
            self.model = env_nonempty("QA_MODEL");
        }
        if self.max_tool_iterations.is_none() {
            self.max_tool_iterations = env_parse("QA_MAX_ITERATIONS");
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = env_nonempty("QA_PROMPT_DIR").map(PathBuf::from);
        }
        if self.data_api_key.is_none() {
            self.data_api_key = env_nonempty("BRIGHTDATA_API_KEY");
        }
        if self.data_api_base.is_none() {
            self.data_api_base = env_nonempty("BRIGHTDATA_API_BASE");
        }
        if self.serp_zone.is_none() {
            self.serp_zone = env_nonempty("BRIGHTDATA_SERP_ZONE");
        }
        if self.gpt_dataset_id.is_none() {
            self.gpt_dataset_id = env_nonempty("BRIGHTDATA_GPT_DATASET_ID");
        }
        if self.perplexity_dataset_id.is_none() {
            self.perplexity_dataset_id = env_nonempty("BRIGHTDATA_PERPLEXITY_DATASET_ID")
                .or_else(|| env_nonempty("BRIGHTDATA_PREPLEXITY_DATASET_ID"));
        }
        if self.request_timeout.is_none() {
            self.request_timeout = env_parse("BRIGHTDATA_TIMEOUT_SECS").map(Duration::from_secs);
        }
        if self.poll_interval.is_none() {
            self.poll_interval =
                env_parse("BRIGHTDATA_POLL_INTERVAL_SECS").map(Duration::from_secs);
        }
        if self.poll_attempts.is_none() {
            self.poll_attempts = env_parse("BRIGHTDATA_POLL_ATTEMPTS");
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the LLM API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the reasoning model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Sets the maximum tokens per response.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the LLM request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the maximum tool invocations per query.
    #[must_use]
    pub const fn max_tool_iterations(mut self, n: usize) -> Self {
        self.max_tool_iterations = Some(n);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Sets the data provider credential.
    #[must_use]
    pub fn data_api_key(mut self, key: impl Into<String>) -> Self {
        self.data_api_key = Some(key.into());
        self
    }

    /// Sets the data provider API base URL.
    #[must_use]
    pub fn data_api_base(mut self, url: impl Into<String>) -> Self {
        self.data_api_base = Some(url.into());
        self
    }

    /// Sets the SERP zone.
    #[must_use]
    pub fn serp_zone(mut self, zone: impl Into<String>) -> Self {
        self.serp_zone = Some(zone.into());
        self
    }

    /// Sets the `ChatGPT` dataset id.
    #[must_use]
    pub fn gpt_dataset_id(mut self, id: impl Into<String>) -> Self {
        self.gpt_dataset_id = Some(id.into());
        self
    }

    /// Sets the Perplexity dataset id.
    #[must_use]
    pub fn perplexity_dataset_id(mut self, id: impl Into<String>) -> Self {
        self.perplexity_dataset_id = Some(id.into());
        self
    }

    /// Sets the per-request timeout for provider calls.
    #[must_use]
    pub const fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Sets the job polling interval.
    #[must_use]
    pub const fn poll_interval(mut self, duration: Duration) -> Self {
        self.poll_interval = Some(duration);
        self
    }

    /// Sets the job polling attempt ceiling.
    #[must_use]
    pub const fn poll_attempts(mut self, n: u32) -> Self {
        self.poll_attempts = Some(n);
        self
    }

    /// Sets the rendered search result character budget.
    #[must_use]
    pub const fn max_result_chars(mut self, n: usize) -> Self {
        self.max_result_chars = Some(n);
        self
    }

    /// Resolves only the data-provider settings.
    ///
    /// Needs no language-model key, so it also serves commands that never
    /// call the model.
    #[must_use]
    pub fn build_data(&self) -> DataApiConfig {
        let defaults = DataApiConfig::default();
        DataApiConfig {
            api_key: self.data_api_key.clone(),
            api_base: self
                .data_api_base
                .as_deref()
                .map_or(defaults.api_base, |b| b.trim_end_matches('/').to_string()),
            serp_zone: self.serp_zone.clone(),
            gpt_dataset_id: self.gpt_dataset_id.clone(),
            perplexity_dataset_id: self.perplexity_dataset_id.clone(),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            poll_interval: self.poll_interval.unwrap_or(defaults.poll_interval),
            poll_attempts: self.poll_attempts.unwrap_or(defaults.poll_attempts).max(1),
            max_result_chars: self.max_result_chars.unwrap_or(defaults.max_result_chars),
        }
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no LLM API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let data = self.build_data();
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(0.0),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_tool_iterations: self
                .max_tool_iterations
                .unwrap_or(DEFAULT_MAX_TOOL_ITERATIONS),
            prompt_dir: self.prompt_dir,
            data,
        })
    }
}
