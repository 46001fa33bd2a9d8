//! Error types for query-agent.
//!
//! Each layer owns its error enum. Tool-level errors never cross the tool
//! boundary: they are logged and degraded into an empty or placeholder
//! observation before the reasoning loop sees them.

use thiserror::Error;

/// Convenience result alias for CLI-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by CLI commands.
#[derive(Debug, Error)]
pub enum Error {
    /// Agent configuration or reasoning-loop failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Command execution failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O failure (reading stdin, writing prompt templates).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the agent layer.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The language-model API key is not configured.
    #[error("OPENAI_API_KEY not set in environment (.env)")]
    ApiKeyMissing,

    /// The configured provider name has no implementation.
    #[error("unsupported LLM provider: {name}")]
    UnsupportedProvider {
        /// Provider name from configuration.
        name: String,
    },

    /// The language-model API call failed.
    #[error("LLM API request failed: {message}")]
    ApiRequest {
        /// Error detail from the SDK or transport.
        message: String,
        /// HTTP status code, when known.
        status: Option<u16>,
    },

    /// A tool invocation could not be carried out.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Tool name as requested by the model.
        name: String,
        /// What went wrong.
        message: String,
    },

    /// The model asked for a tool that is not registered.
    #[error("unknown tool: {name}")]
    UnknownTool {
        /// Requested tool name.
        name: String,
    },

    /// The user query was rejected before the loop started.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Reason the query was rejected.
        message: String,
    },
}

/// Errors raised inside tools while talking to the data provider.
///
/// These are always recovered at the tool boundary; they exist so the
/// recovery sites can log a precise cause.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Connection, DNS, or timeout failure.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Request URL.
        url: String,
        /// Underlying transport error.
        message: String,
    },

    /// The provider answered with a non-2xx status.
    #[error("request to {url} returned HTTP {status}")]
    Status {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body was not valid JSON.
    #[error("could not decode response from {url}: {message}")]
    Decode {
        /// Request URL.
        url: String,
        /// Decoder error.
        message: String,
    },

    /// A required credential or identifier is missing.
    #[error("missing configuration: {0}")]
    NotConfigured(&'static str),

    /// The trigger response carried no snapshot id.
    #[error("no snapshot_id in trigger response")]
    MissingSnapshotId,
}

/// Errors raised by CLI command handlers.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not be carried out.
    #[error("{0}")]
    ExecutionFailed(String),
}
