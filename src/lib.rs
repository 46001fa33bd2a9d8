//! # query-agent
//!
//! A tool-calling question-answering agent. A language model decides which
//! web searches or dataset jobs to run, reads their results, and answers
//! with sources.
//!
//! ## Modules
//!
//! - [`agent`]: reasoning loop, provider seam, tool registry, configuration
//! - [`tools`]: search and dataset tools backed by the data provider
//! - [`cli`]: command-line interface
//! - [`mcp`]: MCP server (feature `mcp`)
//!
//! ## Example
//!
//! ```no_run
//! use query_agent::agent::{AgentConfig, Orchestrator};
//!
//! # async fn run() -> Result<(), query_agent::error::AgentError> {
//! let orchestrator = Orchestrator::from_config(AgentConfig::from_env()?)?;
//! let result = orchestrator.ask("What is the capital of France?").await?;
//! assert!(!result.answer.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod error;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod tools;

pub use agent::{AgentConfig, AgentResult, Orchestrator, StopReason};
pub use error::{AgentError, CommandError, Error, Result, ToolError};
