//! CLI layer for query-agent.
//!
//! Provides the command-line interface using clap, with commands for
//! asking questions, listing tools, and scaffolding prompt templates.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
#[cfg(feature = "mcp")]
pub use parser::McpCommands;
pub use parser::{Cli, Commands};
