//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// query-agent: answers questions by searching the web with an LLM agent.
///
/// The agent calls Google, Bing, Reddit and X searches, or asks ChatGPT
/// and Perplexity through dataset jobs, until it can give a sourced answer.
#[derive(Parser, Debug)]
#[command(name = "query-agent")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question.
    ///
    /// Runs the tool-calling agent until it produces a final answer or
    /// reaches the tool-call limit. Requires `OPENAI_API_KEY`; the search
    /// and dataset tools need `BRIGHTDATA_API_KEY`.
    #[command(after_help = r#"Examples:
  query-agent ask "What is the capital of France?"
  query-agent ask "best laptops for students" --max-iterations 4
  query-agent --format json ask "latest rust release" | jq .answer
  query-agent ask                     # prompts for the question on stdin
"#)]
    Ask {
        /// The question. Read from stdin when omitted.
        query: Option<String>,

        /// Maximum tool calls before the model must answer.
        #[arg(long, env = "QA_MAX_ITERATIONS")]
        max_iterations: Option<usize>,

        /// Model name.
        #[arg(long, env = "QA_MODEL")]
        model: Option<String>,

        /// Directory containing prompt template files.
        #[arg(long, env = "QA_PROMPT_DIR")]
        prompt_dir: Option<PathBuf>,
    },

    /// List the tools available to the agent.
    Tools,

    /// Write the default prompt templates for editing.
    #[command(after_help = r#"Examples:
  query-agent init-prompts                    # ~/.config/query-agent/prompts
  query-agent init-prompts ./prompts
"#)]
    InitPrompts {
        /// Target directory (defaults to ~/.config/query-agent/prompts).
        dir: Option<PathBuf>,
    },

    /// Start MCP (Model Context Protocol) server.
    #[cfg(feature = "mcp")]
    #[command(subcommand)]
    Mcp(McpCommands),
}

/// MCP server transports.
#[cfg(feature = "mcp")]
#[derive(Subcommand, Debug)]
pub enum McpCommands {
    /// Start MCP server with stdio transport.
    ///
    /// Reads JSON-RPC messages from stdin, writes responses to stdout.
    #[command(after_help = r#"Examples:
  query-agent mcp stdio
"#)]
    Stdio,

    /// Start MCP server with streamable HTTP transport.
    #[command(after_help = r#"Examples:
  query-agent mcp http                            # Listen on 127.0.0.1:3000
  query-agent mcp http --host 0.0.0.0 --port 8080
"#)]
    Http {
        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to.
        #[arg(long, default_value = "3000")]
        port: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_options() {
        let cli = Cli::try_parse_from([
            "query-agent",
            "--format",
            "json",
            "ask",
            "capital of France",
            "--max-iterations",
            "3",
        ])
        .unwrap_or_else(|e| unreachable!("{e}"));

        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Ask {
                query,
                max_iterations,
                ..
            } => {
                assert_eq!(query.as_deref(), Some("capital of France"));
                assert_eq!(max_iterations, Some(3));
            }
            other => unreachable!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_ask_without_query() {
        let cli = Cli::try_parse_from(["query-agent", "-v", "ask"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Ask { query: None, .. }));
    }

    #[test]
    fn test_parse_init_prompts() {
        let cli = Cli::try_parse_from(["query-agent", "init-prompts", "/tmp/p"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        match cli.command {
            Commands::InitPrompts { dir } => assert_eq!(dir, Some(PathBuf::from("/tmp/p"))),
            other => unreachable!("unexpected command: {other:?}"),
        }
    }
}
