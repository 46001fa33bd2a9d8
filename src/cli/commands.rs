//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Commands return their
//! rendered output; `main` writes it to stdout.

#![allow(clippy::format_push_string)]

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::agent::config::{AgentConfig, mask_secret};
use crate::agent::orchestrator::Orchestrator;
use crate::agent::prompt::PromptSet;
use crate::cli::output::{OutputFormat, format_agent_result, format_tools};
#[cfg(feature = "mcp")]
use crate::cli::parser::McpCommands;
use crate::cli::parser::{Cli, Commands};
use crate::error::{CommandError, Result};
use crate::tools::{DataClient, default_registry};

/// Shown on stdout when asking interactively for a question.
pub const QUERY_PROMPT: &str = "query> ";

/// Printed when no question was entered.
pub const NO_QUERY: &str = "No query provided.";

/// Parameters for the ask command.
#[derive(Debug, Clone, Default)]
pub struct AskParams<'a> {
    /// Question text; read from stdin when `None`.
    pub query: Option<&'a str>,
    /// Tool-call limit override.
    pub max_iterations: Option<usize>,
    /// Model override.
    pub model: Option<&'a str>,
    /// Prompt template directory override.
    pub prompt_dir: Option<&'a Path>,
}

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if configuration is incomplete (for example a missing
/// `OPENAI_API_KEY`), the query is rejected, or output cannot be written.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ask {
            query,
            max_iterations,
            model,
            prompt_dir,
        } => {
            let params = AskParams {
                query: query.as_deref(),
                max_iterations: *max_iterations,
                model: model.as_deref(),
                prompt_dir: prompt_dir.as_deref(),
            };
            cmd_ask(&params, format)
        }
        Commands::Tools => Ok(cmd_tools(format)),
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
        #[cfg(feature = "mcp")]
        Commands::Mcp(cmd) => cmd_mcp(cmd),
    }
}

/// Prompts for a question and reads one line.
///
/// # Errors
///
/// Returns an I/O error if the prompt cannot be written or input read.
pub fn read_query<R: BufRead, W: Write>(input: &mut R, prompt: &mut W) -> io::Result<String> {
    prompt.write_all(QUERY_PROMPT.as_bytes())?;
    prompt.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn cmd_ask(params: &AskParams<'_>, format: OutputFormat) -> Result<String> {
    let config = ask_config(params)?;
    run_ask(
        config,
        params.query,
        &mut io::stdin().lock(),
        &mut io::stdout(),
        format,
    )
}

/// Resolves configuration for `ask`; fails before any prompting when the
/// language-model key is missing.
fn ask_config(params: &AskParams<'_>) -> Result<AgentConfig> {
    let mut builder = AgentConfig::builder();
    if let Some(n) = params.max_iterations {
        builder = builder.max_tool_iterations(n);
    }
    if let Some(model) = params.model {
        builder = builder.model(model);
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    let config = builder.from_env().build()?;

    debug!(
        llm_key = %mask_secret(Some(config.api_key.as_str())),
        data_key = %mask_secret(config.data.api_key.as_deref()),
        model = %config.model,
        "configuration loaded"
    );
    Ok(config)
}

fn run_ask<R: BufRead, W: Write>(
    config: AgentConfig,
    query: Option<&str>,
    input: &mut R,
    prompt: &mut W,
    format: OutputFormat,
) -> Result<String> {
    let query = match query {
        Some(q) => q.trim().to_string(),
        None => read_query(input, prompt)?,
    };
    if query.is_empty() {
        return Ok(format!("{NO_QUERY}\n"));
    }

    let orchestrator = Orchestrator::from_config(config)?;

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;
    let result = rt.block_on(orchestrator.ask(&query))?;

    Ok(format_agent_result(&result, format))
}

fn cmd_tools(format: OutputFormat) -> String {
    let data = AgentConfig::builder().from_env().build_data();
    let registry = default_registry(&data, &DataClient::new(&data));
    format_tools(&registry.definitions(), format)
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                return Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ));
            }
            let mut output = format!(
                "Wrote {} prompt template(s) to: {}\n",
                written.len(),
                target_dir.display()
            );
            for path in &written {
                output.push_str(&format!(
                    "  {}\n",
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown")
                ));
            }
            output.push_str("\nEdit these files to customize the agent's system prompt.\n");
            Ok(output)
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json))
        }
    }
}

/// Starts the MCP server with the specified transport.
///
/// Runs until the client disconnects (stdio) or the server is stopped
/// with Ctrl-C (HTTP).
#[cfg(feature = "mcp")]
fn cmd_mcp(cmd: &McpCommands) -> Result<String> {
    use crate::mcp::{QueryAgentMcpServer, serve_http, serve_stdio};

    let config = AgentConfig::from_env()?;
    let server = QueryAgentMcpServer::new(Orchestrator::from_config(config)?);

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;

    rt.block_on(async {
        match cmd {
            McpCommands::Stdio => serve_stdio(server).await,
            McpCommands::Http { host, port } => serve_http(server, host, *port).await,
        }
    })
    .map_err(|e| CommandError::ExecutionFailed(format!("MCP server error: {e}")))?;

    Ok(String::new())
}
