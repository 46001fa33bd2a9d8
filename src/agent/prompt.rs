//! System prompt for the search agent.
//!
//! The compiled-in prompt can be overridden per file from a prompt
//! directory so operators can tune the agent's behaviour without a rebuild.

use std::path::{Path, PathBuf};

/// System prompt for the reasoning loop.
pub const SYSTEM_PROMPT: &str = r"You are a smart search assistant. Use the available tools to answer the user's question.

## Tools

- `google_search`, `bing_search`: general web search. Results are titles, links and snippets.
- `reddit_search`, `x_search`: the same search restricted to reddit.com or x.com. Use them for opinions, discussions and recent reactions.
- `chatgpt_prompt`, `perplexity_prompt`: ask another assistant that answers with its own sources. These are slow (up to several minutes); prefer the search tools for simple facts.

Call one tool at a time. Read each observation before deciding on the next step. If a tool returns nothing, try a different tool or a reformulated query instead of repeating the same call.

## Rules

- If you use a tool, only use the information from the tool to construct your final answer.
- If you do not know the answer, clearly say you don't know. Do not make up information.
- Questions you can answer reliably without looking anything up may be answered directly.

## Answer format

Reply like a search result page with sources:

Final Answer: a concise, factual answer
Sources:
- title - URL of each reference you used from the tools
";

/// Default prompt directory relative to the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/query-agent/prompts";
/// Filename for the system prompt template.
const SYSTEM_FILENAME: &str = "system.md";

/// The prompts used by the agent.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// System prompt for the reasoning loop.
    pub system: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for `prompt_dir`:
    /// 1. Explicit `prompt_dir` argument (from `--prompt-dir` or config)
    /// 2. `QA_PROMPT_DIR` environment variable
    /// 3. `~/.config/query-agent/prompts/`
    ///
    /// An empty or unreadable file falls back to the default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var("QA_PROMPT_DIR").ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .filter(|content| !content.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            system: load_file(SYSTEM_FILENAME, SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for (filename, content) in [(SYSTEM_FILENAME, SYSTEM_PROMPT)] {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}
