//! Search and dataset tools backed by the data provider.
//!
//! [`default_registry`] assembles the six tools the agent exposes:
//! four synchronous web searches and two asynchronous dataset jobs.

pub mod clock;
pub mod dataset;
pub mod http;
pub mod normalize;
pub mod serp;

use std::sync::Arc;

pub use clock::{Sleeper, TokioSleeper};
pub use dataset::{AsyncJob, DatasetTool, JobAnswer, JobStatus};
pub use http::DataClient;
pub use normalize::{SearchRecord, normalize, render};
pub use serp::{SearchEngine, SerpSearchTool};

use crate::agent::config::DataApiConfig;
use crate::agent::registry::ToolRegistry;

/// Builds the standard tool set.
#[must_use]
pub fn default_registry(config: &DataApiConfig, client: &DataClient) -> ToolRegistry {
    let search = |name: &str, description: &str, engine: SearchEngine| {
        SerpSearchTool::new(name, description, engine, config, client.clone())
    };

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(search(
        "google_search",
        "Search the web using Google. Returns titles, links and snippets.",
        SearchEngine::Google,
    )));
    registry.register(Arc::new(search(
        "bing_search",
        "Search the web using Bing. Returns titles, links and snippets.",
        SearchEngine::Bing,
    )));
    registry.register(Arc::new(
        search(
            "reddit_search",
            "Search Reddit discussions. Good for opinions and first-hand experience.",
            SearchEngine::Google,
        )
        .with_site("reddit.com"),
    ));
    registry.register(Arc::new(
        search(
            "x_search",
            "Search posts on X (Twitter). Good for recent news and reactions.",
            SearchEngine::Google,
        )
        .with_site("x.com"),
    ));
    registry.register(Arc::new(DatasetTool::new(
        "chatgpt_prompt",
        "Ask ChatGPT to answer a question with sources. Slow; may take minutes.",
        config.gpt_dataset_id.clone(),
        "https://chatgpt.com",
        config,
        client.clone(),
    )));
    registry.register(Arc::new(DatasetTool::new(
        "perplexity_prompt",
        "Ask Perplexity to answer a question with sources. Slow; may take minutes.",
        config.perplexity_dataset_id.clone(),
        "https://www.perplexity.ai",
        config,
        client.clone(),
    )));
    registry
}
