//! Synchronous web search through the data provider's SERP endpoint.
//!
//! A search is one POST to `/requests?async=true` whose body names the
//! SERP zone and the search-engine URL to fetch. The JSON reply goes
//! through [`normalize`](super::normalize::normalize). Every failure
//! degrades to an empty result; nothing is retried.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use super::http::DataClient;
use super::normalize::{SearchRecord, normalize, render};
use crate::agent::config::DataApiConfig;
use crate::agent::tool::Tool;

/// Search engine whose result page the provider fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    /// google.com
    Google,
    /// bing.com
    Bing,
}

impl SearchEngine {
    /// Result-page URL for a query, asking the provider for parsed JSON.
    #[must_use]
    pub fn search_url(self, query: &str) -> String {
        let host = match self {
            Self::Google => "https://google.com/search",
            Self::Bing => "https://bing.com/search",
        };
        format!("{host}?q={}&brd_json=1", urlencoding::encode(query))
    }
}

/// Web search tool, optionally scoped to one site.
#[derive(Debug, Clone)]
pub struct SerpSearchTool {
    name: String,
    description: String,
    engine: SearchEngine,
    site: Option<String>,
    zone: Option<String>,
    max_chars: usize,
    client: DataClient,
}

impl SerpSearchTool {
    /// Creates a search tool over `engine`.
    #[must_use]
    pub fn new(
        name: &str,
        description: &str,
        engine: SearchEngine,
        config: &DataApiConfig,
        client: DataClient,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            engine,
            site: None,
            zone: config.serp_zone.clone(),
            max_chars: config.max_result_chars,
            client,
        }
    }

    /// Restricts results to `domain` with a `site:` prefix.
    #[must_use]
    pub fn with_site(mut self, domain: &str) -> Self {
        self.site = Some(domain.to_string());
        self
    }

    /// Query string sent to the search engine.
    #[must_use]
    pub fn provider_query(&self, query: &str) -> String {
        match &self.site {
            Some(site) => format!("site:{site} {query}"),
            None => query.to_string(),
        }
    }

    /// Runs one search and returns the normalized records.
    ///
    /// Missing credentials, transport errors, non-2xx replies, and
    /// undecodable bodies all yield an empty list.
    pub async fn search(&self, query: &str) -> Vec<SearchRecord> {
        if !self.client.has_credentials() {
            warn!(tool = %self.name, "search skipped: BRIGHTDATA_API_KEY not set");
            return Vec::new();
        }

        let q = self.provider_query(query);
        debug!(tool = %self.name, query = %q, "searching");

        let body = json!({
            "zone": self.zone,
            "url": self.engine.search_url(&q),
            "format": "raw",
        });

        match self.client.post_json("/requests?async=true", &body).await {
            Ok(raw) => {
                let records = normalize(&raw);
                debug!(tool = %self.name, results = records.len(), "search finished");
                records
            }
            Err(e) => {
                warn!(tool = %self.name, error = %e, "search request failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Tool for SerpSearchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, input: &str) -> String {
        render(&self.search(input).await, self.max_chars)
    }
}
