//! Authenticated JSON client for the data provider.
//!
//! One [`DataClient`] is built at startup and cloned into every tool; the
//! underlying `reqwest::Client` pools connections across clones.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::agent::config::DataApiConfig;
use crate::error::ToolError;

/// HTTP client bound to the data provider's base URL and credential.
#[derive(Clone)]
pub struct DataClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl DataClient {
    /// Builds a client with the configured request timeout.
    #[must_use]
    pub fn new(config: &DataApiConfig) -> Self {
        Self {
            http: build_http(config.request_timeout),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Whether a provider credential is configured.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    /// Absolute URL for a provider path such as `/requests?async=true`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// POSTs a JSON body and decodes the JSON reply.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ToolError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let request = self.authorize(self.http.post(&url)).json(body);
        Self::send(request, url).await
    }

    /// GETs a path and decodes the JSON reply.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn get_json(&self, path: &str) -> Result<Value, ToolError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let request = self.authorize(self.http.get(&url));
        Self::send(request, url).await
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(request: reqwest::RequestBuilder, url: String) -> Result<Value, ToolError> {
        let response = request.send().await.map_err(|e| ToolError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ToolError::Decode {
                url,
                message: e.to_string(),
            })
    }
}

impl std::fmt::Debug for DataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataClient")
            .field("api_base", &self.api_base)
            .field("has_credentials", &self.has_credentials())
            .finish_non_exhaustive()
    }
}

/// Builds the pooled HTTP client, falling back to reqwest's defaults if the
/// TLS backend cannot be initialised.
fn build_http(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("query-agent/", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(
                error = %e,
                timeout_secs = timeout.as_secs(),
                "falling back to default HTTP client without request timeout"
            );
            reqwest::Client::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base: &str, key: Option<&str>) -> DataClient {
        DataClient::new(&DataApiConfig {
            api_key: key.map(str::to_string),
            api_base: base.to_string(),
            ..DataApiConfig::default()
        })
    }

    #[tokio::test]
    async fn test_post_json_sends_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/requests"))
            .and(query_param("async", "true"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let value = client(&server.uri(), Some("secret"))
            .post_json("/requests?async=true", &json!({"zone": "z"}))
            .await
            .unwrap_or_else(|e| unreachable!("{e}"));

        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server.uri(), None).get_json("/x").await;

        assert!(matches!(err, Err(ToolError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server.uri(), None).get_json("/x").await;

        assert!(matches!(err, Err(ToolError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let err = client("http://127.0.0.1:1", None).get_json("/x").await;
        assert!(matches!(err, Err(ToolError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_request_timeout_is_applied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let c = DataClient::new(&DataApiConfig {
            api_base: server.uri(),
            request_timeout: Duration::from_millis(100),
            ..DataApiConfig::default()
        });
        let err = c.get_json("/slow").await;

        assert!(matches!(err, Err(ToolError::Transport { .. })));
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let c = client("https://api.example.com/", None);
        assert_eq!(c.url("/datasets/v3/progress/s1"), "https://api.example.com/datasets/v3/progress/s1");
        assert!(format!("{c:?}").contains("has_credentials: false"));
    }
}
