//! Asynchronous dataset jobs (ChatGPT and Perplexity answers).
//!
//! A job is triggered on the provider, polled until its snapshot is ready,
//! then fetched. [`AsyncJob`] holds the state machine
//! `submitted -> pending -> {ready | failed | timed_out}`; [`DatasetTool`]
//! drives it over HTTP with an injectable [`Sleeper`] between polls.
//!
//! Worst-case latency is bounded by `poll_attempts` status requests with
//! `poll_interval` between consecutive ones. No path returns an error to
//! the caller: failures degrade to a placeholder answer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::clock::{Sleeper, TokioSleeper};
use super::http::DataClient;
use super::normalize::truncate_chars;
use crate::agent::config::DataApiConfig;
use crate::agent::tool::Tool;
use crate::error::ToolError;

/// Answer text used when no extractor finds one.
pub const NO_ANSWER: &str = "No answer found";

/// Lifecycle state of an [`AsyncJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted by the provider, not yet polled.
    Submitted,
    /// Polled at least once, not finished.
    Pending,
    /// Snapshot is available.
    Ready,
    /// Submission failed or the provider reported failure.
    Failed,
    /// The poll ceiling was reached.
    TimedOut,
}

impl JobStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed | Self::TimedOut)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted provider job and its polling progress.
#[derive(Debug, Clone)]
pub struct AsyncJob {
    snapshot_id: String,
    status: JobStatus,
    polls: u32,
    ceiling: u32,
}

impl AsyncJob {
    /// A freshly submitted job that may be polled up to `ceiling` times.
    #[must_use]
    pub fn submitted(snapshot_id: impl Into<String>, ceiling: u32) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            status: JobStatus::Submitted,
            polls: 0,
            ceiling: ceiling.max(1),
        }
    }

    /// Provider-assigned snapshot id.
    #[must_use]
    pub fn snapshot_id(&self) -> &str {
        &self.snapshot_id
    }

    /// Current state.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    /// Status requests made so far.
    #[must_use]
    pub const fn polls(&self) -> u32 {
        self.polls
    }

    /// Applies one poll outcome and returns the new state.
    ///
    /// `reported` is the provider's status string, or `None` when the poll
    /// itself failed. Failed polls count against the ceiling.
    pub fn record_poll(&mut self, reported: Option<&str>) -> JobStatus {
        if self.status.is_terminal() {
            return self.status;
        }
        self.polls += 1;
        self.status = match reported {
            Some("ready") => JobStatus::Ready,
            Some("failed") => JobStatus::Failed,
            _ if self.polls >= self.ceiling => JobStatus::TimedOut,
            _ => JobStatus::Pending,
        };
        self.status
    }
}

/// Result of one dataset job as seen by the reasoning loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobAnswer {
    /// Answer text, or [`NO_ANSWER`].
    pub answer: String,
    /// Newline-joined `title - url` lines; may be empty.
    pub sources: String,
    /// Final job state.
    pub status: JobStatus,
}

impl JobAnswer {
    /// Placeholder answer for a job that produced no snapshot.
    #[must_use]
    pub fn degraded(status: JobStatus) -> Self {
        Self {
            answer: NO_ANSWER.to_string(),
            sources: String::new(),
            status,
        }
    }

    /// Extracts answer and sources from a snapshot item.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            answer: extract_answer_text(payload),
            sources: extract_sources(payload),
            status: JobStatus::Ready,
        }
    }

    /// Observation text: the answer, then a `Sources:` block if any.
    #[must_use]
    pub fn observation(&self) -> String {
        let mut text = self.answer.clone();
        if self.status != JobStatus::Ready {
            text.push_str(&format!(" (job {})", self.status));
        }
        if !self.sources.is_empty() {
            text.push_str("\n\nSources:\n");
            text.push_str(&self.sources);
        }
        text
    }
}

type Extractor = fn(&Value) -> Option<&str>;

fn markdown_blocks(v: &Value) -> Option<&str> {
    v.get("answer_text_markdown")?.get(0)?.get("text")?.as_str()
}

fn markdown_string(v: &Value) -> Option<&str> {
    v.get("answer_text_markdown")?.as_str()
}

fn answer_field(v: &Value) -> Option<&str> {
    v.get("answer")?.as_str()
}

fn text_field(v: &Value) -> Option<&str> {
    v.get("text")?.as_str()
}

/// Answer extractors in priority order.
const ANSWER_EXTRACTORS: &[Extractor] = &[markdown_blocks, markdown_string, answer_field, text_field];

/// First non-blank answer any extractor finds, else [`NO_ANSWER`].
#[must_use]
pub fn extract_answer_text(payload: &Value) -> String {
    ANSWER_EXTRACTORS
        .iter()
        .filter_map(|extract| extract(payload))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(NO_ANSWER)
        .to_string()
}

/// Renders the `sources` field as `title - url` lines.
///
/// A plain string is passed through; anything else yields empty text.
#[must_use]
pub fn extract_sources(payload: &Value) -> String {
    match payload.get("sources") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|src| {
                let field = |k: &str| src.get(k).and_then(Value::as_str).unwrap_or_default();
                format!("{} - {}", field("title"), field("url"))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Tool that answers a prompt through a provider dataset job.
pub struct DatasetTool {
    name: String,
    description: String,
    dataset_id: Option<String>,
    target_url: String,
    poll_interval: Duration,
    poll_attempts: u32,
    max_chars: usize,
    client: DataClient,
    sleeper: Arc<dyn Sleeper>,
}

impl DatasetTool {
    /// Creates a dataset tool. `target_url` is the site the dataset
    /// collector prompts.
    #[must_use]
    pub fn new(
        name: &str,
        description: &str,
        dataset_id: Option<String>,
        target_url: &str,
        config: &DataApiConfig,
        client: DataClient,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            dataset_id,
            target_url: target_url.to_string(),
            poll_interval: config.poll_interval,
            poll_attempts: config.poll_attempts,
            max_chars: config.max_result_chars,
            client,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replaces the delay used between polls.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Runs one job to completion.
    pub async fn run_job(&self, prompt: &str) -> JobAnswer {
        let mut job = match self.submit(prompt).await {
            Ok(job) => job,
            Err(e) => {
                warn!(tool = %self.name, error = %e, "job submission failed");
                return JobAnswer::degraded(JobStatus::Failed);
            }
        };
        info!(tool = %self.name, snapshot_id = job.snapshot_id(), "job submitted");

        self.poll(&mut job).await;
        if job.status() != JobStatus::Ready {
            warn!(
                tool = %self.name,
                snapshot_id = job.snapshot_id(),
                status = %job.status(),
                polls = job.polls(),
                "job did not complete"
            );
            return JobAnswer::degraded(job.status());
        }

        match self.fetch(job.snapshot_id()).await {
            Ok(payload) => JobAnswer::from_payload(&payload),
            Err(e) => {
                warn!(tool = %self.name, snapshot_id = job.snapshot_id(), error = %e, "snapshot fetch failed");
                JobAnswer::degraded(JobStatus::Failed)
            }
        }
    }

    async fn submit(&self, prompt: &str) -> Result<AsyncJob, ToolError> {
        if !self.client.has_credentials() {
            return Err(ToolError::NotConfigured("BRIGHTDATA_API_KEY"));
        }
        let dataset_id = self
            .dataset_id
            .as_deref()
            .ok_or(ToolError::NotConfigured("dataset id"))?;

        let path = format!(
            "/datasets/v3/trigger?dataset_id={}&format=json&custom_output_fields=answer",
            urlencoding::encode(dataset_id)
        );
        let body = json!({ "url": self.target_url, "prompt": prompt });
        let reply = self.client.post_json(&path, &body).await?;

        let snapshot_id = reply
            .get("snapshot_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(ToolError::MissingSnapshotId)?;
        Ok(AsyncJob::submitted(snapshot_id, self.poll_attempts))
    }

    async fn poll(&self, job: &mut AsyncJob) {
        let path = format!("/datasets/v3/progress/{}", job.snapshot_id());
        loop {
            let reported = match self.client.get_json(&path).await {
                Ok(v) => v.get("status").and_then(Value::as_str).map(str::to_string),
                Err(e) => {
                    debug!(snapshot_id = job.snapshot_id(), error = %e, "poll failed");
                    None
                }
            };
            let status = job.record_poll(reported.as_deref());
            debug!(
                snapshot_id = job.snapshot_id(),
                attempt = job.polls(),
                status = %status,
                "polled job"
            );
            if status.is_terminal() {
                return;
            }
            self.sleeper.sleep(self.poll_interval).await;
        }
    }

    async fn fetch(&self, snapshot_id: &str) -> Result<Value, ToolError> {
        let snapshot = self
            .client
            .get_json(&format!("/datasets/v3/snapshot/{snapshot_id}?format=json"))
            .await?;
        Ok(match snapshot {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            _ => Value::Null,
        })
    }
}

impl fmt::Debug for DatasetTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetTool")
            .field("name", &self.name)
            .field("dataset_id", &self.dataset_id)
            .field("target_url", &self.target_url)
            .field("poll_interval", &self.poll_interval)
            .field("poll_attempts", &self.poll_attempts)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for DatasetTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, input: &str) -> String {
        truncate_chars(&self.run_job(input).await.observation(), self.max_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::clock::RecordingSleeper;
    use test_case::test_case;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SNAPSHOT: &str = "s_abc";

    fn config(base: &str, attempts: u32) -> DataApiConfig {
        DataApiConfig {
            api_key: Some("key".to_string()),
            api_base: base.to_string(),
            request_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_secs(5),
            poll_attempts: attempts,
            ..DataApiConfig::default()
        }
    }

    fn tool(cfg: &DataApiConfig, sleeper: &Arc<RecordingSleeper>) -> DatasetTool {
        DatasetTool::new(
            "chatgpt_prompt",
            "ask chatgpt",
            Some("gd_test".to_string()),
            "https://chatgpt.com",
            cfg,
            DataClient::new(cfg),
        )
        .with_sleeper(sleeper.clone())
    }

    async fn mount_trigger(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/datasets/v3/trigger"))
            .and(query_param("dataset_id", "gd_test"))
            .and(query_param("custom_output_fields", "answer"))
            .and(body_partial_json(json!({"url": "https://chatgpt.com", "prompt": "who?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"snapshot_id": SNAPSHOT})))
            .expect(1)
            .mount(server)
            .await;
    }

    fn progress(status: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"status": status}))
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut job = AsyncJob::submitted("s", 3);
        assert_eq!(job.status(), JobStatus::Submitted);
        assert_eq!(job.record_poll(Some("running")), JobStatus::Pending);
        assert_eq!(job.record_poll(None), JobStatus::Pending);
        assert_eq!(job.record_poll(Some("ready")), JobStatus::Ready);
        assert_eq!(job.record_poll(Some("failed")), JobStatus::Ready);
        assert_eq!(job.polls(), 3);
    }

    #[test]
    fn test_state_machine_times_out_at_ceiling() {
        let mut job = AsyncJob::submitted("s", 2);
        assert_eq!(job.record_poll(None), JobStatus::Pending);
        assert_eq!(job.record_poll(Some("running")), JobStatus::TimedOut);
        assert!(job.status().is_terminal());
    }

    #[test]
    fn test_ready_on_last_attempt_wins_over_timeout() {
        let mut job = AsyncJob::submitted("s", 1);
        assert_eq!(job.record_poll(Some("ready")), JobStatus::Ready);
    }

    #[test_case(json!({"answer_text_markdown": [{"text": "X"}], "answer": "Y"}), "X" ; "markdown blocks first")]
    #[test_case(json!({"answer_text_markdown": "md"}), "md" ; "markdown as string")]
    #[test_case(json!({"answer_text_markdown": [{}], "answer": "Y"}), "Y" ; "falls back to answer")]
    #[test_case(json!({"answer": "  ", "text": "Z"}), "Z" ; "blank answer skipped")]
    #[test_case(json!({}), NO_ANSWER ; "nothing found")]
    #[test_case(Value::Null, NO_ANSWER ; "null payload")]
    fn test_extract_answer_text(payload: Value, expected: &str) {
        assert_eq!(extract_answer_text(&payload), expected);
    }

    #[test]
    fn test_extract_sources_shapes() {
        let list = json!({"sources": [{"title": "T", "url": "U"}, {"url": "V"}]});
        assert_eq!(extract_sources(&list), "T - U\n - V");
        assert_eq!(extract_sources(&json!({"sources": "see web"})), "see web");
        assert_eq!(extract_sources(&json!({"sources": 3})), "");
        assert_eq!(extract_sources(&json!({})), "");
    }

    #[test]
    fn test_observation_format() {
        let ready = JobAnswer {
            answer: "X".into(),
            sources: "T - U".into(),
            status: JobStatus::Ready,
        };
        assert_eq!(ready.observation(), "X\n\nSources:\nT - U");
        assert_eq!(
            JobAnswer::degraded(JobStatus::TimedOut).observation(),
            "No answer found (job timed_out)"
        );
    }

    #[tokio::test]
    async fn test_pending_three_polls_then_ready() {
        let server = MockServer::start().await;
        mount_trigger(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/progress/{SNAPSHOT}")))
            .respond_with(progress("running"))
            .up_to_n_times(3)
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/progress/{SNAPSHOT}")))
            .respond_with(progress("ready"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/snapshot/{SNAPSHOT}")))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "answer_text_markdown": [{"text": "X"}],
                "sources": [{"title": "T", "url": "U"}]
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let result = tool(&config(&server.uri(), 60), &sleeper).run_job("who?").await;

        assert_eq!(result.answer, "X");
        assert_eq!(result.sources, "T - U");
        assert_eq!(result.status, JobStatus::Ready);
        assert_eq!(sleeper.slept(), vec![Duration::from_secs(5); 3]);
    }

    #[tokio::test]
    async fn test_trigger_network_error_returns_quickly() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let t = tool(&config("http://127.0.0.1:1", 60), &sleeper);
        let start = std::time::Instant::now();

        let result = t.run_job("who?").await;

        assert_eq!(result, JobAnswer::degraded(JobStatus::Failed));
        assert!(sleeper.slept().is_empty());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_never_ready_stops_at_ceiling() {
        let server = MockServer::start().await;
        mount_trigger(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/progress/{SNAPSHOT}")))
            .respond_with(progress("running"))
            .expect(4)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/snapshot/{SNAPSHOT}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let cfg = config(&server.uri(), 4);
        let result = tool(&cfg, &sleeper).run_job("who?").await;

        assert_eq!(result.status, JobStatus::TimedOut);
        assert_eq!(result.answer, NO_ANSWER);
        assert_eq!(sleeper.slept().len(), 3);
        assert!(sleeper.total() <= cfg.poll_interval * cfg.poll_attempts);
    }

    #[tokio::test]
    async fn test_poll_errors_count_as_not_ready() {
        let server = MockServer::start().await;
        mount_trigger(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/progress/{SNAPSHOT}")))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/progress/{SNAPSHOT}")))
            .respond_with(progress("ready"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/snapshot/{SNAPSHOT}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"answer": "Y"}])))
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let result = tool(&config(&server.uri(), 60), &sleeper).run_job("who?").await;

        assert_eq!(result.answer, "Y");
        assert_eq!(result.sources, "");
        assert_eq!(sleeper.slept().len(), 2);
    }

    #[tokio::test]
    async fn test_provider_failed_status_is_terminal() {
        let server = MockServer::start().await;
        mount_trigger(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/progress/{SNAPSHOT}")))
            .respond_with(progress("failed"))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let result = tool(&config(&server.uri(), 60), &sleeper).run_job("who?").await;

        assert_eq!(result.status, JobStatus::Failed);
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn test_missing_snapshot_id_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "quota"})))
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let text = tool(&config(&server.uri(), 60), &sleeper).invoke("who?").await;

        assert_eq!(text, "No answer found (job failed)");
    }

    #[tokio::test]
    async fn test_missing_dataset_id_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cfg = config(&server.uri(), 60);
        let t = DatasetTool::new(
            "perplexity_prompt",
            "ask perplexity",
            None,
            "https://www.perplexity.ai",
            &cfg,
            DataClient::new(&cfg),
        );

        assert_eq!(t.run_job("q").await.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_empty_snapshot_yields_placeholder() {
        let server = MockServer::start().await;
        mount_trigger(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/progress/{SNAPSHOT}")))
            .respond_with(progress("ready"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/v3/snapshot/{SNAPSHOT}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let result = tool(&config(&server.uri(), 60), &sleeper).run_job("who?").await;

        assert_eq!(result.answer, NO_ANSWER);
        assert_eq!(result.status, JobStatus::Ready);
    }
}
