//! Data types for the outcome of one agent run.

use std::time::Duration;

use serde::Serialize;

use super::message::TokenUsage;

/// Answer returned when the loop ends without a usable model reply.
pub const FALLBACK_ANSWER: &str = "Unable to determine an answer.";

/// Why the reasoning loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model produced a final answer.
    FinalAnswer,
    /// The tool invocation cap was reached.
    IterationLimit,
    /// The language-model call failed.
    ProviderError,
}

impl StopReason {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FinalAnswer => "final_answer",
            Self::IterationLimit => "iteration_limit",
            Self::ProviderError => "provider_error",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one tool invocation during a run.
#[derive(Debug, Clone, Serialize)]
pub struct ToolTrace {
    /// Tool name requested by the model.
    pub name: String,
    /// Input string passed to the tool (raw arguments if undecodable).
    pub input: String,
    /// Whether dispatch produced an error observation.
    pub is_error: bool,
    /// Characters of observation text returned.
    pub output_chars: usize,
    /// Time spent in the tool.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

/// Terminal artifact of one reasoning-loop run. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    /// Answer text.
    pub answer: String,
    /// Source text accompanying the answer (may be empty).
    pub sources: String,
    /// Why the loop stopped.
    pub stop_reason: StopReason,
    /// Tool invocations in execution order.
    pub tool_calls: Vec<ToolTrace>,
    /// Number of model calls made.
    pub iterations: usize,
    /// Token usage summed over all model calls.
    pub usage: TokenUsage,
    /// Total elapsed time.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(d.as_secs_f64())
}
