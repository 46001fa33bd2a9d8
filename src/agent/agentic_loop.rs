//! Agentic tool-calling loop.
//!
//! Drives the LLM ↔ tool round-trip for one query: asks the model for the
//! next step, runs the requested tool, appends the observation, and
//! repeats until the model produces a final text answer. Turns are strictly
//! sequential. Termination does not depend on the model's cooperation: once
//! `max_iterations` tools have run, the next model call is made with tools
//! disabled and its reply ends the run either way.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::answer::extract_answer;
use super::message::{ChatRequest, TokenUsage, assistant_message, tool_message};
use super::provider::LlmProvider;
use super::registry::ToolRegistry;
use super::result::{AgentResult, FALLBACK_ANSWER, StopReason, ToolTrace};
use super::tool::{ToolCall, ToolInvocation};

/// Observation sent for tool calls the loop refuses to run.
const LIMIT_OBSERVATION: &str =
    "Error: tool invocation limit reached. Answer with the information gathered so far.";

/// Runs an agentic loop: model → tool call → observation → model → …
///
/// At most `max_iterations` tools are executed and the model is called at
/// most `max_iterations + 1` times. Provider failures end the run early
/// with whatever answer text the conversation already holds.
///
/// # Arguments
///
/// * `provider` - LLM provider to call.
/// * `request` - Initial chat request (its conversation grows in place).
/// * `registry` - Dispatches tool calls by name.
/// * `max_iterations` - Tool invocation cap.
#[allow(clippy::future_not_send)]
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    registry: &ToolRegistry,
    max_iterations: usize,
) -> AgentResult {
    let start = Instant::now();
    let mut usage = TokenUsage::default();
    let mut traces: Vec<ToolTrace> = Vec::new();
    let mut iterations = 0;

    loop {
        let limit_reached = traces.len() >= max_iterations;
        request.allow_tools = !limit_reached;
        iterations += 1;

        let response = match provider.chat(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(iteration = iterations, error = %e, "model call failed, finishing early");
                let fallback = request.messages.last_assistant_text().map(str::to_string);
                return finish(
                    StopReason::ProviderError,
                    fallback.as_deref(),
                    traces,
                    iterations,
                    usage,
                    start,
                );
            }
        };
        usage.accumulate(response.usage);

        if response.tool_calls.is_empty() {
            debug!(iteration = iterations, "agentic loop completed with final text response");
            request
                .messages
                .push(assistant_message(&response.content, Vec::new()));
            let reason = if limit_reached {
                StopReason::IterationLimit
            } else {
                StopReason::FinalAnswer
            };
            return finish(
                reason,
                Some(&response.content),
                traces,
                iterations,
                usage,
                start,
            );
        }

        if limit_reached {
            warn!(
                max_iterations,
                "model kept requesting tools after the limit, finishing"
            );
            // Text sent alongside tool calls is narration, not an answer.
            let fallback = request.messages.last_assistant_text().map(str::to_string);
            return finish(
                StopReason::IterationLimit,
                fallback.as_deref(),
                traces,
                iterations,
                usage,
                start,
            );
        }

        request.messages.push(assistant_message(
            &response.content,
            response.tool_calls.clone(),
        ));

        for call in &response.tool_calls {
            if traces.len() >= max_iterations {
                debug!(tool = %call.name, call_id = %call.id, "skipping call over the limit");
                request
                    .messages
                    .push(tool_message(&call.id, LIMIT_OBSERVATION));
                continue;
            }

            let trace = run_tool(registry, call, request).await;
            traces.push(trace);
        }
    }
}

/// Executes one tool call and appends its observation to the conversation.
async fn run_tool(registry: &ToolRegistry, call: &ToolCall, request: &mut ChatRequest) -> ToolTrace {
    let started = Instant::now();
    info!(tool = %call.name, call_id = %call.id, "executing tool call");

    let result = registry.execute(call).await;
    debug!(
        tool = %call.name,
        call_id = %call.id,
        is_error = result.is_error,
        chars = result.content.len(),
        "tool execution complete"
    );

    let input = ToolInvocation::from_call(call).map_or_else(|_| call.arguments.clone(), |i| i.input);
    let trace = ToolTrace {
        name: call.name.clone(),
        input,
        is_error: result.is_error,
        output_chars: result.content.chars().count(),
        elapsed: started.elapsed(),
    };

    request
        .messages
        .push(tool_message(&result.tool_call_id, &result.content));
    trace
}

fn finish(
    stop_reason: StopReason,
    text: Option<&str>,
    tool_calls: Vec<ToolTrace>,
    iterations: usize,
    usage: TokenUsage,
    start: Instant,
) -> AgentResult {
    let (mut answer, sources) = text.map(extract_answer).unwrap_or_default();
    if answer.is_empty() {
        answer = FALLBACK_ANSWER.to_string();
    }

    AgentResult {
        answer,
        sources,
        stop_reason,
        tool_calls,
        iterations,
        usage,
        elapsed: start.elapsed(),
    }
}
