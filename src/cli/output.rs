//! Output formatting for CLI commands.

#![allow(clippy::format_push_string)]

use serde::Serialize;
use serde_json::json;

use crate::agent::ToolDefinition;
use crate::agent::result::AgentResult;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name; anything unrecognized is text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes a value as pretty JSON followed by a newline.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        serde_json::to_string_pretty(value)
            .map(|s| s + "\n")
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}\n"))
    }
}

/// Formats an agent result: answer, sources, then a run summary.
#[must_use]
pub fn format_agent_result(result: &AgentResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format.to_json(result),
        OutputFormat::Text => {
            let mut out = result.answer.clone();
            out.push('\n');
            if !result.sources.is_empty() {
                out.push_str("\nSources:\n");
                out.push_str(&result.sources);
                out.push('\n');
            }
            let tools: Vec<&str> = result.tool_calls.iter().map(|t| t.name.as_str()).collect();
            out.push_str(&format!(
                "\n---\nStop: {} | Tool calls: {}{} | Model calls: {} | Tokens: {} | Time: {:.1}s\n",
                result.stop_reason,
                tools.len(),
                if tools.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", tools.join(", "))
                },
                result.iterations,
                result.usage.total_tokens,
                result.elapsed.as_secs_f64()
            ));
            out
        }
    }
}

/// Formats the tool catalogue.
#[must_use]
pub fn format_tools(definitions: &[ToolDefinition], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let tools: Vec<_> = definitions
                .iter()
                .map(|d| json!({ "name": d.name, "description": d.description }))
                .collect();
            format.to_json(&json!({ "tools": tools, "count": tools.len() }))
        }
        OutputFormat::Text => {
            let width = definitions.iter().map(|d| d.name.len()).max().unwrap_or(0);
            definitions
                .iter()
                .map(|d| format!("{:width$}  {}\n", d.name, d.description))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::TokenUsage;
    use crate::agent::result::{StopReason, ToolTrace};
    use std::time::Duration;

    fn result(sources: &str) -> AgentResult {
        AgentResult {
            answer: "Paris".to_string(),
            sources: sources.to_string(),
            stop_reason: StopReason::FinalAnswer,
            tool_calls: vec![ToolTrace {
                name: "google_search".to_string(),
                input: "capital of France".to_string(),
                is_error: false,
                output_chars: 120,
                elapsed: Duration::from_millis(300),
            }],
            iterations: 2,
            usage: TokenUsage {
                prompt_tokens: 90,
                completion_tokens: 10,
                total_tokens: 100,
            },
            elapsed: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
    }

    #[test]
    fn test_text_result_with_sources() {
        let out = format_agent_result(&result("- https://example.com"), OutputFormat::Text);
        assert!(out.starts_with("Paris\n\nSources:\n- https://example.com\n"));
        assert!(out.contains("Tool calls: 1 (google_search)"));
        assert!(out.contains("Stop: final_answer"));
    }

    #[test]
    fn test_text_result_without_sources() {
        let out = format_agent_result(&result(""), OutputFormat::Text);
        assert!(!out.contains("Sources:"));
    }

    #[test]
    fn test_json_result() {
        let out = format_agent_result(&result(""), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap_or_default();
        assert_eq!(value["answer"], "Paris");
        assert_eq!(value["tool_calls"][0]["name"], "google_search");
    }

    #[test]
    fn test_format_tools_text_aligned() {
        let defs = vec![
            ToolDefinition::single_query("a", "first"),
            ToolDefinition::single_query("longer", "second"),
        ];
        assert_eq!(
            format_tools(&defs, OutputFormat::Text),
            "a       first\nlonger  second\n"
        );
    }
}
