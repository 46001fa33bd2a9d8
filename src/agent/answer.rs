//! Final-answer extraction.
//!
//! The model is asked to reply as `Final Answer: … / Sources: …`. This is
//! the single place that turns the last assistant message into an
//! `(answer, sources)` pair.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a `Final Answer:` label, tolerating markdown emphasis.
static FINAL_ANSWER_LABEL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\**\s*final\s+answer\s*\**\s*:\s*\**").ok());

/// Matches a `Sources:` heading at the start of a line.
static SOURCES_HEADING: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t#>*_]*sources?[ \t*_]*:[ \t*_]*").ok());

/// Splits a final model message into answer text and source text.
///
/// Anything before the last `Final Answer:` label (the model's reasoning)
/// is dropped. Text after a `Sources:` heading becomes the sources; when
/// no heading is present the sources are empty.
#[must_use]
pub fn extract_answer(text: &str) -> (String, String) {
    let body = FINAL_ANSWER_LABEL
        .as_ref()
        .and_then(|re| re.find_iter(text).last())
        .map_or(text, |m| &text[m.end()..]);

    let (answer, sources) = SOURCES_HEADING
        .as_ref()
        .and_then(|re| re.find(body))
        .map_or((body, ""), |m| (&body[..m.start()], &body[m.end()..]));

    (answer.trim().to_string(), sources.trim().to_string())
}
