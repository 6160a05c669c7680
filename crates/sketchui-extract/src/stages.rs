//! Text cleaning stages
//!
//! Each stage is a pure `&str -> String` transform. [`clean`] chains them
//! and finishes with a structural JSON check that logs, but never fails.

use serde_json::Value;
use tracing::{debug, error};

const FENCE: &str = "```";

/// Characters of model output kept in debug logs
const LOG_PREVIEW_CHARS: usize = 2_000;

/// Stage 1: drop surrounding whitespace
#[must_use]
pub fn trim(text: &str) -> String {
    text.trim().to_string()
}

/// Stage 2: remove a markdown code fence
///
/// When the text opens with a fence marker, the first and last lines are
/// dropped and the interior kept verbatim. Single-line text is returned
/// unchanged.
#[must_use]
pub fn strip_fences(text: &str) -> String {
    if !text.starts_with(FENCE) {
        return text.to_string();
    }
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 2 {
        return text.to_string();
    }
    lines[1..lines.len() - 1].join("\n")
}

/// Stage 3: fold the text onto one line
#[must_use]
pub fn join_lines(text: &str) -> String {
    text.replace('\n', " ").replace('\r', "")
}

/// Stage 4: undo double escaping of newlines and quotes
///
/// Only `\\n` and `\\"` are collapsed; every other escape is left alone.
#[must_use]
pub fn repair_escapes(text: &str) -> String {
    text.replace("\\\\n", "\\n").replace("\\\\\"", "\\\"")
}

/// Output of stages 1–5
#[derive(Debug)]
pub struct CleanedText {
    text: String,
    parsed: Result<Value, serde_json::Error>,
}

impl CleanedText {
    /// Cleaned text, whether or not it parsed
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the cleaned text is a single valid JSON value
    #[inline]
    #[must_use]
    pub fn is_valid_json(&self) -> bool {
        self.parsed.is_ok()
    }

    /// Split into the text and its parse result
    #[must_use]
    pub fn into_parts(self) -> (String, Result<Value, serde_json::Error>) {
        (self.text, self.parsed)
    }
}

/// Stage 5: parse check
///
/// A parse failure is logged and carried forward for the decode stage.
#[must_use]
pub fn validate(text: String) -> CleanedText {
    let parsed = serde_json::from_str::<Value>(&text);
    if let Err(err) = &parsed {
        error!(error = %err, "invalid JSON after cleaning model output");
    }
    CleanedText { text, parsed }
}

/// Run stages 1–5
#[must_use]
pub fn clean(raw: &str) -> CleanedText {
    debug!(response = %truncate_for_log(raw, LOG_PREVIEW_CHARS), "raw model output");

    let text = trim(raw);
    let text = strip_fences(&text);
    let text = join_lines(&text);
    let text = repair_escapes(&text);

    debug!(response = %truncate_for_log(&text, LOG_PREVIEW_CHARS), "cleaned model output");
    validate(text)
}

/// Bound a string for log output
#[must_use]
pub fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let char_count = input.chars().count();
    if char_count <= max_chars {
        return input.to_string();
    }
    let mut preview: String = input.chars().take(max_chars).collect();
    preview.push_str(&format!("... [truncated, total_chars={char_count}]"));
    preview
}
