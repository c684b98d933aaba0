//! JSON extraction from raw model output.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::error::{ConfigError, ParseError};

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*\n?(.*?)\n?```").unwrap());

/// Content of the first fenced block, or the whole text when there is none.
pub fn unwrap_markdown(text: &str) -> &str {
    match FENCED_BLOCK.captures(text).and_then(|c| c.get(1)) {
        Some(block) => block.as_str().trim(),
        None => text,
    }
}

/// Compile the configured fallback pattern with `.` matching newlines.
pub fn compile_extraction_regex(pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| ConfigError::Invalid(format!("reasoning.json_extraction_regex: {}", e)))
}

/// Strict parse first, then the first `fallback` match. Reports the strict
/// parser's error when both fail.
pub fn parse_json(text: &str, fallback: &Regex) -> Result<Value, ParseError> {
    let strict_err = match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    fallback
        .find(text)
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .ok_or_else(|| ParseError::Malformed(strict_err.to_string()))
}
