//! Parsing of model replies into typed values.
//!
//! Replies are expected to be bare JSON but may arrive wrapped in Markdown
//! code fences or surrounded by prose.

use errors::GenerationError;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)```").ok());

static FENCE_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"```[a-zA-Z]*").ok());

fn unfenced(text: &str) -> &str {
    FENCED_BLOCK
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str())
}

/// Slice from the first `{` or `[` to the matching last closer.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let text = if trimmed.starts_with(['{', '[']) {
        trimmed
    } else {
        unfenced(trimmed).trim()
    };
    let Some(start) = text.find(['{', '[']) else {
        return text;
    };
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    match text.rfind(closer) {
        Some(end) if end > start => &text[start..=end],
        _ => &text[start..],
    }
}

pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, GenerationError> {
    serde_json::from_str(extract_json(text))
        .map_err(|e| GenerationError::invalid_response(format!("malformed JSON reply: {e}")))
}

/// Strips Markdown fence markers the model sometimes leaves around SVG.
pub fn clean_svg(content: &str) -> String {
    match FENCE_MARKER.as_ref() {
        Some(re) => re.replace_all(content, "").trim().to_string(),
        None => content.replace("```", "").trim().to_string(),
    }
}

/// Cleans every visual and drops the ones left empty.
pub fn clean_visuals(visuals: Vec<String>) -> Vec<String> {
    visuals
        .into_iter()
        .map(|visual| clean_svg(&visual))
        .filter(|visual| !visual.is_empty())
        .collect()
}

/// Plain-text reply with fences and surrounding whitespace removed.
pub fn clean_text(text: &str) -> String {
    unfenced(text).trim().to_string()
}
