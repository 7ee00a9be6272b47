//! Structured extractor - pull the first JSON object out of free-form model text
//!
//! Models wrap JSON in commentary or code fences. Two strategies, first match wins:
//! 1. a fenced block (optionally tagged `json`) holding one object
//! 2. the span from the first `{` to the last `}` anywhere in the text

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::draft::Candidate;

static FENCED_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced object regex must compile")
});

/// Extraction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("No JSON object found in model output")]
    NoJsonFound,
}

/// Extract the first JSON object from model output
pub fn extract_json_object(text: &str) -> Result<Candidate, ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::NoJsonFound);
    }

    if let Some(caps) = FENCED_OBJECT.captures(text) {
        if let Some(obj) = caps.get(1).and_then(|m| parse_object(m.as_str().trim())) {
            return Ok(obj);
        }
        debug!("Fenced block did not parse, falling back to brace span");
    }

    let start = text.find('{').ok_or(ExtractError::NoJsonFound)?;
    let end = text.rfind('}').ok_or(ExtractError::NoJsonFound)?;
    if end < start {
        return Err(ExtractError::NoJsonFound);
    }

    // Trim to the last closing brace to drop trailing prose
    let span = text[start..=end].trim();
    let span = match span.rfind('}') {
        Some(last) => &span[..=last],
        None => span,
    };

    parse_object(span).ok_or(ExtractError::NoJsonFound)
}

fn parse_object(s: &str) -> Option<Candidate> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
