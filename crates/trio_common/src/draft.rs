//! Draft - the canonical tags + summary shape, and the enforcer that builds it
//!
//! `normalize` is total: any candidate, however malformed, yields a Draft with
//! exactly `TAG_COUNT` non-empty tags and a summary of at most
//! `MAX_SUMMARY_WORDS` words. Draft fields are private, so the enforcer is the
//! only way to obtain one (deserialization included).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unvalidated object extracted from model output
pub type Candidate = serde_json::Map<String, Value>;

/// Number of tags in every Draft
pub const TAG_COUNT: usize = 3;

/// Hard cap on summary length, in whitespace-delimited words
pub const MAX_SUMMARY_WORDS: usize = 25;

/// Filler used when the model produced fewer than `TAG_COUNT` usable tags
pub const PLACEHOLDER_TAG: &str = "tag";

/// Exactly three tags and a short summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Draft {
    tags: [String; TAG_COUNT],
    summary: String,
}

impl Draft {
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Re-run the enforcer on an existing Draft (identity for any Draft)
    pub fn normalized(&self) -> Draft {
        normalize(&self.to_candidate())
    }

    /// View this Draft as a candidate object
    pub fn to_candidate(&self) -> Candidate {
        let mut map = Candidate::new();
        map.insert(
            "tags".to_string(),
            Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
        );
        map.insert("summary".to_string(), Value::String(self.summary.clone()));
        map
    }

    /// Compact JSON, as embedded in prompts and published by the Finalizer
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Indented JSON for console display
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl From<&Candidate> for Draft {
    fn from(candidate: &Candidate) -> Self {
        normalize(candidate)
    }
}

impl From<Value> for Draft {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => normalize(&map),
            _ => normalize(&Candidate::new()),
        }
    }
}

/// Count whitespace-delimited words
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Coerce any candidate into a valid Draft. Never fails.
pub fn normalize(candidate: &Candidate) -> Draft {
    let mut kept: Vec<String> = match candidate.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .take(TAG_COUNT)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    kept.resize(TAG_COUNT, PLACEHOLDER_TAG.to_string());

    let tags: [String; TAG_COUNT] = match kept.try_into() {
        Ok(tags) => tags,
        Err(_) => std::array::from_fn(|_| PLACEHOLDER_TAG.to_string()),
    };

    let summary = match candidate.get("summary") {
        Some(Value::String(s)) => truncate_words(s.trim(), MAX_SUMMARY_WORDS),
        _ => String::new(),
    };

    Draft { tags, summary }
}

fn truncate_words(s: &str, max: usize) -> String {
    if word_count(s) > max {
        s.split_whitespace().take(max).collect::<Vec<_>>().join(" ")
    } else {
        s.to_string()
    }
}
