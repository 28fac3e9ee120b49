//! Model reply decoding
//!
//! Models wrap JSON in prose or markdown fences often enough that a plain
//! parse is not sufficient. Candidates are tried in order:
//! 1. the whole reply, trimmed
//! 2. the first fenced code block (```` ```json ```` or bare ```` ``` ````)
//! 3. the span from the first `{` to the last `}`
//!
//! Only objects and arrays count. A reply that is a bare string or number
//! is not a structured analysis.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Result of decoding one reply
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Reply carried a JSON object or array
    Decoded(Value),
    /// Nothing structured could be recovered; raw text kept
    Undecodable(String),
}

impl DecodeOutcome {
    /// Whether structured data was recovered
    #[inline]
    #[must_use]
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }
}

fn fence() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)```").ok())
        .as_ref()
}

fn structured(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

fn fenced(reply: &str) -> Option<Value> {
    let captures = fence()?.captures(reply)?;
    structured(captures.get(1)?.as_str())
}

fn braced(reply: &str) -> Option<Value> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    structured(&reply[start..=end])
}

/// Decode a model reply
#[must_use]
pub fn decode_reply(reply: &str) -> DecodeOutcome {
    structured(reply)
        .or_else(|| fenced(reply))
        .or_else(|| braced(reply))
        .map_or_else(|| DecodeOutcome::Undecodable(reply.to_string()), DecodeOutcome::Decoded)
}
