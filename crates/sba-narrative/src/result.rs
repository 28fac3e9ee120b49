//! Generator output

use crate::decode::DecodeOutcome;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Summary shown when a reply could not be decoded
pub const DEGRADED_SUMMARY: &str = "Analysis could not be properly generated. Please try again.";

/// Narrative analysis payload
///
/// `Structured` serializes as the decoded reply itself. `Degraded`
/// serializes as `{summary, error: true, rawResponse}`.
#[derive(Debug, Clone, PartialEq)]
pub enum NarrativeResult {
    /// Decoded reply, passed through without schema checks
    Structured(Value),
    /// Reply had no recoverable JSON
    Degraded {
        /// Fixed user-facing summary
        summary: String,
        /// Reply exactly as received
        raw_response: String,
    },
}

impl NarrativeResult {
    /// Degraded payload around a raw reply
    #[must_use]
    pub fn degraded(raw_response: impl Into<String>) -> Self {
        Self::Degraded {
            summary: DEGRADED_SUMMARY.to_string(),
            raw_response: raw_response.into(),
        }
    }

    /// Whether this is a degraded payload
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Serialized form as a JSON value
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Structured(value) => value.clone(),
            Self::Degraded {
                summary,
                raw_response,
            } => serde_json::json!({
                "summary": summary,
                "error": true,
                "rawResponse": raw_response,
            }),
        }
    }
}

impl From<DecodeOutcome> for NarrativeResult {
    fn from(outcome: DecodeOutcome) -> Self {
        match outcome {
            DecodeOutcome::Decoded(value) => Self::Structured(value),
            DecodeOutcome::Undecodable(raw) => Self::degraded(raw),
        }
    }
}

impl Serialize for NarrativeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Structured(value) => value.serialize(serializer),
            Self::Degraded {
                summary,
                raw_response,
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("summary", summary)?;
                map.serialize_entry("error", &true)?;
                map.serialize_entry("rawResponse", raw_response)?;
                map.end()
            }
        }
    }
}
