//! Uniform result envelope
//!
//! Both analyzer branches end here. Success carries the branch's payload
//! untouched; failure carries the error category and its user-facing
//! message.

use crate::error::{ErrorKind, PipelineError};
use crate::request::AnalyzerRoute;
use sba_artifact::MatrixArtifacts;
use sba_narrative::{AnalysisKind, NarrativeResult};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use ulid::Ulid;

/// Payload of a successful analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisPayload {
    /// `{summary, image}` from the statistical analyzer
    Matrix(MatrixArtifacts),
    /// Decoded or degraded model reply
    Narrative(NarrativeResult),
}

/// Typed result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    /// Identifier used in logs and artifact names
    pub run_id: Ulid,
    /// Analysis performed
    pub kind: AnalysisKind,
    /// Analyzer that served it
    pub route: AnalyzerRoute,
    /// Result payload
    pub payload: AnalysisPayload,
}

/// `{ok: true, kind, payload}` or `{ok: false, errorKind, message[, detail]}`
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEnvelope {
    /// Analysis succeeded
    Success {
        /// Analysis performed
        kind: AnalysisKind,
        /// Branch payload
        payload: AnalysisPayload,
    },
    /// Analysis failed
    Failure {
        /// Error category
        error_kind: ErrorKind,
        /// User-facing message
        message: String,
        /// Sub-classification, if any
        detail: Option<String>,
    },
}

impl AnalysisEnvelope {
    /// Envelope for a typed pipeline result
    #[must_use]
    pub fn from_result(result: Result<AnalysisOutcome, PipelineError>) -> Self {
        match result {
            Ok(outcome) => Self::from(outcome),
            Err(err) => Self::from(&err),
        }
    }

    /// Whether the analysis succeeded
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Error category of a failure
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_kind, .. } => Some(*error_kind),
        }
    }

    /// Message of a failure
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }

    /// Serialized form as a JSON value
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({
                "ok": false,
                "errorKind": "ArtifactInvalid",
                "message": format!("Failed to serialize analysis result: {e}"),
            })
        })
    }
}

impl From<AnalysisOutcome> for AnalysisEnvelope {
    fn from(outcome: AnalysisOutcome) -> Self {
        Self::Success {
            kind: outcome.kind,
            payload: outcome.payload,
        }
    }
}

impl From<&PipelineError> for AnalysisEnvelope {
    fn from(err: &PipelineError) -> Self {
        Self::Failure {
            error_kind: err.kind(),
            message: err.to_string(),
            detail: err.detail().map(str::to_string),
        }
    }
}

impl Serialize for AnalysisEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { kind, payload } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("ok", &true)?;
                map.serialize_entry("kind", kind)?;
                map.serialize_entry("payload", payload)?;
                map.end()
            }
            Self::Failure {
                error_kind,
                message,
                detail,
            } => {
                let mut map = serializer.serialize_map(Some(3 + usize::from(detail.is_some())))?;
                map.serialize_entry("ok", &false)?;
                map.serialize_entry("errorKind", error_kind)?;
                map.serialize_entry("message", message)?;
                if let Some(detail) = detail {
                    map.serialize_entry("detail", detail)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sba_dataset::DatasetError;
    use sba_process::{ExitClassification, ProcessError};
    use serde_json::json;

    #[test]
    fn failure_shape() {
        let err = PipelineError::from(DatasetError::NotFound {
            path: "/missing/x.csv".into(),
        });
        let envelope = AnalysisEnvelope::from_result(Err(err));
        assert!(!envelope.is_ok());
        assert_eq!(
            envelope.to_json(),
            json!({
                "ok": false,
                "errorKind": "NotFound",
                "message": "Input file does not exist: /missing/x.csv",
            })
        );
    }

    #[test]
    fn classified_exit_carries_detail() {
        let err = PipelineError::from(ProcessError::NonZeroExit {
            code: Some(1),
            stderr: "Error tokenizing data".into(),
            classification: ExitClassification::MalformedTabularData,
        });
        let value = AnalysisEnvelope::from(&err).to_json();
        assert_eq!(value["errorKind"], json!("NonZeroExit"));
        assert_eq!(value["detail"], json!("malformedTabularData"));
        assert!(value["message"].as_str().unwrap().starts_with("CSV parsing error"));
    }

    #[test]
    fn narrative_success_shape() {
        let outcome = AnalysisOutcome {
            run_id: Ulid::new(),
            kind: AnalysisKind::NicheMarket,
            route: AnalyzerRoute::Narrative,
            payload: AnalysisPayload::Narrative(NarrativeResult::degraded("oops")),
        };
        assert_eq!(
            AnalysisEnvelope::from(outcome).to_json(),
            json!({
                "ok": true,
                "kind": "niche_market",
                "payload": {
                    "summary": "Analysis could not be properly generated. Please try again.",
                    "error": true,
                    "rawResponse": "oops",
                },
            })
        );
    }
}
