//! Error taxonomy for the analysis pipeline
//!
//! Component errors keep their own types; `PipelineError` wraps them and
//! maps every one onto a single `ErrorKind` for the envelope:
//! - invalid input (`NotFound`, `EmptyInput`, `MalformedInput`)
//! - analyzer process failures
//! - analyzer artifact failures
//! - model and routing failures

use sba_artifact::ArtifactError;
use sba_dataset::DatasetError;
use sba_narrative::{AnalysisKind, NarrativeError};
use sba_process::ProcessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Typed failure category reported in envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Dataset file does not exist or cannot be read
    NotFound,
    /// Dataset file has zero bytes
    EmptyInput,
    /// Dataset does not look delimited
    MalformedInput,
    /// Analyzer could not be launched
    ProcessStartFailure,
    /// Analyzer outlived its time budget
    Timeout,
    /// Analyzer exited unsuccessfully
    NonZeroExit,
    /// Analyzer exited cleanly but an artifact is absent
    ArtifactMissing,
    /// Analyzer artifact failed validation
    ArtifactInvalid,
    /// Model could not be reached or returned nothing
    ModelInvocationFailure,
    /// Requested analysis is not supported on the chosen route
    UnsupportedKind,
}

impl ErrorKind {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::EmptyInput => "EmptyInput",
            Self::MalformedInput => "MalformedInput",
            Self::ProcessStartFailure => "ProcessStartFailure",
            Self::Timeout => "Timeout",
            Self::NonZeroExit => "NonZeroExit",
            Self::ArtifactMissing => "ArtifactMissing",
            Self::ArtifactInvalid => "ArtifactInvalid",
            Self::ModelInvocationFailure => "ModelInvocationFailure",
            Self::UnsupportedKind => "UnsupportedKind",
        }
    }

    /// Whether this is one of the `InvalidInput` family
    #[inline]
    #[must_use]
    pub fn is_invalid_input(self) -> bool {
        matches!(self, Self::NotFound | Self::EmptyInput | Self::MalformedInput)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline error
///
/// Display strings of wrapped errors are passed through unchanged; they
/// are the user-facing messages.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Dataset validation or sampling failed
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Analyzer subprocess failed
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Analyzer output missing or invalid
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Narrative generation failed
    #[error(transparent)]
    Narrative(#[from] NarrativeError),

    /// Kind has no statistical analyzer
    #[error("Unsupported analysis type for statistical analyzer: {kind}")]
    NoStatisticalAnalyzer {
        /// Requested kind
        kind: AnalysisKind,
    },

    /// Analyzer output directory could not be created
    #[error("Failed to prepare output directory {}: {source}", .path.display())]
    OutputDir {
        /// Directory that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Envelope category for this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Dataset(e) => match e {
                DatasetError::NotFound { .. } | DatasetError::Unreadable { .. } => ErrorKind::NotFound,
                DatasetError::EmptyInput { .. } => ErrorKind::EmptyInput,
                DatasetError::MalformedInput { .. } => ErrorKind::MalformedInput,
            },
            Self::Process(e) => match e {
                ProcessError::StartFailure { .. } => ErrorKind::ProcessStartFailure,
                ProcessError::Timeout { .. } => ErrorKind::Timeout,
                ProcessError::NonZeroExit { .. } => ErrorKind::NonZeroExit,
            },
            Self::Artifact(e) if e.is_missing() => ErrorKind::ArtifactMissing,
            Self::Artifact(_) => ErrorKind::ArtifactInvalid,
            Self::Narrative(NarrativeError::UnsupportedKind(_)) | Self::NoStatisticalAnalyzer { .. } => {
                ErrorKind::UnsupportedKind
            }
            Self::Narrative(NarrativeError::ModelInvocation(_)) => ErrorKind::ModelInvocationFailure,
            Self::OutputDir { .. } => ErrorKind::ProcessStartFailure,
        }
    }

    /// Sub-classification carried next to the message, if any
    #[must_use]
    pub fn detail(&self) -> Option<&'static str> {
        match self {
            Self::Process(e) => e.classification().map(|c| c.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sba_narrative::{ModelError, ParseKindError};
    use sba_process::ExitClassification;
    use std::time::Duration;

    #[test]
    fn dataset_errors_are_invalid_input() {
        let err = PipelineError::from(DatasetError::EmptyInput { path: "a.csv".into() });
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
        assert!(err.kind().is_invalid_input());

        let err = PipelineError::from(DatasetError::unreadable(
            "a.csv",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        ));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn process_errors_map_one_to_one() {
        let err = PipelineError::from(ProcessError::Timeout {
            timeout: Duration::from_secs(60),
            terminated: true,
            stderr: String::new(),
        });
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(!err.kind().is_invalid_input());
        assert!(err.detail().is_none());

        let err = PipelineError::from(ProcessError::NonZeroExit {
            code: Some(1),
            stderr: String::new(),
            classification: ExitClassification::NonNumericValue,
        });
        assert_eq!(err.kind(), ErrorKind::NonZeroExit);
        assert_eq!(err.detail(), Some("nonNumericValue"));
    }

    #[test]
    fn artifact_errors_split_missing_from_invalid() {
        let missing = PipelineError::from(ArtifactError::ImageMissing { path: "x.png".into() });
        assert_eq!(missing.kind(), ErrorKind::ArtifactMissing);

        let invalid = PipelineError::from(ArtifactError::ImageEmpty { path: "x.png".into() });
        assert_eq!(invalid.kind(), ErrorKind::ArtifactInvalid);
    }

    #[test]
    fn routing_and_model_errors() {
        let err = PipelineError::from(NarrativeError::from(ParseKindError { label: "swot".into() }));
        assert_eq!(err.kind(), ErrorKind::UnsupportedKind);
        assert_eq!(err.to_string(), "Unsupported analysis type: swot");

        let err = PipelineError::NoStatisticalAnalyzer {
            kind: AnalysisKind::NicheMarket,
        };
        assert_eq!(err.kind(), ErrorKind::UnsupportedKind);

        let err = PipelineError::from(NarrativeError::from(ModelError::MissingCredential));
        assert_eq!(err.kind(), ErrorKind::ModelInvocationFailure);
    }

    #[test]
    fn wire_names_match_serde() {
        for kind in [ErrorKind::NotFound, ErrorKind::ModelInvocationFailure, ErrorKind::UnsupportedKind] {
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                serde_json::Value::String(kind.as_str().to_string())
            );
        }
    }
}
