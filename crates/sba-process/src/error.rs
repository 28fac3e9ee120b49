//! Error types for analyzer orchestration

use crate::classify::ExitClassification;
use std::time::Duration;

/// Analyzer orchestration errors
///
/// Display strings are user-facing. Raw stderr travels in the variant for
/// logs and diagnostics only.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The analyzer could not be launched at all
    #[error("Failed to start analyzer process: {reason}")]
    StartFailure {
        /// Command that was attempted
        command: String,
        /// Why the launch failed
        reason: String,
    },

    /// The analyzer outlived its time budget and was terminated
    #[error("Analysis timed out. The file may be too large or complex to process.")]
    Timeout {
        /// Budget that was exceeded
        timeout: Duration,
        /// Whether the kill signal was delivered and the child reaped
        terminated: bool,
        /// Stderr captured before termination
        stderr: String,
    },

    /// The analyzer ran but exited unsuccessfully
    #[error("{}", non_zero_message(.code, .classification))]
    NonZeroExit {
        /// Exit code, `None` when ended by a signal
        code: Option<i32>,
        /// Everything the analyzer wrote to stderr
        stderr: String,
        /// Best-effort refinement of the failure
        classification: ExitClassification,
    },
}

fn non_zero_message(code: &Option<i32>, classification: &ExitClassification) -> String {
    if let Some(message) = classification.user_message() {
        return message.to_string();
    }
    match *code {
        Some(code) => format!("Statistical analyzer exited with code {code}"),
        None => "Statistical analyzer was terminated by a signal".to_string(),
    }
}

impl ProcessError {
    /// Create start failure for a command
    pub fn start_failure(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StartFailure {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Captured stderr, if the process got far enough to produce any
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::StartFailure { .. } => None,
            Self::Timeout { stderr, .. } | Self::NonZeroExit { stderr, .. } => Some(stderr),
        }
    }

    /// Classification of a non-zero exit
    #[must_use]
    pub fn classification(&self) -> Option<ExitClassification> {
        match self {
            Self::NonZeroExit { classification, .. } => Some(*classification),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classified_exit_uses_friendly_message() {
        let err = ProcessError::NonZeroExit {
            code: Some(1),
            stderr: "could not convert string to float".into(),
            classification: ExitClassification::NonNumericValue,
        };
        assert!(err.to_string().starts_with("Data format error"));
        assert_eq!(err.classification(), Some(ExitClassification::NonNumericValue));
    }

    #[test]
    fn unclassified_exit_names_code() {
        let err = ProcessError::NonZeroExit {
            code: Some(3),
            stderr: "boom".into(),
            classification: ExitClassification::Unclassified,
        };
        assert_eq!(err.to_string(), "Statistical analyzer exited with code 3");
        assert_eq!(err.stderr(), Some("boom"));
    }

    #[test]
    fn start_failure_has_no_stderr() {
        let err = ProcessError::start_failure("python x.py", "No such file or directory");
        assert!(err.stderr().is_none());
        assert!(err.to_string().contains("No such file"));
    }
}
