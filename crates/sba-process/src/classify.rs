//! Stderr classification for failed analyzer runs
//!
//! A refinement layered on a non-zero exit, not an error kind of its own.
//! Matching is by known substrings of the analyzer's diagnostics.

use serde::{Deserialize, Serialize};

/// Why the analyzer most likely failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitClassification {
    /// Tabular data could not be tokenized (unclosed quotes, stray bytes)
    MalformedTabularData,
    /// A value was not numeric where a number was expected
    NonNumericValue,
    /// Nothing recognizable in stderr
    Unclassified,
}

const MALFORMED_MARKERS: &[&str] = &["Error tokenizing data", "EOF inside string"];
const NON_NUMERIC_MARKERS: &[&str] = &["could not convert string to float"];

impl ExitClassification {
    /// Human-readable message, or `None` when unclassified
    #[must_use]
    pub fn user_message(self) -> Option<&'static str> {
        match self {
            Self::MalformedTabularData => Some(
                "CSV parsing error: The file contains improperly formatted data. \
                 Please check for unclosed quotes or special characters.",
            ),
            Self::NonNumericValue => {
                Some("Data format error: Some numeric values in your CSV are not properly formatted.")
            }
            Self::Unclassified => None,
        }
    }

    /// Stable label used in envelopes and logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedTabularData => "malformedTabularData",
            Self::NonNumericValue => "nonNumericValue",
            Self::Unclassified => "unclassified",
        }
    }
}

/// Classify analyzer stderr
#[must_use]
pub fn classify_stderr(stderr: &str) -> ExitClassification {
    if MALFORMED_MARKERS.iter().any(|m| stderr.contains(m)) {
        ExitClassification::MalformedTabularData
    } else if NON_NUMERIC_MARKERS.iter().any(|m| stderr.contains(m)) {
        ExitClassification::NonNumericValue
    } else {
        ExitClassification::Unclassified
    }
}
