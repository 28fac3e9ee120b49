//! Narrative generation errors

/// An analysis label outside the supported set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported analysis type: {label}")]
pub struct ParseKindError {
    /// Label as received
    pub label: String,
}

/// Failures talking to the generative model
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No API key was configured
    #[error("model API key is not configured (set GEMINI_API_KEY)")]
    MissingCredential,

    /// Transport failure or timeout, with the request URL stripped
    #[error("request to model API failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The API answered with a non-success status
    #[error("model API returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The API answered but no text could be extracted
    #[error("No text generated from API response")]
    EmptyResponse,
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.without_url())
    }
}

/// Narrative generator errors
///
/// An undecodable reply is deliberately absent: it is reported as a
/// degraded `NarrativeResult`.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    /// Requested kind has no template
    #[error(transparent)]
    UnsupportedKind(#[from] ParseKindError),

    /// The model could not be reached or returned nothing usable
    #[error("Failed to analyze data with AI: {0}")]
    ModelInvocation(#[from] ModelError),
}
