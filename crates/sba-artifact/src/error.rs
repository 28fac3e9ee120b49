//! Artifact errors

use std::path::{Path, PathBuf};

/// Why a summary record was rejected
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    /// Text is not JSON at all
    #[error("summary is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    /// JSON, but not an object
    #[error("summary must be a JSON object, found {0}")]
    NotObject(&'static str),

    /// A required field is absent or null
    #[error("summary field `{0}` is missing or null")]
    MissingField(&'static str),
}

/// Failures reading analyzer output
///
/// The analyzer exited cleanly for every one of these; they describe what
/// it left behind.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// No summary next to the image
    #[error("Summary file not found. Analysis may have failed silently.")]
    SummaryMissing {
        /// Expected summary location
        path: PathBuf,
    },

    /// No image at the requested output path
    #[error("Image file not found. Analysis may have failed silently.")]
    ImageMissing {
        /// Expected image location
        path: PathBuf,
    },

    /// Summary failed validation
    #[error("Generated summary data is incomplete or invalid.")]
    SummaryInvalid {
        /// Summary location
        path: PathBuf,
        /// What was wrong, for logs
        #[source]
        source: SummaryError,
    },

    /// Image file exists but holds no bytes
    #[error("Generated image is empty. Analysis may have failed silently.")]
    ImageEmpty {
        /// Image location
        path: PathBuf,
    },

    /// An artifact exists but could not be read
    #[error("Error processing analysis results: {source}")]
    Unreadable {
        /// Artifact location
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ArtifactError {
    /// Whether an expected artifact could not be obtained at all
    ///
    /// The counterpart is an artifact that was obtained but failed checks.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::SummaryMissing { .. } | Self::ImageMissing { .. } | Self::Unreadable { .. }
        )
    }

    /// Artifact the error refers to
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::SummaryMissing { path }
            | Self::ImageMissing { path }
            | Self::SummaryInvalid { path, .. }
            | Self::ImageEmpty { path }
            | Self::Unreadable { path, .. } => path,
        }
    }

    pub(crate) fn invalid(path: &Path, source: SummaryError) -> Self {
        Self::SummaryInvalid {
            path: path.to_path_buf(),
            source,
        }
    }
}
