//! Error types for dataset validation and sampling

use std::path::{Path, PathBuf};

/// Dataset errors
///
/// Display strings are short enough to show to an end user directly.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Nothing exists at the declared path
    #[error("Input file does not exist: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The file exists but has zero bytes
    #[error("Input file is empty: {}", .path.display())]
    EmptyInput { path: PathBuf },

    /// The probed prefix holds no field delimiter
    #[error("Input file does not appear to be a valid CSV: {}", .path.display())]
    MalformedInput { path: PathBuf },

    /// The file exists but could not be read
    #[error("Error reading input file: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DatasetError {
    /// Create unreadable error for path
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Path of the dataset the error refers to
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::EmptyInput { path }
            | Self::MalformedInput { path }
            | Self::Unreadable { path, .. } => path,
        }
    }
}
