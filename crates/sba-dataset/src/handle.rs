//! Dataset handles
//!
//! A handle is created by whoever accepted the upload. The pipeline only
//! reads through it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Field delimiter assumed when the uploader declares none
pub const DEFAULT_DELIMITER: u8 = b',';

/// Reference to an uploaded tabular file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetHandle {
    /// Storage path of the upload
    path: PathBuf,
    /// Declared field delimiter
    #[serde(default = "default_delimiter")]
    delimiter: u8,
    /// Byte size recorded at upload time, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    declared_size: Option<u64>,
}

fn default_delimiter() -> u8 {
    DEFAULT_DELIMITER
}

impl DatasetHandle {
    /// Create handle for a comma-delimited file
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: DEFAULT_DELIMITER,
            declared_size: None,
        }
    }

    /// With a different field delimiter
    #[inline]
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// With the size recorded at upload time
    #[inline]
    #[must_use]
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// Storage path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared field delimiter
    #[inline]
    #[must_use]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Size recorded at upload time
    #[inline]
    #[must_use]
    pub fn declared_size(&self) -> Option<u64> {
        self.declared_size
    }
}

/// A handle that passed validation, plus the size observed on disk
///
/// Only `DatasetValidator::validate` constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDataset {
    handle: DatasetHandle,
    size: u64,
}

impl ValidatedDataset {
    pub(crate) fn new(handle: DatasetHandle, size: u64) -> Self {
        Self { handle, size }
    }

    /// The validated handle
    #[inline]
    #[must_use]
    pub fn handle(&self) -> &DatasetHandle {
        &self.handle
    }

    /// Storage path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    /// Observed byte size (always > 0)
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }
}
