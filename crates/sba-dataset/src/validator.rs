//! Fail-fast dataset validation
//!
//! Three checks, in order, stopping at the first failure:
//! 1. the file exists
//! 2. it is not empty
//! 3. a bounded prefix contains the declared field delimiter
//!
//! This is a heuristic, not a parser. It only has to reject obviously wrong
//! uploads before a subprocess or model call is paid for.

use crate::error::DatasetError;
use crate::handle::{DatasetHandle, ValidatedDataset};
use std::io::ErrorKind;
use tokio::fs::{self, File};
use tokio::io::AsyncReadExt;

/// Bytes inspected for a delimiter
pub const DEFAULT_PROBE_BYTES: usize = 500;

/// Dataset validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetValidator {
    probe_bytes: usize,
}

impl DatasetValidator {
    /// Create validator with the given probe size
    #[inline]
    #[must_use]
    pub fn new(probe_bytes: usize) -> Self {
        Self {
            probe_bytes: probe_bytes.max(1),
        }
    }

    /// Number of leading bytes inspected
    #[inline]
    #[must_use]
    pub fn probe_bytes(&self) -> usize {
        self.probe_bytes
    }

    /// Validate a dataset handle
    ///
    /// # Errors
    /// - `DatasetError::NotFound` if no regular file exists at the path
    /// - `DatasetError::EmptyInput` if the file has zero bytes
    /// - `DatasetError::MalformedInput` if the probed prefix has no delimiter
    /// - `DatasetError::Unreadable` on any other I/O failure
    pub async fn validate(&self, handle: &DatasetHandle) -> Result<ValidatedDataset, DatasetError> {
        let path = handle.path();

        let metadata = match fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                return Err(DatasetError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DatasetError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(DatasetError::unreadable(path, e)),
        };

        if metadata.len() == 0 {
            return Err(DatasetError::EmptyInput {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)
            .await
            .map_err(|e| DatasetError::unreadable(path, e))?;
        let mut prefix = Vec::with_capacity(self.probe_bytes);
        file.take(self.probe_bytes as u64)
            .read_to_end(&mut prefix)
            .await
            .map_err(|e| DatasetError::unreadable(path, e))?;

        if !prefix.contains(&handle.delimiter()) {
            tracing::debug!(
                "No delimiter {:?} in first {} bytes of {}",
                handle.delimiter() as char,
                prefix.len(),
                path.display()
            );
            return Err(DatasetError::MalformedInput {
                path: path.to_path_buf(),
            });
        }

        if let Some(declared) = handle.declared_size() {
            if declared != metadata.len() {
                tracing::warn!(
                    "Dataset {} is {} bytes on disk but was declared as {}",
                    path.display(),
                    metadata.len(),
                    declared
                );
            }
        }

        Ok(ValidatedDataset::new(handle.clone(), metadata.len()))
    }
}

impl Default for DatasetValidator {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_BYTES)
    }
}
