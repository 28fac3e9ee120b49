//! Locating and loading analyzer output

use crate::error::ArtifactError;
use crate::image::ImageArtifact;
use crate::summary::SummaryArtifact;
use serde::Serialize;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SUMMARY_SUFFIX: &str = "_summary.json";

/// Summary location for an image: same directory, same stem, `_summary.json`
///
/// `out/bcg_matrix_1.png` pairs with `out/bcg_matrix_1_summary.json`.
#[must_use]
pub fn summary_path_for(image: &Path) -> PathBuf {
    let mut name = image
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(SUMMARY_SUFFIX);
    image.with_file_name(name)
}

/// Validated analyzer output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixArtifacts {
    /// Structured summary
    pub summary: SummaryArtifact,
    /// Rendered matrix
    pub image: ImageArtifact,
}

/// Reads the image/summary pair produced by one analyzer run
///
/// Stateless; reads each file once and never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactReader;

impl ArtifactReader {
    /// Create reader
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Load and validate the artifacts for `image_path`
    ///
    /// # Errors
    /// - `SummaryMissing` / `ImageMissing` when a file is absent
    /// - `SummaryInvalid` when the summary is unparseable or lacks
    ///   `thresholds` / `counts`
    /// - `ImageEmpty` when the image has no bytes
    /// - `Unreadable` on any other I/O failure
    pub async fn read(&self, image_path: &Path) -> Result<MatrixArtifacts, ArtifactError> {
        let summary_path = summary_path_for(image_path);

        if !exists(&summary_path).await? {
            tracing::warn!("Analyzer summary missing at {}", summary_path.display());
            return Err(ArtifactError::SummaryMissing { path: summary_path });
        }
        if !exists(image_path).await? {
            tracing::warn!("Analyzer image missing at {}", image_path.display());
            return Err(ArtifactError::ImageMissing {
                path: image_path.to_path_buf(),
            });
        }

        let text = read_to_string(&summary_path).await?;
        let summary = SummaryArtifact::parse(&text).map_err(|err| {
            tracing::warn!("Rejecting summary {}: {}", summary_path.display(), err);
            ArtifactError::invalid(&summary_path, err)
        })?;

        let bytes = tokio::fs::read(image_path).await.map_err(|e| unreadable(image_path, e))?;
        if bytes.is_empty() {
            tracing::warn!("Analyzer image is empty: {}", image_path.display());
            return Err(ArtifactError::ImageEmpty {
                path: image_path.to_path_buf(),
            });
        }

        let image = ImageArtifact::encode(image_path, &bytes);
        tracing::debug!(
            "Loaded artifacts: {} ({} bytes), {} ({} bytes)",
            image_path.display(),
            image.byte_len(),
            summary_path.display(),
            text.len()
        );
        Ok(MatrixArtifacts { summary, image })
    }
}

async fn exists(path: &Path) -> Result<bool, ArtifactError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(unreadable(path, e)),
    }
}

async fn read_to_string(path: &Path) -> Result<String, ArtifactError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| unreadable(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn unreadable(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Unreadable {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_sits_next_to_image() {
        assert_eq!(
            summary_path_for(Path::new("out/bcg_matrix_1.png")),
            PathBuf::from("out/bcg_matrix_1_summary.json")
        );
        assert_eq!(
            summary_path_for(Path::new("/tmp/run.v2.png")),
            PathBuf::from("/tmp/run.v2_summary.json")
        );
        assert_eq!(
            summary_path_for(Path::new("matrix")),
            PathBuf::from("matrix_summary.json")
        );
    }
}
