//! Rendered matrix image

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// MIME type for an image path, by extension
#[must_use]
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Image bytes carried as a data URI
///
/// Serializes as the bare URI string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    path: PathBuf,
    mime: &'static str,
    byte_len: usize,
    data_uri: String,
}

impl ImageArtifact {
    /// Encode image bytes read from `path`
    #[must_use]
    pub fn encode(path: impl Into<PathBuf>, bytes: &[u8]) -> Self {
        let path = path.into();
        let mime = mime_for(&path);
        let data_uri = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        Self {
            path,
            mime,
            byte_len: bytes.len(),
            data_uri,
        }
    }

    /// Where the image was read from
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// MIME type embedded in the URI
    #[inline]
    #[must_use]
    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Size of the raw image
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// `data:<mime>;base64,<data>`
    #[inline]
    #[must_use]
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }
}

impl Serialize for ImageArtifact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.data_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("a/matrix.png")), "image/png");
        assert_eq!(mime_for(Path::new("matrix.JPEG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("matrix.svg")), "image/svg+xml");
        assert_eq!(mime_for(Path::new("matrix")), "application/octet-stream");
    }

    #[test]
    fn encodes_standard_base64() {
        let image = ImageArtifact::encode("m.png", b"\x89PNG");
        assert_eq!(image.data_uri(), "data:image/png;base64,iVBORw==");
        assert_eq!(image.byte_len(), 4);
        assert_eq!(
            serde_json::to_value(&image).unwrap(),
            serde_json::json!("data:image/png;base64,iVBORw==")
        );
    }
}
