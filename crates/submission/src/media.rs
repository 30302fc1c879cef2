//! File handles for the video and reference images
//!
//! The payload is held in a reference-counted buffer so the request snapshot
//! taken at submit time shares it with the input fields instead of copying.
use anyhow::{Context, Result};
use bytes::Bytes;
use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// A binary file plus its declared media kind (MIME type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    file_name: String,
    media_kind: String,
    data: Bytes,
}

impl MediaFile {
    pub fn new(
        file_name: impl Into<String>,
        media_kind: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_kind: media_kind.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, keeping its name and guessing the media kind
    /// from the extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read media file {}", path.display()))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        Ok(Self::new(file_name, media_kind_for_path(path), data))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_kind(&self) -> &str {
        &self.media_kind
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// MIME type for common video and image extensions.
pub fn media_kind_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => OCTET_STREAM,
    }
}
