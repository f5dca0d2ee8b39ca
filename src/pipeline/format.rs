//! Content-based format detection.
//!
//! The input format is inferred from leading bytes, never from an explicit
//! flag or the file extension. Magic bytes don't lie — extensions can be
//! wrong.

use std::path::{Path, PathBuf};

use super::PipelineError;

/// Broad document kinds the pipeline handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Paginated document requiring per-page rendering before OCR.
    Pdf,
    /// Single raster image, OCR'd directly.
    Image,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

/// Sniff the document kind from its leading bytes.
///
/// Unknown headers fall through to `Image` so the image decoder produces
/// the authoritative `Decode` error for undecodable input.
pub fn detect_kind(bytes: &[u8]) -> DocumentKind {
    match bytes {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => DocumentKind::Pdf,
        _ => DocumentKind::Image,
    }
}

/// MIME sniff for logging. Matches the raster formats the image backend
/// decodes; everything else reports as octet-stream.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x25, 0x50, 0x44, 0x46, ..] => "application/pdf",
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        // TIFF: little-endian (49 49 2A 00) or big-endian (4D 4D 00 2A)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// An input artifact, read once and owned exclusively by the orchestrator
/// for the duration of one pipeline run.
#[derive(Debug)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn read(path: &Path) -> Result<Self, PipelineError> {
        let bytes = std::fs::read(path)?;
        let kind = detect_kind(&bytes);
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            bytes,
        })
    }

    /// Source identifier persisted with the report: the file name, without
    /// any directory components.
    pub fn source_file(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
