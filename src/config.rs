//! Explicit pipeline configuration.
//!
//! Everything the orchestrator needs is passed in at construction time —
//! no process-wide singletons for the store handle or engine path.

use std::path::PathBuf;

/// Configuration for one `ReportPipeline` instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Tesseract executable invoked for OCR.
    /// Defaults from `MEDSCAN_TESSERACT_CMD`, falling back to `tesseract`
    /// on the search path.
    pub tesseract_cmd: PathBuf,
    /// OCR language(s), e.g. "eng" or "eng+fra".
    pub ocr_lang: String,
    /// Root directory for transient per-page images. Each run stages its
    /// pages in its own subdirectory, created on demand and removed by
    /// cleanup on every exit path of the run.
    pub scratch_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            tesseract_cmd: default_tesseract_cmd(),
            ocr_lang: "eng".into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn with_tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.tesseract_cmd = cmd.into();
        self
    }

    pub fn with_ocr_lang(mut self, lang: impl Into<String>) -> Self {
        self.ocr_lang = lang.into();
        self
    }
}

/// Engine location is environment-provided, not part of the data contract.
pub fn default_tesseract_cmd() -> PathBuf {
    std::env::var_os("MEDSCAN_TESSERACT_CMD")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tesseract"))
}

pub fn default_log_filter() -> &'static str {
    "medscan=info"
}
