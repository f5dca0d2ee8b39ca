//! OCR adapter over the external Tesseract engine.
//!
//! The engine is a black box behind `OcrEngine`: one production adapter
//! shelling out to the Tesseract executable, one mock returning canned
//! text so the parser and orchestrator are testable without Tesseract
//! installed.

use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use super::PipelineError;
use crate::config::PipelineConfig;

/// OCR engine abstraction (allows mocking for tests).
pub trait OcrEngine: Send + Sync {
    /// Extract text from a preprocessed raster image (PNG bytes).
    ///
    /// An empty string is a valid result for blank or unreadable images,
    /// not an error. `OcrEngine` errors are fatal for the run and are not
    /// retried here.
    fn extract_text(&self, image_bytes: &[u8]) -> Result<String, PipelineError>;
}

/// Production adapter invoking the Tesseract CLI.
///
/// The image is piped over stdin (`tesseract stdin stdout -l <lang>`), so
/// no temp file is needed for the OCR call itself. Engine location comes
/// from `PipelineConfig`, never from process-wide state.
pub struct TesseractOcr {
    command: PathBuf,
    lang: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<PathBuf>, lang: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            lang: lang.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.tesseract_cmd, &config.ocr_lang)
    }
}

impl OcrEngine for TesseractOcr {
    fn extract_text(&self, image_bytes: &[u8]) -> Result<String, PipelineError> {
        let mut child = Command::new(&self.command)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PipelineError::OcrEngine(format!(
                    "Failed to launch {}: {e}",
                    self.command.display()
                ))
            })?;

        child
            .stdin
            .take()
            .ok_or_else(|| PipelineError::OcrEngine("Tesseract stdin unavailable".into()))?
            .write_all(image_bytes)
            .map_err(|e| PipelineError::OcrEngine(format!("Failed to send image: {e}")))?;

        let output = child.wait_with_output().map_err(|e| {
            PipelineError::OcrEngine(format!("Tesseract did not exit cleanly: {e}"))
        })?;

        if !output.status.success() {
            return Err(PipelineError::OcrEngine(format!(
                "Tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(
            image_bytes = image_bytes.len(),
            chars = text.len(),
            "OCR complete"
        );
        Ok(text)
    }
}

/// Mock OCR engine for unit testing without Tesseract.
///
/// Returns a fixed text, or a page-by-page queue for multi-page flows
/// (the fixed text serves as fallback once the queue is exhausted).
pub struct MockOcrEngine {
    queue: Mutex<VecDeque<String>>,
    fallback: String,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: text.to_string(),
        }
    }

    pub fn with_pages(pages: &[&str]) -> Self {
        Self {
            queue: Mutex::new(pages.iter().map(|p| p.to_string()).collect()),
            fallback: String::new(),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn extract_text(&self, _image_bytes: &[u8]) -> Result<String, PipelineError> {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        Ok(queue.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}
