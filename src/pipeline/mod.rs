pub mod format;
pub mod preprocess;
pub mod ocr;
pub mod renderer;
pub mod parser;
pub mod assemble;
pub mod scratch;
pub mod orchestrator;

pub use orchestrator::*;
pub use parser::parse_lab_values;

use thiserror::Error;

use crate::db::DatabaseError;

/// Fatal failure taxonomy for one pipeline run.
///
/// Every variant aborts the current run — retries, if desired, belong to
/// the caller. Parser-level "no match" conditions are not errors; they are
/// silently excluded candidates, reflected only in a possibly-empty
/// `lab_values` sequence.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Failed to open document: {0}")]
    DocumentOpen(String),

    #[error("Failed to render page {page}: {reason}")]
    PageRender { page: usize, reason: String },

    #[error("OCR engine unavailable or misconfigured: {0}")]
    OcrEngine(String),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),
}
