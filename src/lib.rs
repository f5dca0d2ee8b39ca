//! MedScan — lab-report ingestion and extraction.
//!
//! Ingests scanned or photographed laboratory reports (raster images or
//! multi-page PDFs), extracts their text via OCR, parses structured lab
//! measurements out of the free text, and persists the resulting record
//! keyed to its source document.
//!
//! The OCR engine, PDF renderer, and document store are collaborators
//! behind traits (`OcrEngine`, `PdfPageRenderer`, `ReportStore`); the
//! pipeline performs no medical interpretation of extracted values.

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;

pub use config::PipelineConfig;
pub use models::{LabMeasurement, LabReport, ReportFilter};
pub use pipeline::{parse_lab_values, PipelineError, PipelineOutcome, ReportPipeline};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding the pipeline. Library code
/// only emits events; installing a subscriber is the caller's choice, so
/// repeated calls are a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
