//! End-to-end pipeline: locate → render (PDF only) → preprocess → OCR →
//! parse → assemble → persist → clean up transient artifacts.
//!
//! Single-threaded and synchronous: one invocation processes exactly one
//! document before returning. Per-page rendering and OCR inside the PDF
//! flow have no shared mutable state, so a future implementation may fan
//! them out across pages as long as the final concatenation keeps original
//! page order.

use std::path::Path;

use tracing::info;

use super::assemble::assemble;
use super::format::{sniff_mime, DocumentKind, SourceDocument};
use super::ocr::{OcrEngine, TesseractOcr};
use super::parser::parse_lab_values;
use super::preprocess::preprocess;
use super::renderer::{render_pages, PdfPageRenderer, PdfiumRenderer, RENDER_DPI};
use super::scratch::ScratchDir;
use super::PipelineError;
use crate::config::PipelineConfig;
use crate::db::ReportStore;
use crate::models::LabReport;

/// Outcome of one pipeline run.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Input path absent — expected in demo/check mode, not an error.
    Skipped,
    /// Report assembled and persisted.
    Completed(LabReport),
}

/// Drives one document end to end. All collaborators are injected at
/// construction time; there is no process-wide state.
pub struct ReportPipeline {
    config: PipelineConfig,
    ocr_engine: Box<dyn OcrEngine>,
    pdf_renderer: Box<dyn PdfPageRenderer>,
    store: Box<dyn ReportStore>,
}

impl ReportPipeline {
    pub fn new(
        config: PipelineConfig,
        ocr_engine: Box<dyn OcrEngine>,
        pdf_renderer: Box<dyn PdfPageRenderer>,
        store: Box<dyn ReportStore>,
    ) -> Self {
        Self {
            config,
            ocr_engine,
            pdf_renderer,
            store,
        }
    }

    /// Production wiring: Tesseract CLI for OCR, PDFium for page rendering.
    /// Fails fast if the PDFium library cannot be loaded.
    pub fn with_production_engines(
        config: PipelineConfig,
        store: Box<dyn ReportStore>,
    ) -> Result<Self, PipelineError> {
        let ocr_engine = Box::new(TesseractOcr::from_config(&config));
        let pdf_renderer = Box::new(PdfiumRenderer::new()?);
        Ok(Self::new(config, ocr_engine, pdf_renderer, store))
    }

    /// Process one document end to end.
    ///
    /// A missing input resolves to `Skipped`. Any stage failure aborts the
    /// run; scratch artifacts created before the failure are already
    /// cleaned up by the guard when the error propagates. Insertion is
    /// fire-and-forget — verification is the caller's concern.
    pub fn run(
        &self,
        patient_name: &str,
        input: &Path,
    ) -> Result<PipelineOutcome, PipelineError> {
        if !input.exists() {
            info!(path = %input.display(), "No input document, nothing to process");
            return Ok(PipelineOutcome::Skipped);
        }

        let document = SourceDocument::read(input)?;
        info!(
            path = %input.display(),
            kind = document.kind.as_str(),
            mime = sniff_mime(&document.bytes),
            size = document.bytes.len(),
            "Located input document"
        );

        let full_text = match document.kind {
            DocumentKind::Image => self.ocr_image(&document.bytes)?,
            DocumentKind::Pdf => self.ocr_pdf_pages(&document.bytes)?,
        };

        let lab_values = parse_lab_values(&full_text);
        let report = assemble(patient_name, &document.source_file(), lab_values)?;

        self.store.insert(&report)?;
        info!(
            patient = %report.patient_name,
            source = %report.source_file,
            values = report.lab_values.len(),
            "Persisted lab report"
        );

        Ok(PipelineOutcome::Completed(report))
    }

    /// Image flow: single image → preprocess → OCR.
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, PipelineError> {
        let processed = preprocess(image_bytes)?;
        self.ocr_engine.extract_text(&processed)
    }

    /// PDF flow: render each page, stage it in scratch storage, preprocess
    /// and OCR it, then concatenate texts in page order with a separating
    /// line break. The scratch guard drains rendered pages on every exit
    /// path, including aborts.
    fn ocr_pdf_pages(&self, pdf_bytes: &[u8]) -> Result<String, PipelineError> {
        let mut scratch = ScratchDir::create(&self.config.scratch_dir)?;
        let mut page_texts = Vec::new();

        for page in render_pages(self.pdf_renderer.as_ref(), pdf_bytes, RENDER_DPI)? {
            let page = page?;
            scratch.write_page(page.page_number, &page.png_bytes)?;

            let processed = preprocess(&page.png_bytes)?;
            let text = self.ocr_engine.extract_text(&processed)?;
            tracing::debug!(
                page = page.page_number,
                chars = text.len(),
                "Page OCR complete"
            );
            page_texts.push(text);
        }

        scratch.drain();
        Ok(page_texts.join("\n"))
    }
}
