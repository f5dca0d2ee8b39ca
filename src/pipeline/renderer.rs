//! PDF page rendering via Google PDFium.
//!
//! Renders individual PDF pages to PNG images for OCR. `PdfiumRenderer`
//! is stateless (`Send + Sync`). Each operation creates a fresh `Pdfium`
//! instance because the upstream type is `!Send`; the OS caches
//! `dlopen`/`LoadLibrary` calls, so repeat loads are near-free.

use std::io::Cursor;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::PipelineError;

/// Rendering DPI applied uniformly to every page. Fixed policy constant.
pub const RENDER_DPI: u32 = 200;

/// Maximum dimension (width or height) for rendered page images.
/// Prevents OOM on extremely large pages.
const MAX_DIMENSION_PX: u32 = 4096;

/// PDF points per inch (standard PDF unit).
const POINTS_PER_INCH: f32 = 72.0;

/// A raster image derived from one PDF page.
///
/// Transient: created by the renderer, consumed by the preprocessor, and
/// deleted from scratch storage by the orchestrator after OCR.
#[derive(Debug)]
pub struct RenderedPage {
    /// 1-based page index; ordering equals document page order.
    pub page_number: usize,
    /// PNG-encoded pixel buffer.
    pub png_bytes: Vec<u8>,
}

/// PDF page rendering abstraction (allows mocking for tests).
///
/// Each page renders independently of every other page — no ordering
/// dependency exists before the final page-order concatenation, so a
/// concurrent caller may fan rendering out and merge by page index.
pub trait PdfPageRenderer: Send + Sync {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, PipelineError>;

    /// Render one page (0-based index) to PNG at the given DPI.
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, PipelineError>;
}

/// Lazily render every page of a document, in page order.
///
/// Pages render on demand as the iterator advances; a corrupt page
/// surfaces as an `Err` item, which aborts the whole render — no
/// partial-document persistence.
pub fn render_pages<'a>(
    renderer: &'a dyn PdfPageRenderer,
    pdf_bytes: &'a [u8],
    dpi: u32,
) -> Result<impl Iterator<Item = Result<RenderedPage, PipelineError>> + 'a, PipelineError> {
    let count = renderer.page_count(pdf_bytes)?;
    Ok((0..count).map(move |index| {
        renderer
            .render_page(pdf_bytes, index, dpi)
            .map(|png_bytes| RenderedPage {
                page_number: index + 1,
                png_bytes,
            })
    }))
}

/// Renders PDF pages to PNG images using Google PDFium.
pub struct PdfiumRenderer;

impl PdfiumRenderer {
    /// Create a new renderer, verifying the PDFium library is loadable
    /// (fail-fast at construction time).
    pub fn new() -> Result<Self, PipelineError> {
        let _ = load_pdfium()?;
        Ok(Self)
    }
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to library file)
/// 2. Alongside the running executable
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, PipelineError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            PipelineError::DocumentOpen(format!("Failed to load PDFium from {path}: {e}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    // pdfium_platform_library_name_at_path() handles platform-specific names:
    //   Windows → pdfium.dll | Linux → libpdfium.so | macOS → libpdfium.dylib
    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                debug!(dir = %exe_dir.display(), "Loaded PDFium from executable directory");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        PipelineError::DocumentOpen(format!(
            "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

/// Compute pixel dimensions for rendering, applying the dimension guard.
///
/// Returns (width_px, height_px), both clamped to [1, MAX_DIMENSION_PX].
/// Preserves aspect ratio when capping.
fn compute_render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).max(1).min(MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).max(1).min(MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PdfPageRenderer for PdfiumRenderer {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, PipelineError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| PipelineError::DocumentOpen(format!("Failed to load PDF: {e}")))?;
        Ok(document.pages().len() as usize)
    }

    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, PipelineError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| PipelineError::DocumentOpen(format!("Failed to load PDF: {e}")))?;

        let pages = document.pages();

        let index = u16::try_from(page_index).map_err(|_| PipelineError::PageRender {
            page: page_index,
            reason: format!("Page index {page_index} exceeds u16 maximum"),
        })?;

        let page = pages.get(index).map_err(|_| PipelineError::PageRender {
            page: page_index,
            reason: format!(
                "Page {page_index} out of range (document has {} pages)",
                pages.len()
            ),
        })?;

        let width_points = page.width().value;
        let height_points = page.height().value;
        let (target_w, target_h) = compute_render_dimensions(width_points, height_points, dpi);

        let uncapped_w = (width_points * dpi as f32 / POINTS_PER_INCH) as u32;
        let uncapped_h = (height_points * dpi as f32 / POINTS_PER_INCH) as u32;
        if target_w != uncapped_w || target_h != uncapped_h {
            warn!(
                page = page_index,
                raw_width = uncapped_w,
                raw_height = uncapped_h,
                capped_width = target_w,
                capped_height = target_h,
                "Page dimensions capped to {MAX_DIMENSION_PX}px",
            );
        }

        let config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PipelineError::PageRender {
                page: page_index,
                reason: format!("Rendering failed: {e}"),
            })?;

        let dynamic_image = bitmap.as_image();
        let mut cursor = Cursor::new(Vec::new());
        dynamic_image
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| PipelineError::PageRender {
                page: page_index,
                reason: format!("PNG encoding failed: {e}"),
            })?;

        let png_bytes = cursor.into_inner();

        debug!(
            page = page_index,
            width = target_w,
            height = target_h,
            png_size = png_bytes.len(),
            "Rendered PDF page to PNG"
        );

        Ok(png_bytes)
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Mock PDF page renderer returning a minimal PNG for each valid page.
///
/// Used by orchestrator tests that need a PdfPageRenderer without the
/// actual PDFium binary.
pub struct MockPdfPageRenderer {
    page_count: usize,
}

impl MockPdfPageRenderer {
    pub fn new(page_count: usize) -> Self {
        Self { page_count }
    }
}

impl PdfPageRenderer for MockPdfPageRenderer {
    fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, PipelineError> {
        Ok(self.page_count)
    }

    fn render_page(
        &self,
        _pdf_bytes: &[u8],
        page_index: usize,
        _dpi: u32,
    ) -> Result<Vec<u8>, PipelineError> {
        if page_index >= self.page_count {
            return Err(PipelineError::PageRender {
                page: page_index,
                reason: format!("Page {page_index} out of range"),
            });
        }
        let img = image::GrayImage::from_pixel(32, 32, image::Luma([200u8]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut buf, ImageOutputFormat::Png)
            .map_err(|e| PipelineError::PageRender {
                page: page_index,
                reason: e.to_string(),
            })?;
        Ok(buf.into_inner())
    }
}
