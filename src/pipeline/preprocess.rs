//! Image preprocessing for OCR input.
//!
//! Fixed policy: convert to single-channel grayscale, then upscale both
//! dimensions by 2×. Grayscale loses color entirely — irreversible and
//! intentional, since OCR quality improves on grayscale input.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageOutputFormat};

use super::PipelineError;

/// Fixed upscale factor applied to both dimensions. Policy constant, not
/// configurable.
pub const UPSCALE_FACTOR: u32 = 2;

/// Normalize a raster image for OCR: grayscale + 2× upscale, re-encoded
/// as PNG. Zero-dimension images are an error; undecodable bytes surface
/// as `Decode`.
pub fn preprocess(image_bytes: &[u8]) -> Result<Vec<u8>, PipelineError> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| PipelineError::Decode(e.to_string()))?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(PipelineError::Decode("zero-dimension image".into()));
    }

    let (target_width, target_height) = upscaled_dimensions(width, height)?;
    let gray = img.into_luma8();
    let upscaled = imageops::resize(&gray, target_width, target_height, FilterType::CatmullRom);

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(upscaled)
        .write_to(&mut buf, ImageOutputFormat::Png)
        .map_err(|e| PipelineError::Decode(format!("PNG encode failed: {e}")))?;

    tracing::debug!(width, height, "Preprocessed image for OCR");
    Ok(buf.into_inner())
}

/// Target dimensions after the fixed upscale. Dimensions large enough to
/// overflow `u32` surface as `Decode` instead of panicking.
fn upscaled_dimensions(width: u32, height: u32) -> Result<(u32, u32), PipelineError> {
    match (
        width.checked_mul(UPSCALE_FACTOR),
        height.checked_mul(UPSCALE_FACTOR),
    ) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(PipelineError::Decode(format!(
            "image dimensions {width}x{height} overflow the upscale factor"
        ))),
    }
}
