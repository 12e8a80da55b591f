//! Image preparation for printed-text OCR.
//!
//! Uploads arrive as JPEG, PNG or TIFF straight from a phone or scanner.
//! Before OCR the bytes are validated, decoded, converted to grayscale and
//! re-encoded as PNG so the engine always sees one lossless format.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use tracing::debug;

use super::ExtractionError;

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Maximum input image size (in bytes) before rejecting.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

// ═══════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════

/// Validate image bytes before decoding.
/// Returns early error for clearly invalid input.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), ExtractionError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(ExtractionError::ImageDecode(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ExtractionError::ImageDecode(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Decode an upload into an image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ExtractionError> {
    validate_image_bytes(bytes)?;
    image::load_from_memory(bytes).map_err(|e| ExtractionError::ImageDecode(e.to_string()))
}

/// Decode, grayscale and re-encode as PNG for the OCR engine.
pub fn prepare_for_ocr(bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let decoded = decode_image(bytes)?;
    let (width, height) = decoded.dimensions();
    let gray = DynamicImage::ImageLuma8(decoded.to_luma8());

    let mut out = Cursor::new(Vec::new());
    gray.write_to(&mut out, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageDecode(format!("PNG encoding failed: {e}")))?;

    debug!(width, height, "Prepared image for OCR");
    Ok(out.into_inner())
}

#[cfg(test)]
pub(crate) fn test_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 + y * 13) as u8, (x * 31) as u8, (y * 17) as u8])
    }));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
    out.into_inner()
}
