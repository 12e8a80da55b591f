use serde::{Deserialize, Serialize};

use super::{DetectionError, ExtractionError};
use crate::models::FileKind;

/// Text pulled out of a document, with how it was obtained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutedText {
    pub text: String,
    pub handwritten: bool,
    pub file_kind: FileKind,
    pub method: ExtractionMethod,
}

/// How text was extracted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtractionMethod {
    PdfText,
    PrintedOcr,
    HandwrittenOcr,
}

/// Raw OCR result from the engine
#[derive(Debug)]
pub struct OcrPageResult {
    pub text: String,
    pub confidence: f32,
}

/// Verdict of the handwriting detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandwritingVerdict {
    Handwritten,
    Printed,
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError>;
}

/// PDF text extraction abstraction
pub trait PdfExtractor {
    /// Text layer of every page, joined with newlines.
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Decides whether an image is handwritten or printed.
pub trait HandwritingDetector {
    fn detect(&self, image_bytes: &[u8]) -> Result<HandwritingVerdict, DetectionError>;
}

/// OCR specialized for handwriting.
pub trait HandwritingOcr {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, DetectionError>;
}
