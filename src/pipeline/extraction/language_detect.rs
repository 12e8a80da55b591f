//! Language detection for extracted text.
//!
//! Detection is informational only: the result is logged with the
//! document and never changes routing or extraction.

use whatlang::detect;

/// Minimum trimmed length worth running detection on.
const MIN_DETECTION_CHARS: usize = 20;

/// A detected language as an ISO 639-3 code (Tesseract-compatible).
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLanguage {
    pub code: &'static str,
    pub confidence: f64,
    pub reliable: bool,
}

pub trait LanguageDetector {
    /// `None` when the text is too short or no language stands out.
    fn detect_language(&self, text: &str) -> Option<DetectedLanguage>;
}

/// Trigram-based detection via `whatlang`.
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect_language(&self, text: &str) -> Option<DetectedLanguage> {
        if text.trim().chars().count() < MIN_DETECTION_CHARS {
            return None;
        }
        let info = detect(text)?;
        Some(DetectedLanguage {
            code: info.lang().code(),
            confidence: info.confidence(),
            reliable: info.is_reliable(),
        })
    }
}
