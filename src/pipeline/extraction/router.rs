use tracing::{debug, warn};

use super::preprocess::prepare_for_ocr;
use super::types::{
    ExtractionMethod, HandwritingDetector, HandwritingOcr, HandwritingVerdict, OcrEngine,
    PdfExtractor, RoutedText,
};
use super::ExtractionError;
use crate::models::FileKind;

/// Picks the extraction path for an upload and runs it:
/// PDF text layer, printed OCR, or handwriting OCR.
pub struct TextExtractionRouter {
    pdf: Box<dyn PdfExtractor + Send + Sync>,
    ocr: Box<dyn OcrEngine + Send + Sync>,
    detector: Box<dyn HandwritingDetector + Send + Sync>,
    handwriting_ocr: Box<dyn HandwritingOcr + Send + Sync>,
}

impl TextExtractionRouter {
    pub fn new(
        pdf: Box<dyn PdfExtractor + Send + Sync>,
        ocr: Box<dyn OcrEngine + Send + Sync>,
        detector: Box<dyn HandwritingDetector + Send + Sync>,
        handwriting_ocr: Box<dyn HandwritingOcr + Send + Sync>,
    ) -> Self {
        Self {
            pdf,
            ocr,
            detector,
            handwriting_ocr,
        }
    }

    pub fn route(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<RoutedText, ExtractionError> {
        let file_kind = FileKind::from_content_type(content_type);

        let (text, handwritten, method) = match file_kind {
            FileKind::Pdf => {
                let text = self.pdf.extract_text(bytes)?;
                (text, false, ExtractionMethod::PdfText)
            }
            FileKind::Image => self.extract_image(bytes)?,
            FileKind::Unknown => {
                return Err(ExtractionError::UnsupportedFileKind(
                    content_type.unwrap_or("none").to_string(),
                ))
            }
        };

        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyExtraction);
        }

        debug!(
            file_kind = %file_kind,
            handwritten,
            method = ?method,
            chars = text.len(),
            "Text extracted"
        );

        Ok(RoutedText {
            text,
            handwritten,
            file_kind,
            method,
        })
    }

    fn extract_image(
        &self,
        bytes: &[u8],
    ) -> Result<(String, bool, ExtractionMethod), ExtractionError> {
        // Detector failures fall back to printed OCR.
        let verdict = match self.detector.detect(bytes) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Handwriting detection failed, assuming printed text");
                HandwritingVerdict::Printed
            }
        };

        match verdict {
            // No printed fallback once the detector says handwritten.
            HandwritingVerdict::Handwritten => {
                let text = self
                    .handwriting_ocr
                    .recognize(bytes)
                    .map_err(|e| ExtractionError::HandwritingOcrFailure(e.to_string()))?;
                Ok((text, true, ExtractionMethod::HandwrittenOcr))
            }
            HandwritingVerdict::Printed => {
                let prepared = prepare_for_ocr(bytes)?;
                let page = self.ocr.ocr_image(&prepared)?;
                Ok((page.text, false, ExtractionMethod::PrintedOcr))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::preprocess::test_png;
    use crate::pipeline::extraction::{
        MockHandwritingDetector, MockHandwritingOcr, MockOcrEngine, MockPdfExtractor,
        UnavailableOcr,
    };

    fn router(
        detector: MockHandwritingDetector,
        handwriting: MockHandwritingOcr,
        ocr_text: &str,
    ) -> TextExtractionRouter {
        TextExtractionRouter::new(
            Box::new(MockPdfExtractor::new("PDF LICENSE TEXT")),
            Box::new(MockOcrEngine::new(ocr_text, 0.9)),
            Box::new(detector),
            Box::new(handwriting),
        )
    }

    fn printed_router() -> TextExtractionRouter {
        router(
            MockHandwritingDetector::new(HandwritingVerdict::Printed),
            MockHandwritingOcr::new("HANDWRITTEN TEXT"),
            "PRINTED TEXT",
        )
    }

    #[test]
    fn pdf_uses_text_layer() {
        let routed = printed_router().route(b"%PDF-1.7", Some("application/pdf")).unwrap();
        assert_eq!(routed.text, "PDF LICENSE TEXT");
        assert_eq!(routed.file_kind, FileKind::Pdf);
        assert_eq!(routed.method, ExtractionMethod::PdfText);
        assert!(!routed.handwritten);
    }

    #[test]
    fn pdf_failure_is_parse_failure() {
        let r = TextExtractionRouter::new(
            Box::new(MockPdfExtractor::failing("bad xref")),
            Box::new(MockOcrEngine::new("", 0.0)),
            Box::new(MockHandwritingDetector::new(HandwritingVerdict::Printed)),
            Box::new(MockHandwritingOcr::new("")),
        );
        assert!(matches!(
            r.route(b"%PDF", Some("application/pdf")),
            Err(ExtractionError::PdfParseFailure(_))
        ));
    }

    #[test]
    fn printed_image_uses_ocr_engine() {
        let routed = printed_router().route(&test_png(24, 24), Some("image/png")).unwrap();
        assert_eq!(routed.text, "PRINTED TEXT");
        assert_eq!(routed.method, ExtractionMethod::PrintedOcr);
        assert!(!routed.handwritten);
    }

    #[test]
    fn handwritten_image_uses_handwriting_ocr() {
        let r = router(
            MockHandwritingDetector::new(HandwritingVerdict::Handwritten),
            MockHandwritingOcr::new("HANDWRITTEN TEXT"),
            "PRINTED TEXT",
        );
        let routed = r.route(&test_png(24, 24), Some("image/jpeg")).unwrap();
        assert_eq!(routed.text, "HANDWRITTEN TEXT");
        assert_eq!(routed.method, ExtractionMethod::HandwrittenOcr);
        assert!(routed.handwritten);
    }

    #[test]
    fn detector_failure_falls_back_to_printed() {
        let r = router(
            MockHandwritingDetector::unreachable(),
            MockHandwritingOcr::new("HANDWRITTEN TEXT"),
            "PRINTED TEXT",
        );
        let routed = r.route(&test_png(24, 24), Some("image/png")).unwrap();
        assert_eq!(routed.text, "PRINTED TEXT");
        assert!(!routed.handwritten);
    }

    #[test]
    fn handwriting_ocr_failure_does_not_fall_back() {
        let r = router(
            MockHandwritingDetector::new(HandwritingVerdict::Handwritten),
            MockHandwritingOcr::failing(),
            "PRINTED TEXT",
        );
        assert!(matches!(
            r.route(&test_png(24, 24), Some("image/png")),
            Err(ExtractionError::HandwritingOcrFailure(_))
        ));
    }

    #[test]
    fn undecodable_printed_image_fails() {
        let garbage = vec![0x11u8; 512];
        assert!(matches!(
            printed_router().route(&garbage, Some("image/png")),
            Err(ExtractionError::ImageDecode(_))
        ));
    }

    #[test]
    fn ocr_engine_failure_propagates() {
        let r = TextExtractionRouter::new(
            Box::new(MockPdfExtractor::new("")),
            Box::new(UnavailableOcr::new("no tessdata")),
            Box::new(MockHandwritingDetector::new(HandwritingVerdict::Printed)),
            Box::new(MockHandwritingOcr::new("")),
        );
        assert!(matches!(
            r.route(&test_png(24, 24), Some("image/png")),
            Err(ExtractionError::OcrFailure(_))
        ));
    }

    #[test]
    fn unknown_type_rejected() {
        let r = printed_router();
        assert!(matches!(
            r.route(b"hello", Some("text/plain")),
            Err(ExtractionError::UnsupportedFileKind(ref t)) if t == "text/plain"
        ));
        assert!(matches!(
            r.route(b"hello", None),
            Err(ExtractionError::UnsupportedFileKind(_))
        ));
    }

    #[test]
    fn whitespace_only_text_is_empty_extraction() {
        let r = router(
            MockHandwritingDetector::new(HandwritingVerdict::Printed),
            MockHandwritingOcr::new(""),
            "  \n\t ",
        );
        assert!(matches!(
            r.route(&test_png(24, 24), Some("image/png")),
            Err(ExtractionError::EmptyExtraction)
        ));
    }
}
