pub mod types;
pub mod preprocess;
pub mod pdfium;
pub mod ocr;
pub mod handwriting;
pub mod language_detect;
pub mod router;

pub use types::*;
pub use preprocess::*;
pub use pdfium::*;
pub use ocr::*;
pub use handwriting::*;
pub use language_detect::*;
pub use router::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileKind(String),

    #[error("No text could be extracted from the document")]
    EmptyExtraction,

    #[error("Handwriting OCR failed: {0}")]
    HandwritingOcrFailure(String),

    #[error("OCR processing failed: {0}")]
    OcrFailure(String),

    #[error("PDF parsing failed: {0}")]
    PdfParseFailure(String),

    #[error("Image decoding failed: {0}")]
    ImageDecode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the remote handwriting services.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed service response: {0}")]
    MalformedResponse(String),
}
