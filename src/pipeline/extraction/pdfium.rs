//! PDF text-layer extraction via Google PDFium.
//!
//! `PdfiumTextExtractor` is stateless (`Send + Sync`). Each operation binds
//! a fresh `Pdfium` instance because the upstream type is `!Send`.
//! The OS caches `dlopen`/`LoadLibrary` calls, so repeat loads are near-free.

use pdfium_render::prelude::*;
use tracing::debug;

use super::types::PdfExtractor;
use super::ExtractionError;

/// Reads the embedded text layer of a PDF with PDFium.
pub struct PdfiumTextExtractor;

impl PdfiumTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Whether the PDFium library can be bound on this host.
    pub fn is_available() -> bool {
        load_pdfium().is_ok()
    }
}

impl Default for PdfiumTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdfiumTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(map_load_error)?;

        let mut pages = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let text = page.text().map_err(|e| {
                ExtractionError::PdfParseFailure(format!("Page {}: {e}", index + 1))
            })?;
            pages.push(text.all());
        }

        debug!(page_count = pages.len(), "Extracted PDF text layer");
        Ok(pages.join("\n"))
    }
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path)
/// 2. Alongside the running executable, or in `<exe_dir>/pdfium/lib`
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            ExtractionError::PdfParseFailure(format!("Failed to load PDFium from {path}: {e}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let candidates = [
                exe_dir.to_path_buf(),
                exe_dir.join("pdfium").join("lib"),
                exe_dir.join("..").join("lib"),
            ];

            for dir in &candidates {
                let lib_path = Pdfium::pdfium_platform_library_name_at_path(
                    dir.to_string_lossy().as_ref(),
                );
                if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                    debug!(dir = %dir.display(), "Loaded PDFium from candidate directory");
                    return Ok(Pdfium::new(bindings));
                }
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        ExtractionError::PdfParseFailure(format!(
            "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

/// Map PDF load errors, calling out encrypted files.
fn map_load_error(e: PdfiumError) -> ExtractionError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("password") || lower.contains("encrypt") {
        ExtractionError::PdfParseFailure("PDF is password-protected".into())
    } else {
        ExtractionError::PdfParseFailure(format!("Failed to load PDF: {msg}"))
    }
}

/// Mock PDF extractor for unit testing without PDFium.
pub struct MockPdfExtractor {
    result: Result<String, String>,
}

impl MockPdfExtractor {
    pub fn new(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
        }
    }
}

impl PdfExtractor for MockPdfExtractor {
    fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        self.result
            .clone()
            .map_err(ExtractionError::PdfParseFailure)
    }
}
