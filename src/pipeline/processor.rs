//! Document processing orchestrator.
//!
//! Single entry point that drives the full pipeline for one upload:
//! route → extract text → provider chain → normalize → score → classify.
//!
//! Uses trait-based DI for all engines (OcrEngine, LlmClient, etc.)
//! so the orchestrator remains fully testable with mock implementations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::models::{ProcessingStatus, RawDocument, StructuredRecord};
use crate::pipeline::extraction::{
    DetectionError, HttpHandwritingDetector, HttpHandwritingOcr, LanguageDetector, OcrEngine,
    PdfiumTextExtractor, TextExtractionRouter, UnavailableOcr, WhatlangDetector,
};
use crate::pipeline::normalize::parse_date;
use crate::pipeline::scoring::{classify, score};
use crate::pipeline::structuring::{
    ExtractionProvider, ExtractionResult, LlmExtractionProvider, OllamaClient, OpenAiClient,
    PatternExtractionProvider, ProviderChain, StructuringError,
};
use crate::store::RecordSink;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors building a production pipeline. Processing itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Handwriting service client: {0}")]
    Detection(#[from] DetectionError),

    #[error("Model client: {0}")]
    Structuring(#[from] StructuringError),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// The record produced for one upload, plus why it failed if it did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOutcome {
    pub record: StructuredRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Turns a `RawDocument` into exactly one terminal `StructuredRecord`.
///
/// Holds only shareable trait objects, so one instance can serve many
/// threads at once.
pub struct DocumentPipeline {
    router: TextExtractionRouter,
    chain: ProviderChain,
    language: Box<dyn LanguageDetector + Send + Sync>,
    sink: Option<Arc<dyn RecordSink + Send + Sync>>,
}

impl DocumentPipeline {
    pub fn new(router: TextExtractionRouter, chain: ProviderChain) -> Self {
        Self {
            router,
            chain,
            language: Box::new(WhatlangDetector),
            sink: None,
        }
    }

    pub fn with_language_detector(
        mut self,
        language: Box<dyn LanguageDetector + Send + Sync>,
    ) -> Self {
        self.language = language;
        self
    }

    /// Every finished record, failed ones included, is saved here once.
    pub fn with_sink(mut self, sink: Arc<dyn RecordSink + Send + Sync>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run the full pipeline. Never returns an error: failures become a
    /// `FAILED` record with the reason alongside.
    pub fn process(&self, document: &RawDocument) -> ProcessingOutcome {
        let document_id = Uuid::new_v4();
        let _span = tracing::info_span!(
            "process_document",
            document_id = %document_id,
            filename = %document.filename()
        )
        .entered();

        let mut record = StructuredRecord::new(
            document_id,
            document.filename(),
            document.file_kind(),
            Local::now().date_naive(),
        );

        // Step 1: Route and extract text
        let routed = match self.router.route(document.bytes(), document.content_type()) {
            Ok(routed) => routed,
            Err(e) => {
                warn!(document_id = %document_id, error = %e, "Text extraction failed");
                record.processing_status = ProcessingStatus::Failed;
                return self.finish(record, Some(e.to_string()));
            }
        };
        record.handwritten = routed.handwritten;

        // Step 2: Language detection (informational)
        if let Some(lang) = self.language.detect_language(&routed.text) {
            info!(
                document_id = %document_id,
                language = lang.code,
                confidence = lang.confidence,
                reliable = lang.reliable,
                "Detected document language"
            );
        }

        // Step 3: Provider chain
        let merged = self.chain.extract(&document_id, &routed.text);

        // Step 4-5: Normalize into the record
        apply_extraction(&mut record, &merged);

        // Step 6-7: Score and classify the normalized record
        record.confidence_score = score(&record);
        record.processing_status = classify(record.confidence_score, &record);

        info!(
            document_id = %document_id,
            method = ?routed.method,
            handwritten = record.handwritten,
            ai_confidence = record.ai_confidence,
            confidence = record.confidence_score,
            status = %record.processing_status,
            "Document processed"
        );

        self.finish(record, None)
    }

    /// Process several documents on at most `workers` threads.
    /// Output order matches input order.
    pub fn process_batch(&self, documents: &[RawDocument], workers: usize) -> Vec<ProcessingOutcome> {
        let workers = workers.clamp(1, documents.len().max(1));
        let next = AtomicUsize::new(0);

        let mut indexed: Vec<(usize, ProcessingOutcome)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::SeqCst);
                            let Some(document) = documents.get(index) else {
                                break;
                            };
                            done.push((index, self.process(document)));
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, outcome)| outcome).collect()
    }

    fn finish(&self, record: StructuredRecord, failure_reason: Option<String>) -> ProcessingOutcome {
        if let Some(ref sink) = self.sink {
            match sink.save(&record) {
                Ok(stored) => info!(document_id = %record.id, record_id = %stored.id, "Record saved"),
                Err(e) => warn!(document_id = %record.id, error = %e, "Failed to save record"),
            }
        }
        ProcessingOutcome {
            record,
            failure_reason,
        }
    }
}

/// Copy the merged provider result into the record. Date fields go
/// through the normalizer; text is copied verbatim.
fn apply_extraction(record: &mut StructuredRecord, merged: &ExtractionResult) {
    for (field, value) in merged.fields() {
        if field.is_date() {
            record.set_date(field, parse_date(value));
        } else {
            record.set_text(field, value.to_text());
        }
    }
    record.ai_processed = merged.ai_processed();
    record.ai_confidence = merged.confidence();
    record.provider = merged
        .provenance()
        .map(|p| format!("{}/{}", p.provider, p.model));
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build a `DocumentPipeline` with production implementations.
///
/// - OCR: `BundledTesseract` (feature-gated) or `UnavailableOcr`
/// - PDF: `PdfiumTextExtractor`
/// - Handwriting: HTTP detector and OCR services
/// - Providers: Ollama, then the hosted model or offline label patterns
pub fn build_pipeline(config: &PipelineConfig) -> Result<DocumentPipeline, ProcessingError> {
    if !PdfiumTextExtractor::is_available() {
        warn!("PDFium library not found, PDF uploads will fail");
    }

    let router = TextExtractionRouter::new(
        Box::new(PdfiumTextExtractor::new()),
        build_ocr_engine(config),
        Box::new(HttpHandwritingDetector::new(
            &config.handwriting_detector_url,
            config.detection_timeout_secs,
        )?),
        Box::new(HttpHandwritingOcr::new(
            &config.handwriting_ocr_url,
            config.ocr_timeout_secs,
        )?),
    );

    let local = OllamaClient::new(&config.ollama_url, config.llm_timeout_secs)?;
    let mut providers: Vec<Box<dyn ExtractionProvider + Send + Sync>> = vec![Box::new(
        LlmExtractionProvider::local(Box::new(local), &config.ollama_model),
    )];

    match config.hosted_api_key.as_deref() {
        Some(key) => {
            let hosted = OpenAiClient::new(&config.hosted_api_url, key, config.llm_timeout_secs)?;
            providers.push(Box::new(LlmExtractionProvider::hosted(
                Box::new(hosted),
                &config.hosted_model,
            )));
        }
        None => {
            info!("No hosted model API key, secondary provider uses label patterns");
            providers.push(Box::new(PatternExtractionProvider));
        }
    }

    let chain = ProviderChain::new(providers);
    info!(providers = ?chain.provider_names(), model = %config.ollama_model, "Document pipeline ready");

    Ok(DocumentPipeline::new(router, chain))
}

/// Build the OCR engine, respecting feature flags.
fn build_ocr_engine(config: &PipelineConfig) -> Box<dyn OcrEngine + Send + Sync> {
    #[cfg(feature = "ocr")]
    {
        if let Some(tessdata) = find_tessdata_dir(config.tessdata_dir.as_deref()) {
            match crate::pipeline::extraction::BundledTesseract::new(&tessdata) {
                Ok(engine) => {
                    info!(tessdata = %tessdata.display(), "Tesseract OCR initialized");
                    return Box::new(engine);
                }
                Err(e) => warn!(error = %e, "Tesseract initialization failed"),
            }
        } else {
            warn!("Tesseract data not found, printed images will not be OCR'd");
        }
    }
    #[cfg(not(feature = "ocr"))]
    let _ = config;

    Box::new(UnavailableOcr::new(
        "Printed-text OCR unavailable. Build with the `ocr` feature and install tessdata",
    ))
}

/// Locate tessdata directory from configuration or system paths.
#[cfg(feature = "ocr")]
fn find_tessdata_dir(configured: Option<&str>) -> Option<std::path::PathBuf> {
    use std::path::PathBuf;

    if let Some(path) = configured {
        let p = PathBuf::from(path);
        if p.join("eng.traineddata").exists() {
            return Some(p);
        }
        warn!(path = %path, "Configured tessdata directory has no eng.traineddata");
    }

    let candidates = [
        "/usr/share/tesseract-ocr/5/tessdata",
        "/usr/share/tesseract-ocr/4.00/tessdata",
        "/usr/share/tessdata",
        "/usr/local/share/tessdata",
        "/opt/homebrew/share/tessdata",
    ];

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.join("eng.traineddata").exists())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
