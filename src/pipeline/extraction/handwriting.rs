//! Clients for the remote handwriting services.
//!
//! Both services take the raw upload as a multipart `file` field:
//! - the detector answers `{"result": "handwritten" | "printed"}`
//! - the handwriting OCR answers `{"text": "..."}`

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::types::{HandwritingDetector, HandwritingOcr, HandwritingVerdict};
use super::DetectionError;

/// Multipart upload shared by both services.
struct ServiceClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl ServiceClient {
    fn new(base_url: &str, timeout_secs: u64) -> Result<Self, DetectionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DetectionError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    fn post_file<T: DeserializeOwned>(
        &self,
        path: &str,
        image_bytes: &[u8],
    ) -> Result<T, DetectionError> {
        let url = format!("{}{path}", self.base_url);
        let part = Part::bytes(image_bytes.to_vec()).file_name("upload");
        let form = Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().map_err(|e| {
            if e.is_timeout() {
                DetectionError::Transport(format!("Request timed out after {}s", self.timeout_secs))
            } else if e.is_connect() {
                DetectionError::Transport(format!("Service not reachable at {}", self.base_url))
            } else {
                DetectionError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DetectionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| DetectionError::MalformedResponse(e.to_string()))
    }
}

// ───────────────────────────────────────────────────────────
// Detector
// ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DetectResponse {
    result: String,
}

/// Handwriting detector reached over HTTP (`POST {base}/detect`).
pub struct HttpHandwritingDetector {
    inner: ServiceClient,
}

impl HttpHandwritingDetector {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, DetectionError> {
        Ok(Self {
            inner: ServiceClient::new(base_url, timeout_secs)?,
        })
    }
}

impl HandwritingDetector for HttpHandwritingDetector {
    fn detect(&self, image_bytes: &[u8]) -> Result<HandwritingVerdict, DetectionError> {
        let parsed: DetectResponse = self.inner.post_file("/detect", image_bytes)?;
        if parsed.result.trim().eq_ignore_ascii_case("handwritten") {
            Ok(HandwritingVerdict::Handwritten)
        } else {
            Ok(HandwritingVerdict::Printed)
        }
    }
}

// ───────────────────────────────────────────────────────────
// Handwriting OCR
// ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct OcrResponse {
    text: String,
}

/// Handwriting OCR reached over HTTP (`POST {base}/ocr`).
pub struct HttpHandwritingOcr {
    inner: ServiceClient,
}

impl HttpHandwritingOcr {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, DetectionError> {
        Ok(Self {
            inner: ServiceClient::new(base_url, timeout_secs)?,
        })
    }
}

impl HandwritingOcr for HttpHandwritingOcr {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, DetectionError> {
        let parsed: OcrResponse = self.inner.post_file("/ocr", image_bytes)?;
        Ok(parsed.text)
    }
}

// ───────────────────────────────────────────────────────────
// Mocks
// ───────────────────────────────────────────────────────────

/// Mock detector returning a fixed verdict or a transport failure.
pub struct MockHandwritingDetector {
    verdict: Option<HandwritingVerdict>,
}

impl MockHandwritingDetector {
    pub fn new(verdict: HandwritingVerdict) -> Self {
        Self {
            verdict: Some(verdict),
        }
    }

    pub fn unreachable() -> Self {
        Self { verdict: None }
    }
}

impl HandwritingDetector for MockHandwritingDetector {
    fn detect(&self, _image_bytes: &[u8]) -> Result<HandwritingVerdict, DetectionError> {
        self.verdict
            .ok_or_else(|| DetectionError::Transport("mock detector unreachable".into()))
    }
}

/// Mock handwriting OCR returning fixed text or a failure.
pub struct MockHandwritingOcr {
    text: Option<String>,
}

impl MockHandwritingOcr {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { text: None }
    }
}

impl HandwritingOcr for MockHandwritingOcr {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, DetectionError> {
        self.text.clone().ok_or_else(|| DetectionError::Status {
            status: 500,
            body: "mock OCR failure".into(),
        })
    }
}
