//! Application constants and pipeline configuration.
//!
//! Every endpoint, model and timeout the pipeline uses can be overridden
//! through `IDSCAN_*` environment variables. Unset variables keep the
//! defaults below; malformed numbers are rejected.

use serde::Serialize;
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "idscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,idscan_lib=debug,reqwest=warn,hyper=warn"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Endpoints, models and limits for one pipeline instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    /// Base URL of the handwriting detector (`POST /detect`).
    pub handwriting_detector_url: String,
    /// Base URL of the handwriting OCR service (`POST /ocr`).
    pub handwriting_ocr_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    /// Base URL of the OpenAI-compatible API.
    pub hosted_api_url: String,
    pub hosted_model: String,
    /// Without a key the secondary provider runs offline label patterns.
    #[serde(skip_serializing)]
    pub hosted_api_key: Option<String>,
    /// Tessdata directory for printed OCR. Searched when unset.
    pub tessdata_dir: Option<String>,
    pub detection_timeout_secs: u64,
    pub ocr_timeout_secs: u64,
    pub llm_timeout_secs: u64,
    /// Worker threads for batch processing.
    pub batch_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            handwriting_detector_url: "http://localhost:8002".into(),
            handwriting_ocr_url: "http://localhost:8001".into(),
            ollama_url: "http://localhost:11434".into(),
            ollama_model: "llama2:7b".into(),
            hosted_api_url: "https://api.openai.com".into(),
            hosted_model: "gpt-4".into(),
            hosted_api_key: None,
            tessdata_dir: None,
            detection_timeout_secs: 10,
            ocr_timeout_secs: 60,
            llm_timeout_secs: 120,
            batch_workers: default_workers(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

// ═══════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════

impl PipelineConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("IDSCAN_HANDWRITING_DETECTOR_URL") {
            config.handwriting_detector_url = v;
        }
        if let Some(v) = get("IDSCAN_HANDWRITING_OCR_URL") {
            config.handwriting_ocr_url = v;
        }
        if let Some(v) = get("IDSCAN_OLLAMA_URL") {
            config.ollama_url = v;
        }
        if let Some(v) = get("IDSCAN_OLLAMA_MODEL") {
            config.ollama_model = v;
        }
        if let Some(v) = get("IDSCAN_HOSTED_API_URL") {
            config.hosted_api_url = v;
        }
        if let Some(v) = get("IDSCAN_HOSTED_MODEL") {
            config.hosted_model = v;
        }
        config.hosted_api_key = get("IDSCAN_HOSTED_API_KEY").or_else(|| get("OPENAI_API_KEY"));
        config.tessdata_dir = get("IDSCAN_TESSDATA_DIR").or_else(|| get("TESSDATA_PREFIX"));

        if let Some(v) = get("IDSCAN_DETECTION_TIMEOUT_SECS") {
            config.detection_timeout_secs = parse_positive("IDSCAN_DETECTION_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("IDSCAN_OCR_TIMEOUT_SECS") {
            config.ocr_timeout_secs = parse_positive("IDSCAN_OCR_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("IDSCAN_LLM_TIMEOUT_SECS") {
            config.llm_timeout_secs = parse_positive("IDSCAN_LLM_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("IDSCAN_BATCH_WORKERS") {
            config.batch_workers = parse_positive("IDSCAN_BATCH_WORKERS", &v)?;
        }

        Ok(config)
    }
}

fn parse_positive<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
    T::Err: std::fmt::Display,
{
    let parsed: T = value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if parsed == T::default() {
        return Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(parsed)
}
