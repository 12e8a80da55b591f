use tracing::{debug, warn};

use super::confidence::{provider_confidence, HOSTED_KEY_FIELD_BOOST, LOCAL_KEY_FIELD_BOOST};
use super::fallback::extract_with_patterns;
use super::parser::parse_extraction_response;
use super::prompt::{build_hosted_prompt, build_local_prompt, hosted_system_prompt};
use super::types::{ExtractionProvider, ExtractionResult, LlmClient, Provenance};
use super::StructuringError;

/// How the provider phrases its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptStyle {
    /// Single prompt with field descriptions, no system message.
    Local,
    /// System message plus a short user message.
    Hosted,
}

/// Field extraction backed by an LLM.
///
/// Asks the model for a JSON object; when the reply is not valid JSON the
/// label patterns are run over the reply text instead.
pub struct LlmExtractionProvider {
    name: String,
    model: String,
    client: Box<dyn LlmClient + Send + Sync>,
    style: PromptStyle,
    key_field_boost: f32,
}

impl LlmExtractionProvider {
    /// Provider A: local model served by Ollama.
    pub fn local(client: Box<dyn LlmClient + Send + Sync>, model: &str) -> Self {
        Self {
            name: "ollama".to_string(),
            model: model.to_string(),
            client,
            style: PromptStyle::Local,
            key_field_boost: LOCAL_KEY_FIELD_BOOST,
        }
    }

    /// Provider B: hosted chat-completions model.
    pub fn hosted(client: Box<dyn LlmClient + Send + Sync>, model: &str) -> Self {
        Self {
            name: "openai".to_string(),
            model: model.to_string(),
            client,
            style: PromptStyle::Hosted,
            key_field_boost: HOSTED_KEY_FIELD_BOOST,
        }
    }
}

impl ExtractionProvider for LlmExtractionProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, raw_text: &str) -> Result<ExtractionResult, StructuringError> {
        let (prompt, system) = match self.style {
            PromptStyle::Local => (build_local_prompt(raw_text), String::new()),
            PromptStyle::Hosted => (build_hosted_prompt(raw_text), hosted_system_prompt()),
        };

        let response = self.client.generate(&self.model, &prompt, &system)?;

        let mut result = ExtractionResult::new(
            Provenance {
                provider: self.name.clone(),
                model: self.model.clone(),
            },
            true,
        );

        if let Err(e) = parse_extraction_response(&response, &mut result) {
            warn!(provider = %self.name, error = %e, "Model reply not parseable, using label patterns");
            extract_with_patterns(&response, &mut result);
        }

        result.set_confidence(provider_confidence(&result, self.key_field_boost));
        debug!(
            provider = %self.name,
            fields = result.len(),
            confidence = result.confidence(),
            "Provider extraction complete"
        );
        Ok(result)
    }
}

/// Offline extraction: label patterns straight over the OCR text.
/// Stands in for the hosted model when no API key is configured.
pub struct PatternExtractionProvider;

impl PatternExtractionProvider {
    pub const MODEL: &'static str = "local-patterns";
}

impl ExtractionProvider for PatternExtractionProvider {
    fn name(&self) -> &str {
        "pattern"
    }

    fn extract(&self, raw_text: &str) -> Result<ExtractionResult, StructuringError> {
        let mut result = ExtractionResult::new(
            Provenance {
                provider: self.name().to_string(),
                model: Self::MODEL.to_string(),
            },
            true,
        );
        extract_with_patterns(raw_text, &mut result);
        result.set_confidence(provider_confidence(&result, HOSTED_KEY_FIELD_BOOST));
        Ok(result)
    }
}
