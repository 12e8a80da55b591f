use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StructuringError;
use crate::models::{FieldSource, FieldValue, LicenseField};

/// Which provider and model produced a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub provider: String,
    pub model: String,
}

/// Fields one provider pulled out of the OCR text.
///
/// Blank strings and the literal `"null"` are never stored, so an absent
/// field is always an absent map entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    fields: BTreeMap<LicenseField, FieldValue>,
    confidence: f32,
    ai_processed: bool,
    provenance: Option<Provenance>,
}

impl ExtractionResult {
    pub fn new(provenance: Provenance, ai_processed: bool) -> Self {
        Self {
            fields: BTreeMap::new(),
            confidence: 0.0,
            ai_processed,
            provenance: Some(provenance),
        }
    }

    /// No fields, confidence 0.0, not AI-processed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store a value unless it is blank or a textual null.
    pub fn insert(&mut self, field: LicenseField, value: FieldValue) {
        if value.is_blank() || is_null_text(&value) {
            return;
        }
        let value = match value {
            FieldValue::Text(s) => FieldValue::Text(s.trim().to_string()),
            date => date,
        };
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: LicenseField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (LicenseField, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Clamped to [0, 1].
    pub fn set_confidence(&mut self, confidence: f32) {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
    }

    pub fn ai_processed(&self) -> bool {
        self.ai_processed
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }
}

fn is_null_text(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Text(s) if s.trim().eq_ignore_ascii_case("null"))
}

impl FieldSource for ExtractionResult {
    fn has_value(&self, field: LicenseField) -> bool {
        self.fields.get(&field).is_some_and(|v| !v.is_blank())
    }
}

/// One way of turning OCR text into license fields.
pub trait ExtractionProvider {
    fn name(&self) -> &str;

    fn extract(&self, raw_text: &str) -> Result<ExtractionResult, StructuringError>;
}

/// LLM backend abstraction (allows mocking for tests)
pub trait LlmClient {
    /// Run one completion. `system` may be empty.
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, StructuringError>;
}
