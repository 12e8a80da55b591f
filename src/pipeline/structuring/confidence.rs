use super::types::ExtractionResult;
use crate::models::{FieldSource, LicenseField};

/// Boost per mandatory field for the local model.
pub const LOCAL_KEY_FIELD_BOOST: f32 = 0.1;

/// The hosted model is scored on coverage alone.
pub const HOSTED_KEY_FIELD_BOOST: f32 = 0.0;

/// Provider self-assessment: share of all fields filled, plus a boost for
/// each mandatory field present. Capped at 1.0.
pub fn provider_confidence(result: &ExtractionResult, key_field_boost: f32) -> f32 {
    let coverage = result.len() as f32 / LicenseField::ALL.len() as f32;
    let boost = LicenseField::MANDATORY
        .iter()
        .filter(|f| result.has_value(**f))
        .count() as f32
        * key_field_boost;
    (coverage + boost).min(1.0)
}
