use tracing::{info, warn};
use uuid::Uuid;

use super::types::{ExtractionProvider, ExtractionResult};
use crate::pipeline::scoring::MIN_CONFIDENCE;

/// Runs extraction providers in order and keeps the most confident result.
///
/// A provider is consulted only while the best result so far is empty or
/// below `MIN_CONFIDENCE`. A later result replaces the best only when its
/// confidence is strictly higher, so ties keep the earlier provider.
pub struct ProviderChain {
    providers: Vec<Box<dyn ExtractionProvider + Send + Sync>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn ExtractionProvider + Send + Sync>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Never fails: provider errors count as empty results.
    pub fn extract(&self, document_id: &Uuid, raw_text: &str) -> ExtractionResult {
        let _span = tracing::info_span!("provider_chain", document_id = %document_id).entered();
        let mut best = ExtractionResult::empty();

        for provider in &self.providers {
            if is_sufficient(&best) {
                break;
            }

            let candidate = match provider.extract(raw_text) {
                Ok(result) => result,
                Err(e) => {
                    warn!(
                        document_id = %document_id,
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, treating as empty"
                    );
                    continue;
                }
            };

            info!(
                document_id = %document_id,
                provider = provider.name(),
                fields = candidate.len(),
                confidence = candidate.confidence(),
                "Provider result"
            );

            best = arbitrate(best, candidate);
        }

        best
    }
}

/// Pick between the current best and a later provider's result.
/// Empty results never win; on equal confidence the current best stays.
pub fn arbitrate(best: ExtractionResult, candidate: ExtractionResult) -> ExtractionResult {
    if candidate.is_empty() {
        return best;
    }
    if best.is_empty() || candidate.confidence() > best.confidence() {
        candidate
    } else {
        best
    }
}

fn is_sufficient(result: &ExtractionResult) -> bool {
    !result.is_empty() && result.confidence() >= MIN_CONFIDENCE
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::models::{FieldValue, LicenseField};
    use crate::pipeline::structuring::{Provenance, StructuringError};

    /// Returns a fixed result and counts invocations.
    struct FixedProvider {
        name: &'static str,
        outcome: Option<(usize, f32)>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedProvider {
        fn new(name: &'static str, fields: usize, confidence: f32) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    outcome: Some((fields, confidence)),
                    calls: calls.clone(),
                },
                calls,
            )
        }

        fn failing(name: &'static str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    outcome: None,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl ExtractionProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn extract(&self, _raw_text: &str) -> Result<ExtractionResult, StructuringError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (fields, confidence) = self
                .outcome
                .ok_or_else(|| StructuringError::Connection("down".into()))?;
            let mut result = ExtractionResult::new(
                Provenance {
                    provider: self.name.into(),
                    model: "m".into(),
                },
                true,
            );
            for field in LicenseField::ALL.iter().take(fields) {
                result.insert(*field, FieldValue::Text(self.name.into()));
            }
            result.set_confidence(confidence);
            Ok(result)
        }
    }

    fn chain(providers: Vec<FixedProvider>) -> ProviderChain {
        ProviderChain::new(
            providers
                .into_iter()
                .map(|p| Box::new(p) as Box<dyn ExtractionProvider + Send + Sync>)
                .collect(),
        )
    }

    fn winner(result: &ExtractionResult) -> &str {
        &result.provenance().unwrap().provider
    }

    #[test]
    fn confident_first_provider_short_circuits() {
        let (a, _) = FixedProvider::new("a", 5, 0.9);
        let (b, b_calls) = FixedProvider::new("b", 8, 0.95);
        let result = chain(vec![a, b]).extract(&Uuid::nil(), "text");
        assert_eq!(winner(&result), "a");
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn higher_confidence_fallback_wins() {
        let (a, _) = FixedProvider::new("a", 3, 0.4);
        let (b, _) = FixedProvider::new("b", 8, 0.95);
        let result = chain(vec![a, b]).extract(&Uuid::nil(), "text");
        assert_eq!(winner(&result), "b");
        assert!((result.confidence() - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn tie_keeps_earlier_provider() {
        let (a, _) = FixedProvider::new("a", 3, 0.4);
        let (b, _) = FixedProvider::new("b", 4, 0.4);
        let result = chain(vec![a, b]).extract(&Uuid::nil(), "text");
        assert_eq!(winner(&result), "a");
    }

    #[test]
    fn lower_confidence_fallback_loses() {
        let (a, _) = FixedProvider::new("a", 3, 0.45);
        let (b, _) = FixedProvider::new("b", 2, 0.3);
        let result = chain(vec![a, b]).extract(&Uuid::nil(), "text");
        assert_eq!(winner(&result), "a");
    }

    #[test]
    fn empty_first_result_triggers_fallback() {
        let (a, _) = FixedProvider::new("a", 0, 0.0);
        let (b, _) = FixedProvider::new("b", 2, 0.1);
        let result = chain(vec![a, b]).extract(&Uuid::nil(), "text");
        assert_eq!(winner(&result), "b");
    }

    #[test]
    fn failing_provider_treated_as_empty() {
        let (a, a_calls) = FixedProvider::failing("a");
        let (b, _) = FixedProvider::new("b", 6, 0.7);
        let result = chain(vec![a, b]).extract(&Uuid::nil(), "text");
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(winner(&result), "b");
    }

    #[test]
    fn all_empty_yields_empty_result() {
        let (a, _) = FixedProvider::failing("a");
        let (b, _) = FixedProvider::new("b", 0, 0.0);
        let result = chain(vec![a, b]).extract(&Uuid::nil(), "text");
        assert!(result.is_empty());
        assert_eq!(result.confidence(), 0.0);
        assert!(!result.ai_processed());
        assert!(result.provenance().is_none());
    }

    #[test]
    fn arbitration_prefers_strictly_higher_confidence() {
        let (a, _) = FixedProvider::new("a", 5, 0.9);
        let (b, _) = FixedProvider::new("b", 5, 0.95);
        let picked = arbitrate(a.extract("").unwrap(), b.extract("").unwrap());
        assert_eq!(winner(&picked), "b");

        let (a, _) = FixedProvider::new("a", 5, 0.9);
        let (b, _) = FixedProvider::new("b", 7, 0.9);
        let picked = arbitrate(a.extract("").unwrap(), b.extract("").unwrap());
        assert_eq!(winner(&picked), "a");
    }

    #[test]
    fn arbitration_ignores_empty_candidate() {
        let (a, _) = FixedProvider::new("a", 2, 0.1);
        let picked = arbitrate(a.extract("").unwrap(), ExtractionResult::empty());
        assert_eq!(winner(&picked), "a");
    }

    #[test]
    fn names_listed_in_order() {
        let (a, _) = FixedProvider::new("a", 0, 0.0);
        let (b, _) = FixedProvider::new("b", 0, 0.0);
        assert_eq!(chain(vec![a, b]).provider_names(), vec!["a", "b"]);
    }
}
