//! Completeness scoring and status classification.
//!
//! Both operate on any `FieldSource`, so a provider result and the final
//! record are judged by the same rules.

use crate::models::{FieldSource, LicenseField, ProcessingStatus};

/// Below this completeness a record always needs manual review.
pub const MIN_CONFIDENCE: f32 = 0.5;

/// Fraction of the key fields that are present and non-blank.
pub fn score(source: &impl FieldSource) -> f32 {
    let present = LicenseField::KEY_SET
        .iter()
        .filter(|f| source.has_value(**f))
        .count();
    present as f32 / LicenseField::KEY_SET.len() as f32
}

/// Verdict for a finished extraction. Never `Failed` or `Processing`.
pub fn classify(score: f32, source: &impl FieldSource) -> ProcessingStatus {
    let mandatory_present = LicenseField::MANDATORY
        .iter()
        .all(|f| source.has_value(*f));

    if score < MIN_CONFIDENCE || !mandatory_present {
        ProcessingStatus::ManualReviewRequired
    } else {
        ProcessingStatus::Processed
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct Present(HashSet<LicenseField>);

    impl Present {
        fn of(fields: &[LicenseField]) -> Self {
            Self(fields.iter().copied().collect())
        }
    }

    impl FieldSource for Present {
        fn has_value(&self, field: LicenseField) -> bool {
            self.0.contains(&field)
        }
    }

    #[test]
    fn all_key_fields_score_one() {
        assert_eq!(score(&Present::of(&LicenseField::KEY_SET)), 1.0);
    }

    #[test]
    fn no_fields_score_zero() {
        assert_eq!(score(&Present::of(&[])), 0.0);
    }

    #[test]
    fn non_key_fields_do_not_count() {
        let source = Present::of(&[
            LicenseField::MiddleName,
            LicenseField::LicenseClass,
            LicenseField::Restrictions,
            LicenseField::Endorsements,
            LicenseField::IssuingAuthority,
        ]);
        assert_eq!(score(&source), 0.0);
    }

    #[test]
    fn score_is_monotone() {
        let mut fields = Vec::new();
        let mut last = score(&Present::of(&fields));
        for field in LicenseField::KEY_SET {
            fields.push(field);
            let next = score(&Present::of(&fields));
            assert!(next > last);
            last = next;
        }
        assert!((last - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn low_score_needs_review() {
        let source = Present::of(&LicenseField::MANDATORY);
        assert_eq!(classify(0.4, &source), ProcessingStatus::ManualReviewRequired);
    }

    #[test]
    fn missing_mandatory_needs_review() {
        let source = Present::of(&[LicenseField::FirstName, LicenseField::LastName]);
        assert_eq!(classify(0.9, &source), ProcessingStatus::ManualReviewRequired);
    }

    #[test]
    fn complete_record_is_processed() {
        let source = Present::of(&LicenseField::MANDATORY);
        assert_eq!(classify(0.8, &source), ProcessingStatus::Processed);
        assert_eq!(classify(MIN_CONFIDENCE, &source), ProcessingStatus::Processed);
    }
}
