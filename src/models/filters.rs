use chrono::NaiveDate;

use super::enums::ProcessingStatus;
use super::license::StructuredRecord;

/// Query over stored records. Unset criteria match everything.
#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    /// Case-insensitive match on the issuing state.
    pub state: Option<String>,
    pub status: Option<ProcessingStatus>,
    /// Case-insensitive substring of first, middle or last name.
    pub name_contains: Option<String>,
    /// Records whose expiry date is strictly before this date.
    pub expired_before: Option<NaiveDate>,
    /// Records whose completeness score is strictly below this value.
    pub confidence_below: Option<f32>,
    /// Inclusive provider-confidence range.
    pub ai_confidence_range: Option<(f32, f32)>,
    pub ai_processed_only: bool,
    pub handwritten_only: bool,
}

impl RecordFilter {
    pub fn matches(&self, record: &StructuredRecord) -> bool {
        if let Some(ref state) = self.state {
            if !record.state.eq_ignore_ascii_case(state.trim()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.processing_status != status {
                return false;
            }
        }
        if let Some(ref needle) = self.name_contains {
            let needle = needle.to_lowercase();
            let hit = [&record.first_name, &record.middle_name, &record.last_name]
                .iter()
                .any(|n| n.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(cutoff) = self.expired_before {
            if !record.expiry_date.is_some_and(|d| d < cutoff) {
                return false;
            }
        }
        if let Some(threshold) = self.confidence_below {
            if record.confidence_score >= threshold {
                return false;
            }
        }
        if let Some((low, high)) = self.ai_confidence_range {
            if record.ai_confidence < low || record.ai_confidence > high {
                return false;
            }
        }
        if self.ai_processed_only && !record.ai_processed {
            return false;
        }
        if self.handwritten_only && !record.handwritten {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::FileKind;

    fn record() -> StructuredRecord {
        let mut r = StructuredRecord::new(
            Uuid::new_v4(),
            "dl.png",
            FileKind::Image,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        r.first_name = "Jane".into();
        r.last_name = "Doe".into();
        r.state = "TX".into();
        r.expiry_date = NaiveDate::from_ymd_opt(2023, 6, 1);
        r.confidence_score = 0.4;
        r.ai_confidence = 0.6;
        r.ai_processed = true;
        r.processing_status = ProcessingStatus::ManualReviewRequired;
        r
    }

    #[test]
    fn default_filter_matches_everything() {
        assert!(RecordFilter::default().matches(&record()));
    }

    #[test]
    fn state_is_case_insensitive() {
        let filter = RecordFilter {
            state: Some("tx".into()),
            ..Default::default()
        };
        assert!(filter.matches(&record()));
        let filter = RecordFilter {
            state: Some("CA".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&record()));
    }

    #[test]
    fn name_search_covers_all_name_parts() {
        let filter = RecordFilter {
            name_contains: Some("DO".into()),
            ..Default::default()
        };
        assert!(filter.matches(&record()));
    }

    #[test]
    fn expiry_and_confidence_criteria() {
        let r = record();
        let expired = RecordFilter {
            expired_before: NaiveDate::from_ymd_opt(2024, 1, 1),
            confidence_below: Some(0.5),
            ai_confidence_range: Some((0.5, 0.7)),
            ai_processed_only: true,
            ..Default::default()
        };
        assert!(expired.matches(&r));

        let not_expired = RecordFilter {
            expired_before: NaiveDate::from_ymd_opt(2020, 1, 1),
            ..Default::default()
        };
        assert!(!not_expired.matches(&r));
    }

    #[test]
    fn missing_expiry_never_expired() {
        let mut r = record();
        r.expiry_date = None;
        let filter = RecordFilter {
            expired_before: NaiveDate::from_ymd_opt(2100, 1, 1),
            ..Default::default()
        };
        assert!(!filter.matches(&r));
    }

    #[test]
    fn handwritten_only_excludes_printed() {
        let filter = RecordFilter {
            handwritten_only: true,
            ..Default::default()
        };
        assert!(!filter.matches(&record()));
    }
}
