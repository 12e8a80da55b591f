//! Label-driven regex extraction.
//!
//! Used when a model response is not parseable JSON, and directly over OCR
//! text by the offline provider. Each row binds one field to a pattern and
//! the capture group holding the value. Rows for a field are tried in
//! order; the first non-blank capture wins.

use std::sync::LazyLock;

use regex::Regex;

use super::types::ExtractionResult;
use crate::models::{FieldValue, LicenseField};
use crate::pipeline::normalize::parse_date_str;

/// A compiled pattern bound to the field it fills.
struct FieldPattern {
    field: LicenseField,
    regex: Regex,
    group: usize,
}

/// Label separator: optional colon or dash between horizontal whitespace.
const SEP: &str = r"[ \t]*[:\-#]?[ \t]*";

/// Date value shapes accepted after a date label.
const DATE_VALUE: &str = r"(\d{4}-\d{2}-\d{2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4})";

/// License number: must carry a digit, so label words like `CLASS` never match.
const LICENSE_VALUE: &str = r"([A-Z]{0,4}\d[A-Z0-9\-]{1,19})";

/// Name token: letters plus apostrophes and hyphens.
const NAME_VALUE: &str = r"([A-Z][A-Z'\-]*)";

static FIELD_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        // License number
        pattern(
            LicenseField::LicenseNumber,
            &format!(r"\blicen[cs]e[ \t]*(?:number|no\.?|#){SEP}{LICENSE_VALUE}"),
            1,
        ),
        pattern(
            LicenseField::LicenseNumber,
            &format!(r"\bDL\b[ \t]*(?:number|no\.?)?{SEP}{LICENSE_VALUE}"),
            1,
        ),
        pattern(
            LicenseField::LicenseNumber,
            &format!(r"\bLIC\b[ \t]*(?:no\.?)?{SEP}{LICENSE_VALUE}"),
            1,
        ),
        // Names
        pattern(LicenseField::FirstName, &format!(r"\bfirst[ \t]*name{SEP}{NAME_VALUE}"), 1),
        pattern(LicenseField::FirstName, &format!(r"\bgiven[ \t]*names?{SEP}{NAME_VALUE}"), 1),
        pattern(LicenseField::FirstName, &format!(r"^[ \t]*name{SEP}{NAME_VALUE}"), 1),
        pattern(LicenseField::LastName, &format!(r"\blast[ \t]*name{SEP}{NAME_VALUE}"), 1),
        pattern(LicenseField::LastName, &format!(r"\bsurname{SEP}{NAME_VALUE}"), 1),
        pattern(LicenseField::LastName, &format!(r"\bfamily[ \t]*name{SEP}{NAME_VALUE}"), 1),
        pattern(LicenseField::MiddleName, &format!(r"\bmiddle[ \t]*name{SEP}{NAME_VALUE}"), 1),
        // Dates
        pattern(
            LicenseField::DateOfBirth,
            &format!(r"\b(?:date[ \t]*of[ \t]*birth|birth[ \t]*date|dob)\b{SEP}{DATE_VALUE}"),
            1,
        ),
        pattern(
            LicenseField::IssueDate,
            &format!(r"\b(?:issue[ \t]*date|date[ \t]*of[ \t]*issue|issued|iss)\b{SEP}{DATE_VALUE}"),
            1,
        ),
        pattern(
            LicenseField::ExpiryDate,
            &format!(r"\b(?:expiry[ \t]*date|expiration[ \t]*date|expires|exp)\b{SEP}{DATE_VALUE}"),
            1,
        ),
        // Address
        pattern(LicenseField::Address, &format!(r"\baddress\b{SEP}([^\n]+)"), 1),
        pattern(LicenseField::Address, &format!(r"\baddr\b\.?{SEP}([^\n]+)"), 1),
        pattern(LicenseField::Address, &format!(r"\bresidence\b{SEP}([^\n]+)"), 1),
        pattern(LicenseField::City, &format!(r"\bcity\b{SEP}([A-Z][A-Z .'\-]*)"), 1),
        pattern(LicenseField::City, &format!(r"\btown\b{SEP}([A-Z][A-Z .'\-]*)"), 1),
        // "STATE OF ..." headers carry no colon, so state labels require one.
        pattern(LicenseField::State, r"\bstate\b[ \t]*:[ \t]*([A-Z][A-Z ]*)", 1),
        pattern(LicenseField::State, r"\bprovince\b[ \t]*:[ \t]*([A-Z][A-Z ]*)", 1),
        pattern(
            LicenseField::ZipCode,
            &format!(r"\b(?:zip(?:[ \t]*code)?|postal(?:[ \t]*code)?|pin(?:[ \t]*code)?)\b{SEP}(\d{{5,6}})"),
            1,
        ),
        // Licensing details
        pattern(
            LicenseField::IssuingAuthority,
            &format!(r"\bauthority\b{SEP}([A-Z][A-Z .&'\-]*)"),
            1,
        ),
        pattern(
            LicenseField::IssuingAuthority,
            &format!(r"\bissued[ \t]+by\b{SEP}([A-Z][A-Z .&'\-]*)"),
            1,
        ),
        pattern(
            LicenseField::IssuingAuthority,
            r"\b(department[ \t]+of[ \t]+[A-Z][A-Z .&'\-]*)",
            1,
        ),
        pattern(LicenseField::LicenseClass, &format!(r"\bclass\b{SEP}([A-Z0-9][A-Z0-9 ,]*)"), 1),
        pattern(
            LicenseField::LicenseClass,
            &format!(r"\bcategor(?:y|ies)\b{SEP}([A-Z0-9][A-Z0-9 ,]*)"),
            1,
        ),
        pattern(LicenseField::Restrictions, &format!(r"\brestrictions?\b{SEP}([^\n]+)"), 1),
        pattern(LicenseField::Restrictions, &format!(r"\bconditions\b{SEP}([^\n]+)"), 1),
        pattern(LicenseField::Endorsements, &format!(r"\bendorsements?\b{SEP}([^\n]+)"), 1),
        pattern(
            LicenseField::Endorsements,
            &format!(r"\bspecial[ \t]+permissions\b{SEP}([^\n]+)"),
            1,
        ),
    ]
});

fn pattern(field: LicenseField, regex_str: &str, group: usize) -> FieldPattern {
    FieldPattern {
        field,
        regex: Regex::new(&format!("(?im){regex_str}")).expect("Invalid field regex pattern"),
        group,
    }
}

/// Fill `result` from labelled text. Fields already present are kept.
pub fn extract_with_patterns(text: &str, result: &mut ExtractionResult) {
    for field in LicenseField::ALL {
        if result.get(field).is_some() {
            continue;
        }
        let Some(raw) = first_match(field, text) else {
            continue;
        };
        let value = if field.is_date() {
            match parse_date_str(&raw) {
                Some(date) => FieldValue::Date(date),
                None => FieldValue::Text(raw),
            }
        } else {
            FieldValue::Text(raw)
        };
        result.insert(field, value);
    }
}

fn first_match(field: LicenseField, text: &str) -> Option<String> {
    FIELD_PATTERNS
        .iter()
        .filter(|p| p.field == field)
        .find_map(|p| {
            let captured = p.regex.captures(text)?.get(p.group)?.as_str();
            let cleaned = captured.trim().trim_end_matches([',', ';']).trim();
            (!cleaned.is_empty()).then(|| cleaned.to_string())
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const SAMPLE: &str = "\
STATE OF TEXAS DRIVER LICENSE
DL NO: D1234567
LAST NAME: DOE
FIRST NAME: JANE
MIDDLE NAME: ANN
DOB: 04/12/1985
ADDRESS: 100 CONGRESS AVE, APT 4
CITY: AUSTIN
STATE: TX
ZIP: 78701
ISS: 2020-06-01
EXP: 06/01/2028
CLASS: C
RESTRICTIONS: CORRECTIVE LENSES
ENDORSEMENTS: NONE
ISSUED BY: TEXAS DPS";

    fn text(result: &ExtractionResult, field: LicenseField) -> String {
        match result.get(field) {
            Some(FieldValue::Text(s)) => s.clone(),
            other => panic!("{} expected text, got {other:?}", field.key()),
        }
    }

    fn date(result: &ExtractionResult, field: LicenseField) -> NaiveDate {
        match result.get(field) {
            Some(FieldValue::Date(d)) => *d,
            other => panic!("{} expected date, got {other:?}", field.key()),
        }
    }

    #[test]
    fn table_compiles() {
        assert!(FIELD_PATTERNS.len() >= LicenseField::ALL.len());
        for field in LicenseField::ALL {
            assert!(
                FIELD_PATTERNS.iter().any(|p| p.field == field),
                "no pattern for {}",
                field.key()
            );
        }
    }

    #[test]
    fn extracts_labelled_card() {
        let mut result = ExtractionResult::empty();
        extract_with_patterns(SAMPLE, &mut result);

        assert_eq!(text(&result, LicenseField::LicenseNumber), "D1234567");
        assert_eq!(text(&result, LicenseField::FirstName), "JANE");
        assert_eq!(text(&result, LicenseField::LastName), "DOE");
        assert_eq!(text(&result, LicenseField::MiddleName), "ANN");
        assert_eq!(text(&result, LicenseField::Address), "100 CONGRESS AVE, APT 4");
        assert_eq!(text(&result, LicenseField::City), "AUSTIN");
        assert_eq!(text(&result, LicenseField::State), "TX");
        assert_eq!(text(&result, LicenseField::ZipCode), "78701");
        assert_eq!(text(&result, LicenseField::LicenseClass), "C");
        assert_eq!(text(&result, LicenseField::Restrictions), "CORRECTIVE LENSES");
        assert_eq!(text(&result, LicenseField::Endorsements), "NONE");
        assert_eq!(text(&result, LicenseField::IssuingAuthority), "TEXAS DPS");
        assert_eq!(
            date(&result, LicenseField::DateOfBirth),
            NaiveDate::from_ymd_opt(1985, 4, 12).unwrap()
        );
        assert_eq!(
            date(&result, LicenseField::IssueDate),
            NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
        );
        assert_eq!(
            date(&result, LicenseField::ExpiryDate),
            NaiveDate::from_ymd_opt(2028, 6, 1).unwrap()
        );
    }

    #[test]
    fn license_number_needs_a_digit() {
        let mut result = ExtractionResult::empty();
        extract_with_patterns("DRIVER LICENSE\nDL CLASS: C\nDL NO: D1234567", &mut result);
        assert_eq!(text(&result, LicenseField::LicenseNumber), "D1234567");

        let mut result = ExtractionResult::empty();
        extract_with_patterns("DL CLASS: C\nLIC RESTRICTED", &mut result);
        assert!(result.get(LicenseField::LicenseNumber).is_none());
    }

    #[test]
    fn label_inside_word_does_not_match() {
        let mut result = ExtractionResult::empty();
        extract_with_patterns("MIDDLE: X\nESTATE: Y", &mut result);
        assert!(result.get(LicenseField::LicenseNumber).is_none());
        assert!(result.get(LicenseField::State).is_none());
    }

    #[test]
    fn department_label_kept_in_value() {
        let mut result = ExtractionResult::empty();
        extract_with_patterns("DEPARTMENT OF MOTOR VEHICLES\n", &mut result);
        assert_eq!(
            text(&result, LicenseField::IssuingAuthority),
            "DEPARTMENT OF MOTOR VEHICLES"
        );
    }

    #[test]
    fn unparseable_date_kept_as_text() {
        let mut result = ExtractionResult::empty();
        extract_with_patterns("DOB: 4/12/85", &mut result);
        assert_eq!(text(&result, LicenseField::DateOfBirth), "4/12/85");
    }

    #[test]
    fn existing_fields_not_overwritten() {
        let mut result = ExtractionResult::empty();
        result.insert(LicenseField::City, FieldValue::Text("DALLAS".into()));
        extract_with_patterns("CITY: AUSTIN", &mut result);
        assert_eq!(text(&result, LicenseField::City), "DALLAS");
    }

    #[test]
    fn unlabelled_text_yields_nothing() {
        let mut result = ExtractionResult::empty();
        extract_with_patterns("the quick brown fox", &mut result);
        assert!(result.is_empty());
    }
}
