use serde_json::{Map, Value};

use super::types::ExtractionResult;
use super::StructuringError;
use crate::models::{FieldValue, LicenseField};
use crate::pipeline::normalize::parse_date_str;

/// Slice out the outermost JSON object: first `{` through last `}`.
pub fn extract_json_object(response: &str) -> Result<&str, StructuringError> {
    let start = response
        .find('{')
        .ok_or_else(|| StructuringError::ResponseParsing("No JSON object found".into()))?;
    let end = response
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| StructuringError::ResponseParsing("Unclosed JSON object".into()))?;
    Ok(&response[start..=end])
}

/// Parse a model response into `result`.
///
/// Unknown keys are ignored. Date fields the normalizer understands are
/// stored as dates; anything else is kept as text.
pub fn parse_extraction_response(
    response: &str,
    result: &mut ExtractionResult,
) -> Result<(), StructuringError> {
    let json = extract_json_object(response)?;
    let object: Map<String, Value> = serde_json::from_str(json)
        .map_err(|e| StructuringError::ResponseParsing(e.to_string()))?;

    for field in LicenseField::ALL {
        let Some(text) = object.get(field.key()).and_then(value_text) else {
            continue;
        };
        let value = if field.is_date() {
            match parse_date_str(&text) {
                Some(date) => FieldValue::Date(date),
                None => FieldValue::Text(text),
            }
        } else {
            FieldValue::Text(text)
        };
        result.insert(field, value);
    }

    Ok(())
}

/// Scalar JSON values as text; JSON null, arrays and objects count as absent.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::pipeline::structuring::types::Provenance;

    fn fresh() -> ExtractionResult {
        ExtractionResult::new(
            Provenance {
                provider: "test".into(),
                model: "m".into(),
            },
            true,
        )
    }

    #[test]
    fn finds_object_inside_chatter() {
        let response = "Sure! Here you go:\n{\"a\": {\"b\": 1}}\nHope that helps.";
        assert_eq!(extract_json_object(response).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn missing_braces_rejected() {
        assert!(extract_json_object("no json here").is_err());
        assert!(extract_json_object("} backwards {").is_err());
    }

    #[test]
    fn parses_fields_and_dates() {
        let response = r#"```json
{
  "licenseNumber": "D1234567",
  "firstName": "JANE",
  "lastName": "DOE",
  "middleName": null,
  "dateOfBirth": "1985-04-12",
  "expiryDate": "sometime soon",
  "zipCode": 78701,
  "restrictions": "null",
  "nickname": "JD"
}
```"#;
        let mut result = fresh();
        parse_extraction_response(response, &mut result).unwrap();

        assert_eq!(
            result.get(LicenseField::LicenseNumber),
            Some(&FieldValue::Text("D1234567".into()))
        );
        assert_eq!(
            result.get(LicenseField::DateOfBirth),
            Some(&FieldValue::Date(NaiveDate::from_ymd_opt(1985, 4, 12).unwrap()))
        );
        assert_eq!(
            result.get(LicenseField::ExpiryDate),
            Some(&FieldValue::Text("sometime soon".into()))
        );
        assert_eq!(
            result.get(LicenseField::ZipCode),
            Some(&FieldValue::Text("78701".into()))
        );
        assert!(result.get(LicenseField::MiddleName).is_none());
        assert!(result.get(LicenseField::Restrictions).is_none());
        assert_eq!(result.len(), 6);
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let mut result = fresh();
        let err = parse_extraction_response("{licenseNumber: D1}", &mut result).unwrap_err();
        assert!(matches!(err, StructuringError::ResponseParsing(_)));
        assert!(result.is_empty());
    }
}
