use crate::models::LicenseField;

/// Field descriptions listed in the local-model prompt, keyed by wire name.
const FIELD_HINTS: [(LicenseField, &str); 15] = [
    (LicenseField::LicenseNumber, "The driving license number"),
    (LicenseField::FirstName, "First name of the license holder"),
    (LicenseField::LastName, "Last name of the license holder"),
    (LicenseField::MiddleName, "Middle name (if any)"),
    (LicenseField::DateOfBirth, "Date of birth in YYYY-MM-DD format"),
    (LicenseField::Address, "Complete address"),
    (LicenseField::City, "City name"),
    (LicenseField::State, "State name"),
    (LicenseField::ZipCode, "ZIP/Postal code"),
    (LicenseField::IssueDate, "Issue date in YYYY-MM-DD format"),
    (LicenseField::ExpiryDate, "Expiry date in YYYY-MM-DD format"),
    (LicenseField::IssuingAuthority, "Authority that issued the license"),
    (LicenseField::LicenseClass, "License class/category"),
    (LicenseField::Restrictions, "Any restrictions (if none, use \"None\")"),
    (LicenseField::Endorsements, "Any endorsements (if none, use \"None\")"),
];

/// Build the single-turn prompt for the local model.
pub fn build_local_prompt(raw_text: &str) -> String {
    let field_list: String = FIELD_HINTS
        .iter()
        .map(|(field, hint)| format!("- {}: {hint}\n", field.key()))
        .collect();

    format!(
        r#"You are an AI assistant specialized in extracting structured data from driving license documents.

Please analyze the following OCR text from a driving license and extract the information in JSON format.

OCR Text:
{raw_text}

Extract the following fields and return ONLY a valid JSON object:
{field_list}
If a field is not found in the text, use null for that field.
Return ONLY the JSON object, no additional text or explanation.
"#
    )
}

/// System message for the hosted model.
pub fn hosted_system_prompt() -> String {
    let keys: Vec<&str> = LicenseField::ALL.iter().map(|f| f.key()).collect();
    format!(
        "You are an expert document processor. Extract driving license information and return \
         ONLY a valid JSON object with the following fields: {}. Use null for missing values. \
         Format dates as YYYY-MM-DD.",
        keys.join(", ")
    )
}

/// User message for the hosted model.
pub fn build_hosted_prompt(raw_text: &str) -> String {
    format!(
        r#"Please extract driving license information from the following OCR text.
Return ONLY a valid JSON object with the extracted data.

OCR Text:
{raw_text}

Instructions:
1. Extract all available fields
2. Use null for missing values
3. Format dates as YYYY-MM-DD
4. Clean and normalize text values
5. Return only the JSON object, no explanations
"#
    )
}
