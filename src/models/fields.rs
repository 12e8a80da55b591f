use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The fixed set of fields extracted from a driving license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LicenseField {
    LicenseNumber,
    FirstName,
    LastName,
    MiddleName,
    DateOfBirth,
    Address,
    City,
    State,
    ZipCode,
    IssueDate,
    ExpiryDate,
    IssuingAuthority,
    LicenseClass,
    Restrictions,
    Endorsements,
}

impl LicenseField {
    /// Every tracked field, in prompt order.
    pub const ALL: [LicenseField; 15] = [
        Self::LicenseNumber,
        Self::FirstName,
        Self::LastName,
        Self::MiddleName,
        Self::DateOfBirth,
        Self::Address,
        Self::City,
        Self::State,
        Self::ZipCode,
        Self::IssueDate,
        Self::ExpiryDate,
        Self::IssuingAuthority,
        Self::LicenseClass,
        Self::Restrictions,
        Self::Endorsements,
    ];

    /// Fields counted by the completeness score.
    pub const KEY_SET: [LicenseField; 10] = [
        Self::LicenseNumber,
        Self::FirstName,
        Self::LastName,
        Self::DateOfBirth,
        Self::Address,
        Self::City,
        Self::State,
        Self::ZipCode,
        Self::IssueDate,
        Self::ExpiryDate,
    ];

    /// Fields without which a record always needs manual review.
    pub const MANDATORY: [LicenseField; 3] =
        [Self::LicenseNumber, Self::FirstName, Self::LastName];

    /// camelCase key used in provider JSON and serialized records.
    pub fn key(&self) -> &'static str {
        match self {
            Self::LicenseNumber => "licenseNumber",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::MiddleName => "middleName",
            Self::DateOfBirth => "dateOfBirth",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
            Self::IssueDate => "issueDate",
            Self::ExpiryDate => "expiryDate",
            Self::IssuingAuthority => "issuingAuthority",
            Self::LicenseClass => "licenseClass",
            Self::Restrictions => "restrictions",
            Self::Endorsements => "endorsements",
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Self::DateOfBirth | Self::IssueDate | Self::ExpiryDate)
    }
}

/// A single extracted value: free text, or a date a provider already parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Date(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    /// Render the value as text; dates use ISO 8601.
    pub fn to_text(&self) -> String {
        match self {
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Anything that can answer "is this field present and non-blank".
///
/// Implemented by provider results and by finished records so the same
/// scoring and classification rules apply to both.
pub trait FieldSource {
    fn has_value(&self, field: LicenseField) -> bool;
}
