use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{FileKind, ProcessingStatus};
use super::fields::{FieldSource, LicenseField};

/// The pipeline's output: one fully populated record per upload.
///
/// String fields default to `""` when nothing was extracted. Date fields
/// are `None` when absent or unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredRecord {
    pub id: Uuid,
    pub original_filename: String,
    pub license_number: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub issuing_authority: String,
    pub license_class: String,
    pub restrictions: String,
    pub endorsements: String,
    pub document_type: FileKind,
    pub handwritten: bool,
    pub ai_processed: bool,
    pub ai_confidence: f32,
    pub confidence_score: f32,
    pub processing_status: ProcessingStatus,
    pub created_at: NaiveDate,
    /// Provider that produced the winning extraction, if any.
    pub provider: Option<String>,
}

impl StructuredRecord {
    /// An empty record in the `PROCESSING` state.
    pub fn new(id: Uuid, original_filename: &str, document_type: FileKind, created_at: NaiveDate) -> Self {
        Self {
            id,
            original_filename: original_filename.to_string(),
            license_number: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            middle_name: String::new(),
            date_of_birth: None,
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            issue_date: None,
            expiry_date: None,
            issuing_authority: String::new(),
            license_class: String::new(),
            restrictions: String::new(),
            endorsements: String::new(),
            document_type,
            handwritten: false,
            ai_processed: false,
            ai_confidence: 0.0,
            confidence_score: 0.0,
            processing_status: ProcessingStatus::Processing,
            created_at,
            provider: None,
        }
    }

    /// Text slot for a non-date field. `None` for date fields.
    pub fn text(&self, field: LicenseField) -> Option<&str> {
        let value = match field {
            LicenseField::LicenseNumber => &self.license_number,
            LicenseField::FirstName => &self.first_name,
            LicenseField::LastName => &self.last_name,
            LicenseField::MiddleName => &self.middle_name,
            LicenseField::Address => &self.address,
            LicenseField::City => &self.city,
            LicenseField::State => &self.state,
            LicenseField::ZipCode => &self.zip_code,
            LicenseField::IssuingAuthority => &self.issuing_authority,
            LicenseField::LicenseClass => &self.license_class,
            LicenseField::Restrictions => &self.restrictions,
            LicenseField::Endorsements => &self.endorsements,
            LicenseField::DateOfBirth | LicenseField::IssueDate | LicenseField::ExpiryDate => {
                return None
            }
        };
        Some(value.as_str())
    }

    pub fn date(&self, field: LicenseField) -> Option<NaiveDate> {
        match field {
            LicenseField::DateOfBirth => self.date_of_birth,
            LicenseField::IssueDate => self.issue_date,
            LicenseField::ExpiryDate => self.expiry_date,
            _ => None,
        }
    }

    /// Store a text value. Ignored for date fields.
    pub fn set_text(&mut self, field: LicenseField, value: String) {
        let slot = match field {
            LicenseField::LicenseNumber => &mut self.license_number,
            LicenseField::FirstName => &mut self.first_name,
            LicenseField::LastName => &mut self.last_name,
            LicenseField::MiddleName => &mut self.middle_name,
            LicenseField::Address => &mut self.address,
            LicenseField::City => &mut self.city,
            LicenseField::State => &mut self.state,
            LicenseField::ZipCode => &mut self.zip_code,
            LicenseField::IssuingAuthority => &mut self.issuing_authority,
            LicenseField::LicenseClass => &mut self.license_class,
            LicenseField::Restrictions => &mut self.restrictions,
            LicenseField::Endorsements => &mut self.endorsements,
            LicenseField::DateOfBirth | LicenseField::IssueDate | LicenseField::ExpiryDate => {
                return
            }
        };
        *slot = value;
    }

    /// Store a date value. Ignored for non-date fields.
    pub fn set_date(&mut self, field: LicenseField, value: Option<NaiveDate>) {
        match field {
            LicenseField::DateOfBirth => self.date_of_birth = value,
            LicenseField::IssueDate => self.issue_date = value,
            LicenseField::ExpiryDate => self.expiry_date = value,
            _ => {}
        }
    }
}

impl FieldSource for StructuredRecord {
    fn has_value(&self, field: LicenseField) -> bool {
        if field.is_date() {
            self.date(field).is_some()
        } else {
            self.text(field).is_some_and(|s| !s.trim().is_empty())
        }
    }
}
