//! Record persistence boundary and an in-memory reference store.
//!
//! The pipeline hands each finished record to a `RecordSink` exactly once.
//! `InMemoryRecordStore` upserts by license number: a second scan of the
//! same license replaces the earlier record but keeps its id.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{RecordFilter, StructuredRecord};

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("A license number is required for this lookup")]
    MissingLicenseNumber,

    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Record store lock poisoned")]
    LockPoisoned,
}

/// Destination for finished records.
pub trait RecordSink {
    /// Persist a record, returning it as stored.
    fn save(&self, record: &StructuredRecord) -> Result<StructuredRecord, StoreError>;
}

/// Thread-safe in-memory store keyed by record id.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: Mutex<HashMap<Uuid, StructuredRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, StructuredRecord>>, StoreError> {
        self.records.lock().map_err(|_| StoreError::LockPoisoned)
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<StructuredRecord>, StoreError> {
        Ok(self.lock()?.get(id).cloned())
    }

    pub fn find_by_license_number(
        &self,
        license_number: &str,
    ) -> Result<Option<StructuredRecord>, StoreError> {
        let wanted = license_number.trim();
        if wanted.is_empty() {
            return Err(StoreError::MissingLicenseNumber);
        }
        Ok(self
            .lock()?
            .values()
            .find(|r| r.license_number == wanted)
            .cloned())
    }

    pub fn license_number_exists(&self, license_number: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_license_number(license_number)?.is_some())
    }

    /// Records matching `filter`, oldest first.
    pub fn query(&self, filter: &RecordFilter) -> Result<Vec<StructuredRecord>, StoreError> {
        let mut matched: Vec<StructuredRecord> = self
            .lock()?
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.original_filename.cmp(&b.original_filename))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matched)
    }

    pub fn list(&self) -> Result<Vec<StructuredRecord>, StoreError> {
        self.query(&RecordFilter::default())
    }

    /// Replace a stored record's contents, keeping its id.
    pub fn update(
        &self,
        id: &Uuid,
        record: &StructuredRecord,
    ) -> Result<StructuredRecord, StoreError> {
        let mut records = self.lock()?;
        let slot = records.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        *slot = StructuredRecord {
            id: *id,
            ..record.clone()
        };
        info!(record_id = %id, "Updated record");
        Ok(slot.clone())
    }

    pub fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        self.lock()?
            .remove(id)
            .map(|_| info!(record_id = %id, "Deleted record"))
            .ok_or(StoreError::NotFound(*id))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for InMemoryRecordStore {
    fn save(&self, record: &StructuredRecord) -> Result<StructuredRecord, StoreError> {
        let mut records = self.lock()?;
        let license_number = record.license_number.trim();

        let existing_id = if license_number.is_empty() {
            None
        } else {
            records
                .values()
                .find(|r| r.license_number == license_number)
                .map(|r| r.id)
        };

        let stored = match existing_id {
            Some(id) => {
                info!(record_id = %id, "Updating existing license record");
                StructuredRecord {
                    id,
                    ..record.clone()
                }
            }
            None => {
                info!(record_id = %record.id, "Saving new license record");
                record.clone()
            }
        };

        records.insert(stored.id, stored.clone());
        Ok(stored)
    }
}
