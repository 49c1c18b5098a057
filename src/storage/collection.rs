//! Per-resource record collection
//!
//! A collection owns the records of one resource and the id counter that
//! hands out new ids. File-backed collections persist to `{resource}.json`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::RegisterError;
use crate::models::{Fields, Record, RecordId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable collection data
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CollectionData {
    next_id: u64,
    records: Vec<Record>,
}

#[derive(Debug, Default)]
struct CollectionState {
    next_id: u64,
    records: BTreeMap<RecordId, Record>,
}

/// Records of one resource
pub struct Collection {
    resource: String,
    path: Option<PathBuf>,
    data: RwLock<CollectionState>,
}

impl Collection {
    /// Create a collection that lives only in memory
    pub fn in_memory(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            path: None,
            data: RwLock::new(CollectionState::default()),
        }
    }

    /// Create a collection backed by a JSON file
    pub fn with_path(resource: impl Into<String>, path: PathBuf) -> Self {
        Self {
            resource: resource.into(),
            path: Some(path),
            data: RwLock::new(CollectionState::default()),
        }
    }

    /// Resource name
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Load records from disk (no-op for in-memory collections)
    pub fn load(&self) -> Result<(), RegisterError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file_data: CollectionData = read_json(path)?;

        let mut data = self.data.write().map_err(|e| {
            RegisterError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.records.clear();
        let mut next_id = file_data.next_id;
        for record in file_data.records {
            next_id = next_id.max(record.id.value() + 1);
            data.records.insert(record.id, record);
        }
        data.next_id = next_id;

        Ok(())
    }

    fn persist(&self, state: &CollectionState) -> Result<(), RegisterError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file_data = CollectionData {
            next_id: state.next_id,
            records: state.records.values().cloned().collect(),
        };
        write_json_atomic(path, &file_data)
    }

    /// Get a record by id
    pub fn get(&self, id: RecordId) -> Result<Option<Record>, RegisterError> {
        let data = self.data.read().map_err(|e| {
            RegisterError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.records.get(&id).cloned())
    }

    /// Get all records in id order
    pub fn get_all(&self) -> Result<Vec<Record>, RegisterError> {
        let data = self.data.read().map_err(|e| {
            RegisterError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.records.values().cloned().collect())
    }

    /// Insert a new record
    ///
    /// The id is `requested` when given and free, otherwise the next counter
    /// value. Allocation and insert happen under one write lock.
    ///
    /// Like every mutation here, a failed write to disk leaves the in-memory
    /// state as it was.
    pub fn insert(&self, requested: Option<RecordId>, fields: Fields) -> Result<Record, RegisterError> {
        let mut data = self.data.write().map_err(|e| {
            RegisterError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let id = match requested {
            Some(id) if data.records.contains_key(&id) => {
                return Err(RegisterError::duplicate(&self.resource, id));
            }
            Some(id) => id,
            None => RecordId::new(data.next_id),
        };

        let record = Record::new(id, fields);
        let previous_next_id = data.next_id;
        data.records.insert(id, record.clone());
        data.next_id = data.next_id.max(id.value() + 1);
        if let Err(e) = self.persist(&data) {
            data.records.remove(&id);
            data.next_id = previous_next_id;
            return Err(e);
        }

        Ok(record)
    }

    /// Merge a patch into an existing record
    pub fn patch(&self, id: RecordId, patch: &Fields) -> Result<Record, RegisterError> {
        let mut data = self.data.write().map_err(|e| {
            RegisterError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let record = data
            .records
            .get_mut(&id)
            .ok_or_else(|| RegisterError::not_found(&self.resource, id))?;
        let original = record.clone();
        record.merge(patch);
        let updated = record.clone();
        if let Err(e) = self.persist(&data) {
            data.records.insert(id, original);
            return Err(e);
        }

        Ok(updated)
    }

    /// Remove a record, returning it
    pub fn remove(&self, id: RecordId) -> Result<Record, RegisterError> {
        let mut data = self.data.write().map_err(|e| {
            RegisterError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let removed = data
            .records
            .remove(&id)
            .ok_or_else(|| RegisterError::not_found(&self.resource, id))?;
        if let Err(e) = self.persist(&data) {
            data.records.insert(id, removed);
            return Err(e);
        }

        Ok(removed)
    }

    /// Count records
    pub fn count(&self) -> Result<usize, RegisterError> {
        let data = self.data.read().map_err(|e| {
            RegisterError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.records.len())
    }
}
