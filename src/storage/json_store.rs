//! JSON-backed store
//!
//! Holds one `Collection` per resource, created and loaded on first use.
//! With a root directory each collection persists to `{root}/{resource}.json`
//! after every mutation; without one everything stays in memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{RegisterError, RegisterResult};
use crate::models::record::explicit_id;
use crate::models::{Fields, Record, RecordId};

use super::collection::Collection;
use super::query::{ListQuery, ListResult};
use super::store::Store;

/// Store keeping each resource in its own JSON file
pub struct JsonStore {
    root: Option<PathBuf>,
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl JsonStore {
    /// Create a store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            root: None,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> RegisterResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            RegisterError::Storage(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        Ok(Self {
            root: Some(dir.to_path_buf()),
            collections: RwLock::new(HashMap::new()),
        })
    }

    /// Root directory, if file-backed
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Number of records in a resource
    pub fn count(&self, resource: &str) -> RegisterResult<usize> {
        self.collection(resource)?.count()
    }

    fn collection(&self, resource: &str) -> RegisterResult<Arc<Collection>> {
        validate_resource_name(resource)?;

        {
            let collections = self.collections.read().map_err(|e| {
                RegisterError::Storage(format!("Failed to acquire read lock: {}", e))
            })?;
            if let Some(collection) = collections.get(resource) {
                return Ok(collection.clone());
            }
        }

        let mut collections = self.collections.write().map_err(|e| {
            RegisterError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        // Another writer may have loaded it between the two locks
        if let Some(collection) = collections.get(resource) {
            return Ok(collection.clone());
        }

        let collection = match &self.root {
            Some(root) => Collection::with_path(resource, root.join(format!("{}.json", resource))),
            None => Collection::in_memory(resource),
        };
        collection.load()?;
        debug!(resource, "Loaded collection");

        let collection = Arc::new(collection);
        collections.insert(resource.to_string(), collection.clone());
        Ok(collection)
    }
}

/// Resource names double as file names
fn validate_resource_name(resource: &str) -> RegisterResult<()> {
    let valid = !resource.is_empty()
        && resource
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RegisterError::Validation(format!(
            "Invalid resource name '{}'",
            resource
        )))
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn create(&self, resource: &str, data: Fields) -> RegisterResult<Record> {
        let requested = explicit_id(&data);
        self.collection(resource)?.insert(requested, data)
    }

    async fn update(&self, resource: &str, id: RecordId, patch: Fields) -> RegisterResult<Record> {
        self.collection(resource)?.patch(id, &patch)
    }

    async fn delete(&self, resource: &str, id: RecordId) -> RegisterResult<Record> {
        self.collection(resource)?.remove(id)
    }

    async fn get(&self, resource: &str, id: RecordId) -> RegisterResult<Record> {
        self.collection(resource)?
            .get(id)?
            .ok_or_else(|| RegisterError::not_found(resource, id))
    }

    async fn list(&self, resource: &str, query: &ListQuery) -> RegisterResult<ListResult> {
        let records = self.collection(resource)?.get_all()?;
        Ok(query.apply(records))
    }
}
