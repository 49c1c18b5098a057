//! The key-value store interface
//!
//! Everything above the storage layer talks to records through this trait:
//! the raw backend implements it, and so does the lifecycle facade that wraps
//! the backend with hooks.

use async_trait::async_trait;

use crate::error::RegisterResult;
use crate::models::{Fields, Record, RecordId};

use super::query::{ListQuery, ListResult};

/// Generic CRUD over records keyed by resource name and id
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Errors
///
/// `get`, `update` and `delete` return `RegisterError::NotFound` for a
/// missing id. `create` returns `RegisterError::Duplicate` when the caller
/// supplies an id that is already taken.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a record; the store assigns the id unless `data` carries a free one
    async fn create(&self, resource: &str, data: Fields) -> RegisterResult<Record>;

    /// Merge `patch` into an existing record and return the result
    async fn update(&self, resource: &str, id: RecordId, patch: Fields) -> RegisterResult<Record>;

    /// Delete a record and return its last state
    async fn delete(&self, resource: &str, id: RecordId) -> RegisterResult<Record>;

    /// Read a record
    async fn get(&self, resource: &str, id: RecordId) -> RegisterResult<Record>;

    /// Filter, sort and paginate the records of a resource
    async fn list(&self, resource: &str, query: &ListQuery) -> RegisterResult<ListResult>;

    /// Apply the same patch to several records, stopping at the first failure
    async fn update_many(
        &self,
        resource: &str,
        ids: &[RecordId],
        patch: Fields,
    ) -> RegisterResult<Vec<RecordId>> {
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            self.update(resource, *id, patch.clone()).await?;
            updated.push(*id);
        }
        Ok(updated)
    }

    /// Delete several records, stopping at the first failure
    async fn delete_many(&self, resource: &str, ids: &[RecordId]) -> RegisterResult<Vec<RecordId>> {
        let mut deleted = Vec::with_capacity(ids.len());
        for id in ids {
            self.delete(resource, *id).await?;
            deleted.push(*id);
        }
        Ok(deleted)
    }
}
