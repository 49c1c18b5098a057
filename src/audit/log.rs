//! Audit log writer
//!
//! Appends entries to the `audit` resource of a raw store. Entries are never
//! updated or deleted through this type.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{RegisterError, RegisterResult};
use crate::models::resources::AUDIT;
use crate::models::{Actor, RecordId};
use crate::storage::{ListQuery, SortOrder, Store};

use super::entry::{ActivityType, AuditEntry};

/// Append-only writer of audit entries
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn Store>,
    enabled: bool,
}

impl AuditLog {
    /// Create an audit log writing to `store`
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            enabled: true,
        }
    }

    /// Turn entry writing on or off
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Record an activity, logging and swallowing any write failure
    ///
    /// Without an actor nothing is written.
    pub async fn record(
        &self,
        actor: Option<&Actor>,
        activity_type: ActivityType,
        resource: &str,
        data_id: Option<RecordId>,
        detail: &str,
    ) {
        if let Err(e) = self
            .try_record(actor, activity_type, resource, data_id, detail)
            .await
        {
            let failure = RegisterError::Audit(e.to_string());
            warn!(resource, ?data_id, %activity_type, error = %failure, "Audit entry dropped");
        }
    }

    /// Record an activity, returning the stored entry
    ///
    /// Returns `Ok(None)` when there is no actor or the log is disabled.
    pub async fn try_record(
        &self,
        actor: Option<&Actor>,
        activity_type: ActivityType,
        resource: &str,
        data_id: Option<RecordId>,
        detail: &str,
    ) -> RegisterResult<Option<AuditEntry>> {
        let Some(actor) = actor else {
            debug!(resource, %activity_type, "No actor, audit entry skipped");
            return Ok(None);
        };
        if !self.enabled {
            return Ok(None);
        }

        let fields = AuditEntry::draft(actor, activity_type, resource, data_id, detail)?;
        let record = self.store.create(AUDIT, fields).await?;
        debug!(resource, ?data_id, %activity_type, entry = %record.id, "Audit entry written");

        AuditEntry::from_record(&record).map(Some)
    }

    /// Typed entries matching a query, with the total before pagination
    pub async fn entries(&self, query: &ListQuery) -> RegisterResult<(Vec<AuditEntry>, usize)> {
        let result = self.store.list(AUDIT, query).await?;
        let entries = result
            .data
            .iter()
            .map(AuditEntry::from_record)
            .collect::<RegisterResult<Vec<_>>>()?;
        Ok((entries, result.total))
    }

    /// Every entry about one record, oldest first
    pub async fn history(&self, resource: &str, id: RecordId) -> RegisterResult<Vec<AuditEntry>> {
        let query = ListQuery::all()
            .filter_eq("resource", resource)
            .filter_eq("data_id", id.value())
            .sort_by("id", SortOrder::Asc);
        let (entries, _) = self.entries(&query).await?;
        Ok(entries)
    }
}
