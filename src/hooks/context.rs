//! Per-mutation hook context

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::audit::AuditLog;
use crate::error::RegisterError;
use crate::models::{Actor, Fields, Record, RecordId};
use crate::storage::Store;

use super::stamps::{PendingStamp, StampQueue};

/// What a hook can see and reach while one mutation runs
///
/// `store()` is the raw store underneath the dispatcher: writes through it
/// run no hooks and produce no audit entries.
#[derive(Clone)]
pub struct HookContext {
    resource: String,
    actor: Option<Actor>,
    store: Arc<dyn Store>,
    audit: AuditLog,
    stamps: Arc<StampQueue>,
    stamp_timeout: Duration,
}

impl HookContext {
    pub fn new(
        resource: impl Into<String>,
        actor: Option<Actor>,
        store: Arc<dyn Store>,
        audit: AuditLog,
        stamps: Arc<StampQueue>,
        stamp_timeout: Duration,
    ) -> Self {
        Self {
            resource: resource.into(),
            actor,
            store,
            audit,
            stamps,
            stamp_timeout,
        }
    }

    /// Resource being mutated
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn stamps(&self) -> &StampQueue {
        &self.stamps
    }

    /// A field of a record, falling back to a value still waiting in the stamp queue
    pub fn field_or_pending(&self, resource: &str, record: &Record, field: &str) -> Option<String> {
        record
            .get_str(field)
            .map(str::to_string)
            .or_else(|| self.stamps.pending_value(resource, record.id, field))
    }

    /// Records of a resource with pending stamp values filled in where missing
    pub fn with_pending(&self, resource: &str, field: &str, mut records: Vec<Record>) -> Vec<Record> {
        for (id, value) in self.stamps.pending_values(resource, field) {
            if let Some(record) = records
                .iter_mut()
                .find(|record| record.id == id && record.get(field).is_none())
            {
                record.set(field, value);
            }
        }
        records
    }

    /// Write a derived value onto a freshly created record
    ///
    /// The write is bounded by the stamp timeout. On failure or timeout the
    /// stamp is queued for retry and the record is returned unchanged.
    pub async fn stamp(&self, record: Record, field: &str, value: String) -> Record {
        let mut patch = Fields::new();
        patch.insert(field.to_string(), Value::String(value.clone()));

        let write = self.store.update(&self.resource, record.id, patch);
        let reason = match tokio::time::timeout(self.stamp_timeout, write).await {
            Ok(Ok(stamped)) => {
                debug!(resource = %self.resource, id = %record.id, field, %value, "Stamped");
                return stamped;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {} ms", self.stamp_timeout.as_millis()),
        };

        let failure = RegisterError::secondary_write(&self.resource, record.id, reason.clone());
        warn!(error = %failure, field, "Stamp queued for retry");
        self.stamps
            .push(PendingStamp::new(&self.resource, record.id, field, value, reason));
        record
    }

    /// Id of the acting user, if any
    pub fn actor_id(&self) -> Option<RecordId> {
        self.actor.as_ref().map(|actor| actor.id)
    }
}
