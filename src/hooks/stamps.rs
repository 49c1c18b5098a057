//! Deferred stamping writes
//!
//! When the follow-up write that stamps a derived code onto a new record
//! fails or times out, the record stays committed without the code and the
//! write is parked here until `LifecycleStore::retry_pending_stamps` applies
//! it. File-backed queues survive restarts in `pending-stamps.json`.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RegisterResult;
use crate::models::RecordId;
use crate::storage::{read_json, write_json_atomic};

/// A stamp that has not reached the store yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingStamp {
    pub resource: String,
    pub id: RecordId,
    pub field: String,
    pub value: String,

    /// Last failure
    pub reason: String,

    /// Failed attempts so far
    pub attempts: u32,

    pub queued_at: DateTime<Utc>,
}

impl PendingStamp {
    pub fn new(
        resource: impl Into<String>,
        id: RecordId,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            id,
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            attempts: 1,
            queued_at: Utc::now(),
        }
    }

    /// Note another failed attempt
    pub fn record_failure(&mut self, reason: impl Into<String>) {
        self.attempts += 1;
        self.reason = reason.into();
    }

    fn targets(&self, other: &PendingStamp) -> bool {
        self.resource == other.resource && self.id == other.id && self.field == other.field
    }
}

/// Outcome of a retry pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StampRetryReport {
    pub applied: usize,
    pub remaining: usize,
}

/// Queue of pending stamps
#[derive(Debug, Default)]
pub struct StampQueue {
    path: Option<PathBuf>,
    pending: Mutex<Vec<PendingStamp>>,
}

impl StampQueue {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a queue persisted at `path`, loading what is already there
    pub fn open(path: impl Into<PathBuf>) -> RegisterResult<Self> {
        let path = path.into();
        let pending: Vec<PendingStamp> = read_json(&path)?;
        Ok(Self {
            path: Some(path),
            pending: Mutex::new(pending),
        })
    }

    /// Queue a stamp, replacing any earlier one for the same field of the same record
    pub fn push(&self, stamp: PendingStamp) {
        let mut pending = self.lock();
        pending.retain(|existing| !existing.targets(&stamp));
        pending.push(stamp);
        self.persist(&pending);
    }

    /// Replace a queued stamp in place, keeping its position
    ///
    /// Does nothing if the stamp is no longer queued.
    pub fn update(&self, stamp: &PendingStamp) {
        let mut pending = self.lock();
        if let Some(existing) = pending.iter_mut().find(|existing| existing.targets(stamp)) {
            *existing = stamp.clone();
            self.persist(&pending);
        }
    }

    /// Drop the stamp for the same field of the same record
    pub fn resolve(&self, stamp: &PendingStamp) {
        let mut pending = self.lock();
        let before = pending.len();
        pending.retain(|existing| !existing.targets(stamp));
        if pending.len() != before {
            self.persist(&pending);
        }
    }

    pub fn snapshot(&self) -> Vec<PendingStamp> {
        self.lock().clone()
    }

    /// Pending values of one field across a resource
    pub fn pending_values(&self, resource: &str, field: &str) -> Vec<(RecordId, String)> {
        self.lock()
            .iter()
            .filter(|stamp| stamp.resource == resource && stamp.field == field)
            .map(|stamp| (stamp.id, stamp.value.clone()))
            .collect()
    }

    /// Pending value of one field of one record
    pub fn pending_value(&self, resource: &str, id: RecordId, field: &str) -> Option<String> {
        self.lock()
            .iter()
            .find(|stamp| stamp.resource == resource && stamp.id == id && stamp.field == field)
            .map(|stamp| stamp.value.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PendingStamp>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, pending: &[PendingStamp]) {
        if let Some(path) = &self.path {
            if let Err(e) = write_json_atomic(path, &pending) {
                warn!(path = %path.display(), error = %e, "Failed to persist pending stamps");
            }
        }
    }
}
