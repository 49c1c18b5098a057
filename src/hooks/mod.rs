//! Lifecycle hook-sets
//!
//! A hook-set bundles optional before/after handlers for create, update and
//! delete on one resource. The lifecycle dispatcher runs every hook-set bound
//! to the mutated resource in registration order, each one seeing the output
//! of the one before it.
//!
//! Before-hooks may rewrite the input or reject it; a rejection aborts the
//! mutation before anything is written. After-hooks run on the committed
//! record; their errors are logged and never undo the mutation.

mod audit_trail;
mod batch;
mod cascade;
mod context;
mod item;
mod registry;
mod stamps;
mod timestamps;
mod user;

use std::sync::Arc;

use async_trait::async_trait;

use crate::audit::ActivityType;
use crate::config::settings::Settings;
use crate::error::RegisterResult;
use crate::models::resources::{
    self, BATCHES, DESTRUCTIONS, ITEMS, PLATFORMS, PROJECTS, USERS,
};
use crate::models::{Fields, Record};

pub use audit_trail::AuditTrail;
pub use batch::BatchHooks;
pub use cascade::CascadeDelete;
pub use context::HookContext;
pub use item::ItemHooks;
pub use registry::{HookRegistry, OwnershipConflict};
pub use stamps::{PendingStamp, StampQueue, StampRetryReport};
pub use timestamps::{Timestamps, CREATED_AT, CREATED_BY};
pub use user::UserHooks;

/// Handlers around the mutations of one resource
///
/// Every handler defaults to a pass-through, so a hook-set implements only
/// the stages it cares about.
#[async_trait]
pub trait HookSet: Send + Sync {
    /// Name used in logs and ownership reports
    fn name(&self) -> &str;

    /// Fields this hook-set computes; no other hook-set on the resource may claim them
    fn owned_fields(&self) -> &[&'static str] {
        &[]
    }

    /// Family whose lock the dispatcher holds while this hook-set runs
    ///
    /// Mutations sharing a family are serialized.
    fn sequence_family(&self) -> Option<&str> {
        None
    }

    async fn before_create(&self, _ctx: &HookContext, data: Fields) -> RegisterResult<Fields> {
        Ok(data)
    }

    async fn after_create(&self, _ctx: &HookContext, record: Record) -> RegisterResult<Record> {
        Ok(record)
    }

    async fn before_update(
        &self,
        _ctx: &HookContext,
        _previous: &Record,
        patch: Fields,
    ) -> RegisterResult<Fields> {
        Ok(patch)
    }

    async fn after_update(
        &self,
        _ctx: &HookContext,
        _previous: &Record,
        record: Record,
    ) -> RegisterResult<Record> {
        Ok(record)
    }

    async fn before_delete(&self, _ctx: &HookContext, _record: &Record) -> RegisterResult<()> {
        Ok(())
    }

    async fn after_delete(&self, _ctx: &HookContext, record: Record) -> RegisterResult<Record> {
        Ok(record)
    }

    /// Audit detail for a mutation, overriding the dispatcher's default text
    fn describe(
        &self,
        _activity: ActivityType,
        _previous: Option<&Record>,
        _record: &Record,
    ) -> Option<String> {
        None
    }
}

/// The register's standard hook-sets
pub fn default_registry(settings: &Settings) -> HookRegistry {
    let timestamps: Arc<dyn HookSet> = Arc::new(Timestamps);
    let audit_trail: Arc<dyn HookSet> = Arc::new(AuditTrail);

    let mut registry = HookRegistry::new();
    registry
        .register(BATCHES, timestamps.clone())
        .register(BATCHES, Arc::new(BatchHooks));
    if settings.cascade_item_deletes {
        registry.register(BATCHES, Arc::new(CascadeDelete::batch_items()));
    }

    registry
        .register(ITEMS, timestamps.clone())
        .register(ITEMS, Arc::new(ItemHooks))
        .register(USERS, Arc::new(UserHooks))
        .register(PROJECTS, timestamps)
        .register(PROJECTS, audit_trail.clone())
        .register(PLATFORMS, audit_trail.clone())
        .register(DESTRUCTIONS, audit_trail.clone());

    for resource in resources::REFERENCE_DATA {
        registry.register(resource, audit_trail.clone());
    }

    registry
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::audit::AuditLog;
    use crate::models::{Actor, RecordId};
    use crate::storage::Store;

    use super::{HookContext, StampQueue};

    pub fn actor() -> Actor {
        Actor::new(RecordId::new(0), "admin", true)
    }

    /// Context acting as `actor()` over `store`
    pub fn context(resource: &str, store: Arc<dyn Store>) -> HookContext {
        HookContext::new(
            resource,
            Some(actor()),
            store.clone(),
            AuditLog::new(store),
            Arc::new(StampQueue::in_memory()),
            Duration::from_secs(2),
        )
    }
}
