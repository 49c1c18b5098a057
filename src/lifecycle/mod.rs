//! Lifecycle dispatcher
//!
//! `LifecycleStore` wraps a raw store with the hook pipeline and the audit
//! log. It implements `Store` itself, so everything above the storage layer
//! uses it exactly like a plain backend.
//!
//! For a resource with hook-sets, each mutation runs:
//!
//! 1. the before-hooks, in registration order; any error rejects the
//!    mutation and nothing is written;
//! 2. the store write;
//! 3. the after-hooks, whose errors are logged and otherwise ignored;
//! 4. one audit entry, when an actor is signed in.
//!
//! Resources without hook-sets go straight to the store, unaudited.

mod stage;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::audit::{generate_diff, ActivityType, AuditLog};
use crate::auth::ActorProvider;
use crate::error::RegisterResult;
use crate::hooks::{
    HookContext, HookRegistry, HookSet, PendingStamp, StampQueue, StampRetryReport,
};
use crate::models::resources::singular;
use crate::models::{Fields, Record, RecordId};
use crate::sequence::FamilyLocks;
use crate::storage::{ListQuery, ListResult, Store};

pub use stage::MutationStage;
use stage::Mutation;

/// Default bound on a stamping write
pub const DEFAULT_STAMP_TIMEOUT: Duration = Duration::from_secs(2);

/// Store facade running hooks and audit around every mutation
pub struct LifecycleStore {
    inner: Arc<dyn Store>,
    registry: HookRegistry,
    actors: Arc<dyn ActorProvider>,
    audit: AuditLog,
    locks: FamilyLocks,
    stamps: Arc<StampQueue>,
    stamp_timeout: Duration,
}

/// Builder for `LifecycleStore`
pub struct LifecycleStoreBuilder {
    inner: Arc<dyn Store>,
    registry: HookRegistry,
    actors: Option<Arc<dyn ActorProvider>>,
    audit_enabled: bool,
    stamps: Option<Arc<StampQueue>>,
    stamp_timeout: Duration,
}

impl LifecycleStoreBuilder {
    pub fn registry(mut self, registry: HookRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Where the acting user comes from; without one nothing is audited
    pub fn actors(mut self, actors: Arc<dyn ActorProvider>) -> Self {
        self.actors = Some(actors);
        self
    }

    pub fn audit_enabled(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    pub fn stamp_queue(mut self, stamps: Arc<StampQueue>) -> Self {
        self.stamps = Some(stamps);
        self
    }

    pub fn stamp_timeout(mut self, timeout: Duration) -> Self {
        self.stamp_timeout = timeout;
        self
    }

    pub fn build(self) -> LifecycleStore {
        for conflict in self.registry.ownership_conflicts() {
            warn!(%conflict, "Hook-sets claim the same field");
        }

        let actors = self
            .actors
            .unwrap_or_else(|| Arc::new(crate::auth::Session::anonymous()));

        LifecycleStore {
            audit: AuditLog::new(self.inner.clone()).with_enabled(self.audit_enabled),
            inner: self.inner,
            registry: self.registry,
            actors,
            locks: FamilyLocks::new(),
            stamps: self.stamps.unwrap_or_default(),
            stamp_timeout: self.stamp_timeout,
        }
    }
}

impl LifecycleStore {
    /// Start building a dispatcher over a raw store
    pub fn builder(inner: Arc<dyn Store>) -> LifecycleStoreBuilder {
        LifecycleStoreBuilder {
            inner,
            registry: HookRegistry::new(),
            actors: None,
            audit_enabled: true,
            stamps: None,
            stamp_timeout: DEFAULT_STAMP_TIMEOUT,
        }
    }

    /// The raw store underneath
    pub fn inner(&self) -> &Arc<dyn Store> {
        &self.inner
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Stamps waiting to be retried
    pub fn pending_stamps(&self) -> Vec<PendingStamp> {
        self.stamps.snapshot()
    }

    /// Re-apply queued stamps under their families' locks
    ///
    /// A stamp leaves the queue only once its write has landed, so readers
    /// overlaying pending values never see a gap.
    pub async fn retry_pending_stamps(&self) -> RegisterResult<StampRetryReport> {
        let queued = self.stamps.snapshot();
        if queued.is_empty() {
            return Ok(StampRetryReport::default());
        }

        let mut families: Vec<String> = queued
            .iter()
            .flat_map(|stamp| self.registry.families_for(&stamp.resource))
            .collect();
        families.sort();
        families.dedup();
        let family_refs: Vec<&str> = families.iter().map(String::as_str).collect();
        let _guards = self.locks.acquire(&family_refs).await;

        let mut applied = 0;
        let mut remaining = 0;
        for mut stamp in queued {
            let mut patch = Fields::new();
            patch.insert(stamp.field.clone(), Value::String(stamp.value.clone()));

            let write = self.inner.update(&stamp.resource, stamp.id, patch);
            match tokio::time::timeout(self.stamp_timeout, write).await {
                Ok(Ok(_)) => {
                    info!(resource = %stamp.resource, id = %stamp.id, value = %stamp.value, "Applied pending stamp");
                    self.stamps.resolve(&stamp);
                    applied += 1;
                }
                Ok(Err(e)) if e.is_not_found() => {
                    debug!(resource = %stamp.resource, id = %stamp.id, "Record gone, stamp dropped");
                    self.stamps.resolve(&stamp);
                }
                Ok(Err(e)) => {
                    stamp.record_failure(e.to_string());
                    self.stamps.update(&stamp);
                    remaining += 1;
                }
                Err(_) => {
                    stamp.record_failure(format!(
                        "timed out after {} ms",
                        self.stamp_timeout.as_millis()
                    ));
                    self.stamps.update(&stamp);
                    remaining += 1;
                }
            }
        }

        Ok(StampRetryReport { applied, remaining })
    }

    fn context(&self, resource: &str) -> HookContext {
        HookContext::new(
            resource,
            self.actors.current_actor(),
            self.inner.clone(),
            self.audit.clone(),
            self.stamps.clone(),
            self.stamp_timeout,
        )
    }

    fn describe(
        hooks: &[Arc<dyn HookSet>],
        activity: ActivityType,
        resource: &str,
        previous: Option<&Record>,
        record: &Record,
    ) -> String {
        if let Some(detail) = hooks
            .iter()
            .find_map(|hook| hook.describe(activity, previous, record))
        {
            return detail;
        }

        let noun = singular(resource);
        match (activity, previous) {
            (ActivityType::Edit, Some(previous)) => {
                let changes = generate_diff(&previous.fields, &record.fields, &[])
                    .unwrap_or_else(|| "no changes".to_string());
                format!("Updated {} {}: {}", noun, record.label(), changes)
            }
            (ActivityType::Delete, _) => format!("Deleted {} {}", noun, record.label()),
            _ => format!("Created {} {}", noun, record.label()),
        }
    }
}

fn families(hooks: &[Arc<dyn HookSet>]) -> Vec<&str> {
    hooks.iter().filter_map(|hook| hook.sequence_family()).collect()
}

#[async_trait]
impl Store for LifecycleStore {
    async fn create(&self, resource: &str, data: Fields) -> RegisterResult<Record> {
        let hooks = self.registry.hooks_for(resource);
        if hooks.is_empty() {
            return self.inner.create(resource, data).await;
        }

        let mut mutation = Mutation::new(ActivityType::Create, resource);
        let ctx = self.context(resource);
        let _guards = self.locks.acquire(&families(&hooks)).await;

        mutation.advance(MutationStage::BeforeHooks);
        let mut data = data;
        for hook in &hooks {
            data = match hook.before_create(&ctx, data).await {
                Ok(data) => data,
                Err(e) => {
                    mutation.reject(hook.name(), &e);
                    return Err(e);
                }
            };
        }

        mutation.advance(MutationStage::StoreWrite);
        let mut record = self.inner.create(resource, data).await?;

        mutation.advance(MutationStage::AfterHooks);
        for hook in &hooks {
            match hook.after_create(&ctx, record.clone()).await {
                Ok(updated) => record = updated,
                Err(e) => {
                    warn!(resource, id = %record.id, hook_set = hook.name(), error = %e, "after_create failed")
                }
            }
        }

        let detail = Self::describe(&hooks, ActivityType::Create, resource, None, &record);
        self.audit
            .record(ctx.actor(), ActivityType::Create, resource, Some(record.id), &detail)
            .await;
        mutation.advance(MutationStage::Audited);

        mutation.advance(MutationStage::Complete);
        Ok(record)
    }

    async fn update(&self, resource: &str, id: RecordId, patch: Fields) -> RegisterResult<Record> {
        let hooks = self.registry.hooks_for(resource);
        if hooks.is_empty() {
            return self.inner.update(resource, id, patch).await;
        }

        let mut mutation = Mutation::new(ActivityType::Edit, resource);
        let ctx = self.context(resource);
        let _guards = self.locks.acquire(&families(&hooks)).await;
        let previous = self.inner.get(resource, id).await?;

        mutation.advance(MutationStage::BeforeHooks);
        let mut patch = patch;
        for hook in &hooks {
            patch = match hook.before_update(&ctx, &previous, patch).await {
                Ok(patch) => patch,
                Err(e) => {
                    mutation.reject(hook.name(), &e);
                    return Err(e);
                }
            };
        }

        mutation.advance(MutationStage::StoreWrite);
        let mut record = self.inner.update(resource, id, patch).await?;

        mutation.advance(MutationStage::AfterHooks);
        for hook in &hooks {
            match hook.after_update(&ctx, &previous, record.clone()).await {
                Ok(updated) => record = updated,
                Err(e) => {
                    warn!(resource, %id, hook_set = hook.name(), error = %e, "after_update failed")
                }
            }
        }

        let detail = Self::describe(
            &hooks,
            ActivityType::Edit,
            resource,
            Some(&previous),
            &record,
        );
        self.audit
            .record(ctx.actor(), ActivityType::Edit, resource, Some(id), &detail)
            .await;
        mutation.advance(MutationStage::Audited);

        mutation.advance(MutationStage::Complete);
        Ok(record)
    }

    async fn delete(&self, resource: &str, id: RecordId) -> RegisterResult<Record> {
        let hooks = self.registry.hooks_for(resource);
        if hooks.is_empty() {
            return self.inner.delete(resource, id).await;
        }

        let mut mutation = Mutation::new(ActivityType::Delete, resource);
        let ctx = self.context(resource);
        let _guards = self.locks.acquire(&families(&hooks)).await;
        let previous = self.inner.get(resource, id).await?;

        mutation.advance(MutationStage::BeforeHooks);
        for hook in &hooks {
            if let Err(e) = hook.before_delete(&ctx, &previous).await {
                mutation.reject(hook.name(), &e);
                return Err(e);
            }
        }

        mutation.advance(MutationStage::StoreWrite);
        let mut record = self.inner.delete(resource, id).await?;

        mutation.advance(MutationStage::AfterHooks);
        for hook in &hooks {
            match hook.after_delete(&ctx, record.clone()).await {
                Ok(updated) => record = updated,
                Err(e) => {
                    warn!(resource, %id, hook_set = hook.name(), error = %e, "after_delete failed")
                }
            }
        }

        let detail = Self::describe(
            &hooks,
            ActivityType::Delete,
            resource,
            Some(&previous),
            &record,
        );
        self.audit
            .record(ctx.actor(), ActivityType::Delete, resource, Some(previous.id), &detail)
            .await;
        mutation.advance(MutationStage::Audited);

        mutation.advance(MutationStage::Complete);
        Ok(record)
    }

    async fn get(&self, resource: &str, id: RecordId) -> RegisterResult<Record> {
        self.inner.get(resource, id).await
    }

    async fn list(&self, resource: &str, query: &ListQuery) -> RegisterResult<ListResult> {
        self.inner.list(resource, query).await
    }
}
