//! Cascading deletes
//!
//! Deleting a parent record deletes the child records pointing at it. Each
//! child deletion is audited on its own.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::audit::ActivityType;
use crate::error::{RegisterError, RegisterResult};
use crate::models::resources::{singular, ITEMS};
use crate::models::{item, Record};
use crate::storage::ListQuery;

use super::{HookContext, HookSet};

pub struct CascadeDelete {
    child: &'static str,
    foreign_key: &'static str,
}

impl CascadeDelete {
    pub fn new(child: &'static str, foreign_key: &'static str) -> Self {
        Self { child, foreign_key }
    }

    /// Items of a deleted batch
    pub fn batch_items() -> Self {
        Self::new(ITEMS, item::BATCH_FIELD)
    }
}

#[async_trait]
impl HookSet for CascadeDelete {
    fn name(&self) -> &str {
        "cascade_delete"
    }

    /// Children must not be created under the parent while it is being deleted
    fn sequence_family(&self) -> Option<&str> {
        Some(self.child)
    }

    async fn after_delete(&self, ctx: &HookContext, record: Record) -> RegisterResult<Record> {
        let children = ctx
            .store()
            .list(
                self.child,
                &ListQuery::all().filter_eq(self.foreign_key, record.id.value()),
            )
            .await?
            .data;
        debug!(parent = %record.id, count = children.len(), child = self.child, "Cascading delete");

        let mut failed = Vec::new();
        for child in children {
            match ctx.store().delete(self.child, child.id).await {
                Ok(removed) => {
                    let detail = format!(
                        "Deleted {} {} with {} {}",
                        singular(self.child),
                        removed.label(),
                        singular(ctx.resource()),
                        record.label()
                    );
                    ctx.audit()
                        .record(
                            ctx.actor(),
                            ActivityType::Delete,
                            self.child,
                            Some(removed.id),
                            &detail,
                        )
                        .await;
                }
                Err(e) => {
                    warn!(child = %child.id, error = %e, "Cascade delete failed");
                    failed.push(child.id.to_string());
                }
            }
        }

        if failed.is_empty() {
            Ok(record)
        } else {
            Err(RegisterError::secondary_write(
                self.child,
                failed.join(","),
                "cascade delete incomplete",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::test_support::context;
    use crate::models::fields_from;
    use crate::models::resources::{AUDIT, BATCHES};
    use crate::storage::{JsonStore, Store};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_children_deleted_and_audited() {
        let store: Arc<dyn Store> = Arc::new(JsonStore::in_memory());
        for (batch, number) in [(0, "V00/2025/01"), (1, "V01/2025/02"), (0, "V00/2025/03")] {
            store
                .create(ITEMS, fields_from(json!({"batchId": batch, "item_number": number})))
                .await
                .unwrap();
        }
        let ctx = context(BATCHES, store.clone());
        let batch = Record::new(
            crate::models::RecordId::new(0),
            fields_from(json!({"batchNumber": "V00/2025"})),
        );

        CascadeDelete::batch_items()
            .after_delete(&ctx, batch)
            .await
            .unwrap();

        let left = store.list(ITEMS, &ListQuery::all()).await.unwrap();
        assert_eq!(left.total, 1);
        assert_eq!(left.data[0].get_str("item_number"), Some("V01/2025/02"));

        let audit = store.list(AUDIT, &ListQuery::all()).await.unwrap();
        assert_eq!(audit.total, 2);
        assert_eq!(
            audit.data[0].get_str("activityDetail"),
            Some("Deleted item V00/2025/01 with batch V00/2025")
        );
    }
}
