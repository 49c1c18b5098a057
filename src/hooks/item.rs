//! Item numbering
//!
//! An item's `item_number` is its batch's code followed by `(id + 1)`, so it
//! can only be computed once the store has assigned the id. It is stamped
//! exactly once and dropped from every later update.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{RegisterError, RegisterResult};
use crate::models::item::{item_code, BATCH_FIELD, NUMBER_FIELD};
use crate::models::resources::{BATCHES, ITEMS};
use crate::models::{batch, Fields, Record, RecordId};
use crate::sequence::next_item_suffix;

use super::{HookContext, HookSet};

pub struct ItemHooks;

/// Read `batchId`, given as a number or a numeric string
fn batch_id(value: Option<&Value>) -> RegisterResult<RecordId> {
    let id = match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    id.map(RecordId::new)
        .ok_or_else(|| RegisterError::Validation("Item needs a valid batchId".into()))
}

/// The owning batch's code, including one still waiting to be stamped
async fn batch_code(ctx: &HookContext, id: RecordId) -> RegisterResult<String> {
    let batch = ctx.store().get(BATCHES, id).await.map_err(|e| {
        if e.is_not_found() {
            RegisterError::Validation(format!("Batch {} does not exist", id))
        } else {
            e
        }
    })?;

    ctx.field_or_pending(BATCHES, &batch, batch::NUMBER_FIELD)
        .ok_or_else(|| RegisterError::Sequence(format!("Batch {} has no batch number yet", id)))
}

#[async_trait]
impl HookSet for ItemHooks {
    fn name(&self) -> &str {
        "item_numbering"
    }

    fn owned_fields(&self) -> &[&'static str] {
        &[NUMBER_FIELD]
    }

    fn sequence_family(&self) -> Option<&str> {
        Some(ITEMS)
    }

    async fn before_create(&self, ctx: &HookContext, mut data: Fields) -> RegisterResult<Fields> {
        data.remove(NUMBER_FIELD);
        let batch = batch_id(data.get(BATCH_FIELD))?;
        batch_code(ctx, batch).await?;
        data.insert(BATCH_FIELD.to_string(), Value::from(batch.value()));
        Ok(data)
    }

    async fn after_create(&self, ctx: &HookContext, record: Record) -> RegisterResult<Record> {
        let batch = batch_id(record.get(BATCH_FIELD))?;
        let code = batch_code(ctx, batch).await?;
        let number = item_code(&code, &next_item_suffix(record.id));
        Ok(ctx.stamp(record, NUMBER_FIELD, number).await)
    }

    async fn before_update(
        &self,
        ctx: &HookContext,
        previous: &Record,
        mut patch: Fields,
    ) -> RegisterResult<Fields> {
        if patch.remove(NUMBER_FIELD).is_some() {
            debug!(item = %previous.id, "Item number is fixed, change dropped");
        }

        if patch.contains_key(BATCH_FIELD) {
            let batch = batch_id(patch.get(BATCH_FIELD))?;
            batch_code(ctx, batch).await?;
            patch.insert(BATCH_FIELD.to_string(), Value::from(batch.value()));
        }

        Ok(patch)
    }
}
