//! Batch numbering
//!
//! A batch gets `batchNumber = V{NN}/{YYYY}` right after the store assigns
//! its id. NN comes from scanning the other batches of the same year, so the
//! hook-set declares the `batches` sequence family and the dispatcher holds
//! that family's lock from the first before-hook to the last after-hook.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{RegisterError, RegisterResult};
use crate::models::batch::{normalize_year, BatchCode, NUMBER_FIELD, YEAR_FIELD};
use crate::models::resources::BATCHES;
use crate::models::{Fields, Record, RecordId};
use crate::sequence::next_batch_suffix;
use crate::storage::ListQuery;

use super::{HookContext, HookSet};

pub struct BatchHooks;

impl BatchHooks {
    /// Next code for `year`, ignoring the batch `exclude`
    async fn next_code(
        ctx: &HookContext,
        year: &str,
        exclude: Option<RecordId>,
    ) -> RegisterResult<String> {
        let same_year = ctx
            .store()
            .list(BATCHES, &ListQuery::all().filter_eq(YEAR_FIELD, year))
            .await?
            .data
            .into_iter()
            .filter(|batch| Some(batch.id) != exclude)
            .collect();
        let existing = ctx.with_pending(BATCHES, NUMBER_FIELD, same_year);

        let suffix = next_batch_suffix(&existing, year)?;
        let suffix: u32 = suffix
            .parse()
            .map_err(|_| RegisterError::Sequence(format!("Suffix '{}' out of range", suffix)))?;
        Ok(BatchCode::new(suffix, year).to_string())
    }
}

#[async_trait]
impl HookSet for BatchHooks {
    fn name(&self) -> &str {
        "batch_numbering"
    }

    fn owned_fields(&self) -> &[&'static str] {
        &[NUMBER_FIELD]
    }

    fn sequence_family(&self) -> Option<&str> {
        Some(BATCHES)
    }

    async fn before_create(&self, ctx: &HookContext, mut data: Fields) -> RegisterResult<Fields> {
        let year = normalize_year(data.get(YEAR_FIELD))?;

        if let Some(supplied) = data.remove(NUMBER_FIELD) {
            debug!(%supplied, "Ignoring caller-supplied batch number");
        }

        // Fails closed on malformed codes before anything is written
        let code = Self::next_code(ctx, &year, None).await?;
        debug!(%code, "Batch number available");

        data.insert(YEAR_FIELD.to_string(), year.into());
        Ok(data)
    }

    async fn after_create(&self, ctx: &HookContext, record: Record) -> RegisterResult<Record> {
        let year = record
            .get_str(YEAR_FIELD)
            .map(str::to_string)
            .ok_or_else(|| RegisterError::Sequence(format!("Batch {} has no year", record.id)))?;

        let code = Self::next_code(ctx, &year, Some(record.id)).await?;
        Ok(ctx.stamp(record, NUMBER_FIELD, code).await)
    }

    async fn before_update(
        &self,
        _ctx: &HookContext,
        previous: &Record,
        mut patch: Fields,
    ) -> RegisterResult<Fields> {
        if let Some(supplied) = patch.remove(NUMBER_FIELD) {
            if previous.get(NUMBER_FIELD) != Some(&supplied) {
                debug!(batch = %previous.id, %supplied, "Batch number is fixed, change dropped");
            }
        }

        if patch.contains_key(YEAR_FIELD) {
            let year = normalize_year(patch.get(YEAR_FIELD))?;
            if previous.get_str(YEAR_FIELD) != Some(year.as_str()) {
                return Err(RegisterError::Validation(format!(
                    "Year of receipt of batch {} cannot change",
                    previous.label()
                )));
            }
            patch.insert(YEAR_FIELD.to_string(), year.into());
        }

        Ok(patch)
    }
}
