//! Creation stamps
//!
//! Injects `createdAt` (RFC 3339, UTC) and `createdBy` (actor id) on create.
//! Both are write-once: update patches are stripped of them.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::error::RegisterResult;
use crate::models::{Fields, Record};

use super::{HookContext, HookSet};

pub const CREATED_AT: &str = "createdAt";
pub const CREATED_BY: &str = "createdBy";

pub struct Timestamps;

#[async_trait]
impl HookSet for Timestamps {
    fn name(&self) -> &str {
        "timestamps"
    }

    fn owned_fields(&self) -> &[&'static str] {
        &[CREATED_AT, CREATED_BY]
    }

    async fn before_create(&self, ctx: &HookContext, mut data: Fields) -> RegisterResult<Fields> {
        data.insert(
            CREATED_AT.to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        match ctx.actor_id() {
            Some(id) => {
                data.insert(CREATED_BY.to_string(), Value::from(id.value()));
            }
            None => {
                data.remove(CREATED_BY);
            }
        }
        Ok(data)
    }

    async fn before_update(
        &self,
        _ctx: &HookContext,
        _previous: &Record,
        mut patch: Fields,
    ) -> RegisterResult<Fields> {
        patch.remove(CREATED_AT);
        patch.remove(CREATED_BY);
        Ok(patch)
    }
}
