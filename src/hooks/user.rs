//! User accounts
//!
//! Names must be present and unique. Passwords are stored as Argon2 hashes
//! and never appear in audit detail.

use async_trait::async_trait;
use serde_json::Value;

use crate::audit::{generate_diff, ActivityType};
use crate::auth::{hash_password, is_hashed};
use crate::error::{RegisterError, RegisterResult};
use crate::models::resources::USERS;
use crate::models::{Fields, Record, RecordId};
use crate::storage::ListQuery;

use super::{HookContext, HookSet};

const NAME_FIELD: &str = "name";
const PASSWORD_FIELD: &str = "password";

pub struct UserHooks;

impl UserHooks {
    async fn check_name(
        ctx: &HookContext,
        name: Option<&Value>,
        own_id: Option<RecordId>,
    ) -> RegisterResult<()> {
        let name = name
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RegisterError::Validation("User name is required".into()))?;

        let taken = ctx
            .store()
            .list(USERS, &ListQuery::all().filter_eq(NAME_FIELD, name))
            .await?
            .data
            .iter()
            .any(|user| Some(user.id) != own_id);
        if taken {
            return Err(RegisterError::Validation(format!(
                "User name '{}' is already taken",
                name
            )));
        }
        Ok(())
    }

    fn hash_in_place(fields: &mut Fields) -> RegisterResult<()> {
        let plain = match fields.get(PASSWORD_FIELD) {
            Some(Value::String(s)) if !is_hashed(s) => s.clone(),
            Some(Value::String(_)) | None => return Ok(()),
            Some(_) => {
                return Err(RegisterError::Validation(
                    "Password must be a string".into(),
                ))
            }
        };
        if plain.is_empty() {
            return Err(RegisterError::Validation("Password cannot be empty".into()));
        }
        fields.insert(PASSWORD_FIELD.to_string(), hash_password(&plain)?.into());
        Ok(())
    }
}

#[async_trait]
impl HookSet for UserHooks {
    fn name(&self) -> &str {
        "users"
    }

    fn owned_fields(&self) -> &[&'static str] {
        &[PASSWORD_FIELD]
    }

    async fn before_create(&self, ctx: &HookContext, mut data: Fields) -> RegisterResult<Fields> {
        Self::check_name(ctx, data.get(NAME_FIELD), None).await?;
        Self::hash_in_place(&mut data)?;
        Ok(data)
    }

    async fn before_update(
        &self,
        ctx: &HookContext,
        previous: &Record,
        mut patch: Fields,
    ) -> RegisterResult<Fields> {
        if patch.contains_key(NAME_FIELD) {
            Self::check_name(ctx, patch.get(NAME_FIELD), Some(previous.id)).await?;
        }
        Self::hash_in_place(&mut patch)?;
        Ok(patch)
    }

    fn describe(
        &self,
        activity: ActivityType,
        previous: Option<&Record>,
        record: &Record,
    ) -> Option<String> {
        let previous = previous?;
        if activity != ActivityType::Edit {
            return None;
        }
        let changes = generate_diff(&previous.fields, &record.fields, &[PASSWORD_FIELD])
            .unwrap_or_else(|| "no changes".to_string());
        Some(format!("Updated user {}: {}", record.label(), changes))
    }
}
