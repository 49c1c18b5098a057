//! Storage initialization
//!
//! Handles first-run setup: an admin account and the reference-data lists
//! the item and batch forms pick from.

use serde_json::json;
use tracing::info;

use crate::auth::hash_password;
use crate::error::RegisterResult;
use crate::models::fields_from;
use crate::models::resources::{
    DEPARTMENTS, MEDIA_TYPES, ORGANISATIONS, PLATFORM_ORIGINATORS, PROTECTIVE_MARKINGS,
    PROTECTIVE_MARKING_AUTHORITIES, USERS, VAULT_LOCATIONS,
};

use super::query::ListQuery;
use super::store::Store;

/// Name of the account created on first run
pub const DEFAULT_ADMIN: &str = "admin";

fn default_reference_data() -> [(&'static str, &'static [&'static str]); 7] {
    [
        (VAULT_LOCATIONS, &["Main Vault", "Annex", "Off-site Store"]),
        (ORGANISATIONS, &["Headquarters", "Regional Office"]),
        (PLATFORM_ORIGINATORS, &["Internal", "Contractor"]),
        (PROTECTIVE_MARKINGS, &["Official", "Official-Sensitive", "Secret"]),
        (MEDIA_TYPES, &["DVD", "CD", "Tape", "Paper", "Hard Drive"]),
        (PROTECTIVE_MARKING_AUTHORITIES, &["Originator", "Security Office"]),
        (DEPARTMENTS, &["Operations", "Engineering", "Records"]),
    ]
}

/// Write default data straight to the raw store
///
/// Each resource is only seeded while it is empty, so this is safe to run on
/// every start. Returns the number of records written.
pub async fn seed_defaults(store: &dyn Store, admin_password: &str) -> RegisterResult<usize> {
    let mut written = 0;

    if is_empty(store, USERS).await? {
        store
            .create(
                USERS,
                fields_from(json!({
                    "name": DEFAULT_ADMIN,
                    "password": hash_password(admin_password)?,
                    "adminRights": true,
                })),
            )
            .await?;
        written += 1;
    }

    for (resource, names) in default_reference_data() {
        if !is_empty(store, resource).await? {
            continue;
        }
        for (position, name) in names.iter().enumerate() {
            store
                .create(
                    resource,
                    fields_from(json!({ "name": name, "active": true, "position": position })),
                )
                .await?;
            written += 1;
        }
    }

    if written > 0 {
        info!(records = written, "Seeded default data");
    }
    Ok(written)
}

async fn is_empty(store: &dyn Store, resource: &str) -> RegisterResult<bool> {
    let page = store
        .list(resource, &ListQuery::all().paginate(1, 1))
        .await?;
    Ok(page.total == 0)
}
