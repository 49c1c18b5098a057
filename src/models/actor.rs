//! The acting user
//!
//! An `Actor` is the identity a mutation is attributed to. It is resolved from
//! the session at the start of each mutation and handed to every hook.

use serde::{Deserialize, Serialize};

use super::ids::RecordId;
use super::record::Record;

/// Authenticated identity carried into hooks and audit entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Id of the user record
    pub id: RecordId,

    /// User name
    pub name: String,

    /// Whether the user holds admin rights
    #[serde(default)]
    pub admin: bool,
}

impl Actor {
    /// Create an actor
    pub fn new(id: RecordId, name: impl Into<String>, admin: bool) -> Self {
        Self {
            id,
            name: name.into(),
            admin,
        }
    }

    /// Build an actor from a `users` record
    pub fn from_user(user: &Record) -> Self {
        Self {
            id: user.id,
            name: user.get_str("name").unwrap_or_default().to_string(),
            admin: user
                .get("adminRights")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
        }
    }
}
