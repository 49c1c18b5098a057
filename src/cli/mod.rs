//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the lifecycle store.

pub mod app;
pub mod audit;
pub mod auth;
pub mod batch;
pub mod item;
pub mod record;
pub mod stamps;

pub use app::RegisterApp;
pub use audit::{handle_audit_command, AuditCommands};
pub use auth::{handle_login, handle_logout, handle_whoami};
pub use batch::{handle_batch_command, BatchCommands};
pub use item::{handle_item_command, ItemCommands};
pub use record::{handle_record_command, RecordCommands};
pub use stamps::{handle_stamps_command, StampsCommands};

use serde_json::Value;

use crate::error::{RegisterError, RegisterResult};
use crate::models::Fields;

/// Parse `key=value` arguments into a field map
///
/// Values that parse as JSON (numbers, booleans, arrays, quoted strings) keep
/// their type; anything else is taken as a plain string.
pub fn parse_assignments(assignments: &[String]) -> RegisterResult<Fields> {
    let mut fields = Fields::new();
    for assignment in assignments {
        let (key, raw) = assignment.split_once('=').ok_or_else(|| {
            RegisterError::Validation(format!(
                "Expected key=value, got '{}'",
                assignment
            ))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(RegisterError::Validation(format!(
                "Missing field name in '{}'",
                assignment
            )));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}
