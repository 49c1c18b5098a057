//! Audit trail for the asset register
//!
//! Every mutation that passes through the lifecycle dispatcher, and every
//! login and logout, appends one entry to the `audit` resource.
//!
//! - `AuditEntry` / `ActivityType`: the persisted entry shape.
//! - `AuditLog`: the only writer of entries; skips silently without an actor
//!   and swallows write failures after logging them.
//! - `generate_diff`: the default `activityDetail` of an edit.
//!
//! # Example
//!
//! ```rust,ignore
//! use asset_register::audit::{ActivityType, AuditLog};
//!
//! let log = AuditLog::new(store.clone());
//! log.record(Some(&actor), ActivityType::Create, "batches", Some(id), "Created batch V00/2025")
//!     .await;
//! let trail = log.history("batches", id).await?;
//! ```

mod diff;
mod entry;
mod log;

pub use diff::generate_diff;
pub use entry::{ActivityType, AuditEntry};
pub use log::AuditLog;
