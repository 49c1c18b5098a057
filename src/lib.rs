//! asset-register - media asset register with lifecycle hooks
//!
//! Records of every resource live behind one generic [`storage::Store`].
//! [`lifecycle::LifecycleStore`] wraps that store and runs per-resource hook
//! sets around each mutation: batches get a `V{NN}/{YYYY}` number, items get
//! `{batch}/{MM}`, and every change made by a signed-in user is appended to
//! the audit trail.
//!
//! # Architecture
//!
//! - `config`: configuration and path management
//! - `error`: custom error types
//! - `models`: records, ids, actors, code formats
//! - `storage`: the `Store` trait and its JSON file backend
//! - `sequence`: next-suffix rules and per-family locks
//! - `audit`: audit entries and the audit log
//! - `auth`: password hashing, sessions and login
//! - `hooks`: hook sets and their registry
//! - `lifecycle`: the dispatcher that runs hooks around store calls
//! - `services`: the item entry form
//! - `export`: JSON, CSV and YAML export
//! - `display`, `cli`: terminal output and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use asset_register::hooks::default_registry;
//! use asset_register::lifecycle::LifecycleStore;
//! use asset_register::storage::{JsonStore, Store};
//!
//! let raw = Arc::new(JsonStore::open(paths.data_dir())?);
//! let store = LifecycleStore::builder(raw)
//!     .registry(default_registry(&settings))
//!     .build();
//! let batch = store.create("batches", fields).await?;
//! ```

pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod hooks;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod sequence;
pub mod services;
pub mod storage;

pub use error::{RegisterError, RegisterResult};
