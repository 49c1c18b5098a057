//! Storage layer for the asset register
//!
//! Defines the `Store` interface and ships `JsonStore`, a backend keeping one
//! JSON file per resource with atomic writes.

pub mod collection;
pub mod file_io;
pub mod init;
pub mod json_store;
pub mod query;
pub mod store;

pub use file_io::{read_json, write_json_atomic};
pub use init::seed_defaults;
pub use json_store::JsonStore;
pub use query::{ListQuery, ListResult, Pagination, Sort, SortOrder};
pub use store::Store;
