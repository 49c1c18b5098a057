//! Service layer for the asset register
//!
//! Services sit on top of the lifecycle dispatcher and shape its results for
//! callers such as the CLI.

pub mod item_form;

pub use item_form::{ItemFormService, SaveIntent, SubmitOutcome};
