//! Core data models for the asset register
//!
//! Records are generic field maps; batches and items add reference-code
//! conventions on top of them.

pub mod actor;
pub mod batch;
pub mod ids;
pub mod item;
pub mod record;
pub mod resources;

pub use actor::Actor;
pub use batch::BatchCode;
pub use ids::{RecordId, SessionId};
pub use record::{fields_from, Fields, Record};
