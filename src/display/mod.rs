//! Display formatting for terminal output
//!
//! Provides utilities for formatting records, audit entries and the stamp
//! queue for terminal display.

pub mod audit;
pub mod records;

pub use audit::format_audit_list;
pub use records::{
    display_value, format_pending_stamps, format_record_details, format_record_table,
};
