//! Item reference codes
//!
//! An item's code extends its batch's code with the item's own sequence
//! position: `{batchNumber}/{MM}`.

/// Foreign key to the owning batch
pub const BATCH_FIELD: &str = "batchId";

/// Derived field holding the item code
pub const NUMBER_FIELD: &str = "item_number";

/// Join a batch code and an item suffix
pub fn item_code(batch_number: &str, suffix: &str) -> String {
    format!("{}/{}", batch_number, suffix)
}
