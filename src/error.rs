//! Custom error types for the asset register
//!
//! One error enum covers the whole crate. Variants map onto the failure
//! classes of a mutation: rejected input, missing records, code generation,
//! and the two swallowed classes (secondary writes and audit writes) that are
//! only ever logged.

use thiserror::Error;

/// The main error type for asset register operations
#[derive(Error, Debug)]
pub enum RegisterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Input rejected before anything was written
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record not found
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Record with the same key already exists
    #[error("{resource} already exists: {id}")]
    Duplicate { resource: String, id: String },

    /// Reference code could not be derived
    #[error("Sequence error: {0}")]
    Sequence(String),

    /// Follow-up write after a committed mutation failed
    #[error("Secondary write to {resource}/{id} failed: {reason}")]
    SecondaryWrite {
        resource: String,
        id: String,
        reason: String,
    },

    /// Audit entry could not be written
    #[error("Audit error: {0}")]
    Audit(String),

    /// Login / session errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl RegisterError {
    /// Create a "not found" error for a record of a resource
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Create a "duplicate" error for a record of a resource
    pub fn duplicate(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::Duplicate {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Create a secondary-write failure
    pub fn secondary_write(
        resource: impl Into<String>,
        id: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::SecondaryWrite {
            resource: resource.into(),
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a sequence error
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }
}

impl From<std::io::Error> for RegisterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RegisterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for asset register operations
pub type RegisterResult<T> = Result<T, RegisterError>;
