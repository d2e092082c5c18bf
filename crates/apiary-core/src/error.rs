//! Error types for Apiary operations.
//!
//! No error here is fatal to the colony: validation failures are rejected at
//! the producer boundary and never enter a shared structure, and `Shutdown`
//! is the sentinel returned instead of blocking once `stop()` has begun.

use thiserror::Error;

/// Result type for Apiary operations.
pub type Result<T> = std::result::Result<T, ApiaryError>;

/// Errors that can occur during Apiary operations.
#[derive(Debug, Clone, Error)]
pub enum ApiaryError {
    /// A malformed item or event was rejected at a producer boundary.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// The operation was attempted after shutdown began.
    #[error("shutdown in progress")]
    Shutdown,

    /// A configuration field is invalid.
    #[error("invalid config for {field}: {reason}")]
    Config { field: String, reason: String },
}

impl ApiaryError {
    pub fn validation(reason: impl Into<String>) -> Self {
        ApiaryError::Validation {
            reason: reason.into(),
        }
    }

    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ApiaryError::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
