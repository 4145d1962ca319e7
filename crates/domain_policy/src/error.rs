//! Policy domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Policy does not exist or is not visible to the caller
    #[error("Policy not found: {0}")]
    NotFound(String),

    /// Invalid state transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: String,
        to: String,
    },

    /// Operation conflicts with existing data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage failure
    #[error("Storage error: {0}")]
    Store(#[source] PortError),
}

impl PolicyError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PolicyError::Validation(message.into())
    }

    /// Creates a not found error
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        PolicyError::NotFound(id.to_string())
    }
}

impl From<PortError> for PolicyError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => PolicyError::NotFound(id),
            PortError::Validation { message, .. } => PolicyError::Validation(message),
            PortError::Conflict { message } => PolicyError::Conflict(message),
            other => PolicyError::Store(other),
        }
    }
}
