//! Claims domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Policy not found: {0}")]
    PolicyNotFound(String),

    #[error("Storage error: {0}")]
    Store(#[source] PortError),
}

impl From<PortError> for ClaimError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => ClaimError::PolicyNotFound(id),
            PortError::Validation { message, .. } => ClaimError::Validation(message),
            other => ClaimError::Store(other),
        }
    }
}
