//! Billing domain errors

use core_kernel::{Money, MoneyError, PaymentId, PortError};
use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Policy or payment does not exist (or is not visible to the caller)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The policy cannot take payments in its current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The payment is larger than what is left to pay
    #[error("Payment of {requested} exceeds remaining balance of {remaining}")]
    ExceedsBalance {
        requested: Money,
        remaining: Money,
    },

    /// The payment was stored but the policy balance could not be updated
    #[error("Balance reconciliation failed for payment {payment_id}: {reason}")]
    ReconciliationFailure {
        payment_id: PaymentId,
        reason: String,
    },

    /// Conflicts with existing data, e.g. a duplicate reference
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage failure
    #[error("Storage error: {0}")]
    Store(#[source] PortError),
}

impl BillingError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    /// Creates an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        BillingError::InvalidState(message.into())
    }

    /// Creates a not found error
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        BillingError::NotFound(format!("{} {}", entity, id))
    }
}

impl From<PortError> for BillingError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => BillingError::NotFound(format!("{} {}", entity_type, id)),
            PortError::Validation { message, .. } => BillingError::Validation(message),
            PortError::Conflict { message } => BillingError::Conflict(message),
            other => BillingError::Store(other),
        }
    }
}

impl From<MoneyError> for BillingError {
    fn from(err: MoneyError) -> Self {
        BillingError::Validation(err.to_string())
    }
}
