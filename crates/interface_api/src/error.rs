//! API error handling
//!
//! Domain errors are translated here; every error reaches the client as
//! `{ error, message, details? }`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::{Money, PaymentId, PortError};
use domain_billing::BillingError;
use domain_claims::ClaimError;
use domain_policy::PolicyError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Payment of {requested} exceeds remaining balance of {remaining}")]
    ExceedsBalance { requested: Money, remaining: Money },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payment {payment_id} was recorded but the policy balance could not be updated")]
    ReconciliationFailure { payment_id: PaymentId },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_type, details) = match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            ApiError::Validation { details, .. } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                (!details.is_empty()).then_some(details),
            ),
            ApiError::InvalidState(_) => (StatusCode::BAD_REQUEST, "invalid_state", None),
            ApiError::ExceedsBalance { remaining, .. } => (
                StatusCode::BAD_REQUEST,
                "exceeds_balance",
                Some(vec![format!("remainingBalance: {}", remaining.amount())]),
            ),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", None),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict", None),
            ApiError::ReconciliationFailure { payment_id } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "reconciliation_failure",
                Some(vec![format!("paymentId: {}", payment_id.as_uuid())]),
            ),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", None),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => ApiError::NotFound(format!("{} {}", entity_type, id)),
            PortError::Validation { message, .. } => ApiError::validation(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            err if err.is_transient() => {
                error!(error = %err, "Store unavailable");
                ApiError::Unavailable("storage is temporarily unavailable".to_string())
            }
            err => {
                error!(error = %err, "Store failure");
                ApiError::Internal("storage failure".to_string())
            }
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Validation(message) => ApiError::validation(message),
            BillingError::NotFound(message) => ApiError::NotFound(message),
            BillingError::InvalidState(message) => ApiError::InvalidState(message),
            BillingError::ExceedsBalance { requested, remaining } => ApiError::ExceedsBalance { requested, remaining },
            BillingError::ReconciliationFailure { payment_id, .. } => ApiError::ReconciliationFailure { payment_id },
            BillingError::Conflict(message) => ApiError::Conflict(message),
            BillingError::Store(err) => err.into(),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Validation(message) => ApiError::validation(message),
            PolicyError::NotFound(id) => ApiError::NotFound(format!("Policy {}", id)),
            err @ PolicyError::InvalidStateTransition { .. } => ApiError::Conflict(err.to_string()),
            PolicyError::Conflict(message) => ApiError::Conflict(message),
            PolicyError::Store(err) => err.into(),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Validation(message) => ApiError::validation(message),
            ClaimError::PolicyNotFound(id) => ApiError::NotFound(format!("Policy {}", id)),
            ClaimError::Store(err) => err.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        details.sort();
        ApiError::Validation {
            message: "request validation failed".to_string(),
            details,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}
