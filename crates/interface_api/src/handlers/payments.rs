//! Payment handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::PaymentId;

use crate::auth::AuthUser;
use crate::dto::payment::*;
use crate::{error::ApiError, AppState};

/// Submits a payment against one of the caller's policies
///
/// Responds with the stored payment and the policy's balance after
/// reconciliation.
pub async fn submit_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentWithBalanceResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let receipt = state
        .payments
        .submit_payment(user.user_id, request.into_request()?)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// Lists the caller's payments, newest first
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<PaymentWithBalanceResponse>>, ApiError> {
    let payments = state.payments.list_payments(user.user_id).await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}

/// Gets one payment; other users' payments are only visible to administrators
pub async fn get_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<PaymentId>,
) -> Result<Json<PaymentEnvelope>, ApiError> {
    let payment = state.payments.get_payment(id).await?;
    if payment.user_id != user.user_id && !user.is_admin() {
        return Err(ApiError::NotFound(format!("Payment {}", id)));
    }
    Ok(Json(PaymentEnvelope {
        payment: payment.into(),
    }))
}

/// Changes a payment's status (administrators only)
pub async fn update_payment_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<PaymentId>,
    payload: Result<Json<UpdatePaymentStatusRequest>, JsonRejection>,
) -> Result<Json<PaymentEnvelope>, ApiError> {
    user.require_admin()?;
    let Json(request) = payload?;
    request.validate()?;

    let payment = state
        .payments
        .update_payment_status(id, request.into_update()?)
        .await?;
    Ok(Json(PaymentEnvelope {
        payment: payment.into(),
    }))
}
