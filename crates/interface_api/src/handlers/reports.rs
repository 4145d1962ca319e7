//! Report handlers

use axum::{extract::State, Extension, Json};

use crate::auth::AuthUser;
use crate::dto::policy::PolicyResponse;
use crate::dto::reports::*;
use crate::{error::ApiError, AppState};

/// Totals over the caller's policies and payments
pub async fn statistics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let stats = state.reports.account_statistics(user.user_id).await?;
    Ok(Json(stats.into()))
}

/// The caller's payments with their policy types
pub async fn payment_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<PaymentHistoryItem>>, ApiError> {
    let history = state.reports.payment_history(user.user_id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// The caller's policies, most recently acquired first
pub async fn policy_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<PolicyResponse>>, ApiError> {
    let policies = state.reports.policy_history(user.user_id).await?;
    Ok(Json(policies.into_iter().map(Into::into).collect()))
}
