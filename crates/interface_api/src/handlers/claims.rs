//! Claims handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use crate::auth::AuthUser;
use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Reports a loss against one of the caller's policies
pub async fn create_claim(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateClaimRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let claim = state.claims.report(user.user_id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// Lists the caller's claims with their policy types
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let claims = state.claims.list(user.user_id).await?;
    Ok(Json(claims.into_iter().map(Into::into).collect()))
}
