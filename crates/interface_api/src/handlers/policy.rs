//! Policy handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::PolicyId;

use crate::auth::AuthUser;
use crate::dto::policy::*;
use crate::{error::ApiError, AppState};

/// Acquires a policy for the caller
pub async fn create_policy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreatePolicyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PolicyResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let policy = state
        .policies
        .acquire(user.user_id, request.into_application()?)
        .await?;
    Ok((StatusCode::CREATED, Json(policy.into())))
}

/// Lists the caller's policies
pub async fn list_policies(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ListPoliciesQuery>, QueryRejection>,
) -> Result<Json<Vec<PolicyResponse>>, ApiError> {
    let Query(query) = query?;
    let policies = state.policies.list(user.user_id, query.into_query()?).await?;
    Ok(Json(policies.into_iter().map(Into::into).collect()))
}

/// Gets one of the caller's policies
pub async fn get_policy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<PolicyId>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let policy = state.policies.get(user.user_id, id).await?;
    Ok(Json(policy.into()))
}

/// Updates a policy's terms (administrators only)
pub async fn update_policy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<PolicyId>,
    payload: Result<Json<UpdatePolicyRequest>, JsonRejection>,
) -> Result<Json<PolicyResponse>, ApiError> {
    user.require_admin()?;
    let Json(request) = payload?;
    request.validate()?;

    let policy = state.policies.update(id, request.into_changes()?).await?;
    Ok(Json(policy.into()))
}

/// Deletes one of the caller's policies
pub async fn delete_policy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<PolicyId>,
) -> Result<StatusCode, ApiError> {
    state.policies.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
