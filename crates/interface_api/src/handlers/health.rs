//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use core_kernel::{HealthCheckResult, HealthCheckable};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub adapter: String,
    pub healthy: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<HealthCheckResult> for ComponentHealth {
    fn from(r: HealthCheckResult) -> Self {
        Self {
            healthy: r.is_operational(),
            adapter: r.adapter_id,
            latency_ms: r.latency_ms,
            message: r.message,
        }
    }
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub components: Vec<ComponentHealth>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check (includes the stores)
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let stores = state.stores();
    let results = [
        stores.policies.health_check().await,
        stores.billing.health_check().await,
        stores.claims.health_check().await,
    ];
    let ready = results.iter().all(HealthCheckResult::is_operational);

    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = ReadinessResponse {
        status: if ready { "ready" } else { "unavailable" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components: results.into_iter().map(ComponentHealth::from).collect(),
    };
    (status, Json(body))
}
