//! HTTP API Layer
//!
//! REST API for policies, payments, claims and reports using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each resource
//! - **Middleware**: JWT authentication, audit logging
//! - **DTOs**: camelCase request/response bodies
//! - **Error Handling**: Domain errors mapped to `{error, message, details}`
//!
//! The router is built over the storage ports, so the same routes run on
//! PostgreSQL in production and on the in-memory stores in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, Stores};
//!
//! let state = AppState::new(config, Stores { policies, billing, claims });
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_billing::{BillingPort, PaymentService, ReportService};
use domain_claims::{ClaimsPort, ClaimsService};
use domain_policy::{PolicyPort, PolicyService};

use crate::config::ApiConfig;
use crate::handlers::{claims, health, payments, policy, reports};
use crate::middleware::{audit_middleware, auth_middleware};

/// The storage ports the API runs on
#[derive(Clone)]
pub struct Stores {
    pub policies: Arc<dyn PolicyPort>,
    pub billing: Arc<dyn BillingPort>,
    pub claims: Arc<dyn ClaimsPort>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub policies: PolicyService,
    pub payments: PaymentService,
    pub claims: ClaimsService,
    pub reports: ReportService,
    stores: Stores,
}

impl AppState {
    /// Wires the services over the given stores
    pub fn new(config: ApiConfig, stores: Stores) -> Self {
        Self {
            config,
            policies: PolicyService::new(stores.policies.clone()),
            payments: PaymentService::new(stores.billing.clone(), stores.policies.clone()),
            claims: ClaimsService::new(stores.claims.clone(), stores.policies.clone()),
            reports: ReportService::new(stores.billing.clone(), stores.policies.clone()),
            stores,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }
}

/// Creates the main API router
///
/// Everything under `/api/v1` requires a bearer token; `/health` and
/// `/health/ready` are public.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let policy_routes = Router::new()
        .route("/", post(policy::create_policy).get(policy::list_policies))
        .route(
            "/:id",
            get(policy::get_policy)
                .put(policy::update_policy)
                .delete(policy::delete_policy),
        );

    let payment_routes = Router::new()
        .route("/", post(payments::submit_payment).get(payments::list_payments))
        .route("/:id", get(payments::get_payment).put(payments::update_payment_status));

    let claims_routes = Router::new()
        .route("/", post(claims::create_claim).get(claims::list_claims));

    let report_routes = Router::new()
        .route("/stats", get(reports::statistics))
        .route("/payments", get(reports::payment_history))
        .route("/policies", get(reports::policy_history));

    let api_routes = Router::new()
        .nest("/policies", policy_routes)
        .nest("/payments", payment_routes)
        .nest("/claims", claims_routes)
        .nest("/reports", report_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
