//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter translates
//! between domain models and repository rows, and database errors into
//! `PortError`.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresBillingAdapter;
//! use domain_billing::BillingPort;
//!
//! let port: Arc<dyn BillingPort> = Arc::new(PostgresBillingAdapter::new(pool));
//! let mut tx = port.begin().await?;
//! ```

pub mod billing;
pub mod claims;
pub mod policy;

pub use billing::PostgresBillingAdapter;
pub use claims::PostgresClaimsAdapter;
pub use policy::PostgresPolicyAdapter;

use core_kernel::HealthCheckResult;
use sqlx::PgPool;

/// Runs `SELECT 1` against the pool and reports the outcome
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, latency_ms),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, latency_ms, format!("Database error: {}", e)),
    }
}
