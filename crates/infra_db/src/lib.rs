//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for policies, payments and claims using SQLx:
//!
//! - `pool`: connection pool configuration and embedded migrations
//! - `repositories`: SQL and row types per table
//! - `adapters`: implementations of `PolicyPort`, `BillingPort` and
//!   `ClaimsPort` over the repositories
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//!
//! let pool = create_pool(DatabaseConfig::new(url)).await?;
//! run_migrations(&pool).await?;
//! let billing = PostgresBillingAdapter::new(pool.clone());
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresBillingAdapter, PostgresClaimsAdapter, PostgresPolicyAdapter};
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
