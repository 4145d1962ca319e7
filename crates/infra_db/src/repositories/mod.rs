//! Repository implementations for the `policies`, `payments` and `claims` tables
//!
//! Repositories own the SQL and the row types. Queries are checked at
//! runtime (`sqlx::query_as` with `FromRow` rows), so building the crate
//! needs no live database.

pub mod billing;
pub mod claims;
pub mod policy;

pub use billing::BillingRepository;
pub use claims::ClaimsRepository;
pub use policy::PolicyRepository;
