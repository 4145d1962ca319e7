//! Test Utilities Crate
//!
//! Shared test infrastructure for the policy payments test suite.
//!
//! # Modules
//!
//! - `fixtures`: Fixed dates and amounts plus generated text
//! - `builders`: Builders for policies and payments with sensible defaults
//! - `database`: PostgreSQL test containers with the schema applied
//! - `assertions`: Balance assertions with readable failure messages

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
