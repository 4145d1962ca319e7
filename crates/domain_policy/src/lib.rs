//! Policy Domain
//!
//! Policies carry a fixed premium and a remaining balance. This crate owns
//! the entity and its rules (acquisition, administrative changes, and
//! settlement of a recomputed balance into a status), the `PolicyPort`
//! storage abstraction, and the `PolicyService` use cases.
//!
//! The balance itself is computed by `domain_billing`, which calls
//! [`Policy::settle`] after aggregating completed payments.

pub mod error;
pub mod policy;
pub mod ports;
pub mod services;

pub use error::PolicyError;
pub use policy::{Policy, PolicyApplication, PolicyChanges, PolicyStatus, PolicyType, Settlement};
pub use ports::{PolicyPort, PolicyQuery, PolicySortField, SortOrder};
pub use services::PolicyService;
