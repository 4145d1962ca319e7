//! Core Kernel - Foundational types for the policy payments system
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Money with exact decimal arithmetic and a zero floor for balances
//! - Strongly-typed identifiers for policies, payments, claims and users
//! - Port abstractions (error type, health checks)

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, MoneyError};
pub use identifiers::{PolicyId, PaymentId, ClaimId, UserId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
