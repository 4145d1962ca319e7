//! Request handlers, one module per resource

pub mod claims;
pub mod health;
pub mod payments;
pub mod policy;
pub mod reports;
