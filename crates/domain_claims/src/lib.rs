//! Claims Domain
//!
//! Users report losses against policies they own. A claim starts `pending`;
//! its later handling is outside this service.

pub mod claim;
pub mod error;
pub mod ports;
pub mod service;

pub use claim::{Claim, ClaimStatus};
pub use error::ClaimError;
pub use ports::ClaimsPort;
pub use service::{ClaimReport, ClaimWithPolicy, ClaimsService};
