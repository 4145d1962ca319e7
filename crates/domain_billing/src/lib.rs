//! Billing Domain
//!
//! Payments against policy balances:
//!
//! - payment records with their channel and status
//! - the pure balance computation `max(premium - Σ completed, 0)`
//! - the balance reconciler that keeps each policy's stored balance and
//!   status in line with that computation
//! - the payment and report use cases over the `BillingPort`

pub mod balance;
pub mod error;
pub mod payment;
pub mod ports;
pub mod reconciler;
pub mod service;
pub mod statistics;

pub use balance::compute_balance;
pub use error::BillingError;
pub use payment::{Payment, PaymentMethod, PaymentStatus, StatusChange};
pub use ports::{BillingPort, BillingTransaction};
pub use reconciler::{BalanceReconciler, Reconciliation};
pub use service::{PaymentReceipt, PaymentRequest, PaymentService, PaymentStatusUpdate, PaymentWithBalance};
pub use statistics::{AccountStatistics, PaymentHistoryEntry, ReportService};
