//! Balance reconciliation
//!
//! After a payment is persisted as completed (or moved into or out of
//! `completed` by an administrator) the owning policy's balance is
//! recomputed from scratch:
//!
//! 1. lock the policy row
//! 2. sum the amounts of all its completed payments
//! 3. `remaining = max(premium - paid, 0)`
//! 4. settle the policy (`completed` at zero, back to `active` above zero)
//! 5. write the policy only if something changed
//!
//! Reconciliation runs in its own transaction after the payment's
//! transaction has committed. A failure leaves the payment in place and is
//! reported as [`BillingError::ReconciliationFailure`]; nothing is retried.

use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use core_kernel::{Money, PaymentId, PolicyId};
use domain_policy::PolicyStatus;

use crate::balance::compute_balance;
use crate::error::BillingError;
use crate::ports::BillingPort;

/// Outcome of a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub policy_id: PolicyId,
    pub remaining_balance: Money,
    pub status: PolicyStatus,
    /// Whether the policy had to be written
    pub changed: bool,
}

/// Keeps `Policy.remaining_balance` equal to the premium minus completed payments
#[derive(Clone)]
pub struct BalanceReconciler {
    port: Arc<dyn BillingPort>,
}

impl BalanceReconciler {
    /// Creates a reconciler over the billing store
    pub fn new(port: Arc<dyn BillingPort>) -> Self {
        Self { port }
    }

    /// Recomputes the balance of `policy_id` on behalf of `payment_id`
    ///
    /// # Errors
    ///
    /// Any failure is returned as `ReconciliationFailure` carrying `payment_id`.
    #[instrument(skip(self), fields(policy_id = %policy_id, payment_id = %payment_id))]
    pub async fn reconcile(&self, policy_id: PolicyId, payment_id: PaymentId) -> Result<Reconciliation, BillingError> {
        match self.run(policy_id).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(error = %err, "Balance reconciliation failed");
                Err(BillingError::ReconciliationFailure {
                    payment_id,
                    reason: err.to_string(),
                })
            }
        }
    }

    async fn run(&self, policy_id: PolicyId) -> Result<Reconciliation, BillingError> {
        let mut tx = self.port.begin().await?;

        let mut policy = tx
            .lock_policy(policy_id)
            .await?
            .ok_or_else(|| BillingError::not_found("Policy", policy_id))?;
        let completed = tx.completed_amounts(policy_id).await?;
        let balance = compute_balance(policy.premium, &completed)?;

        let settlement = policy.settle(balance);
        if settlement.changed() {
            tx.save_policy(&policy).await?;
            tx.commit().await?;
            info!(
                previous_balance = %settlement.previous_balance,
                remaining_balance = %settlement.remaining_balance,
                status = %settlement.status,
                "Policy balance reconciled"
            );
        } else {
            debug!(remaining_balance = %balance, "Policy balance already up to date");
        }

        Ok(Reconciliation {
            policy_id,
            remaining_balance: settlement.remaining_balance,
            status: settlement.status,
            changed: settlement.changed(),
        })
    }
}
