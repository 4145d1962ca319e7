//! Payment use cases
//!
//! Submission checks the payment against the policy's live balance while
//! holding the policy lock, so two concurrent submissions can never both be
//! admitted past the premium. The payment commits on its own; the balance
//! is then brought up to date by the [`BalanceReconciler`].

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::{Money, PaymentId, PolicyId, UserId};
use domain_policy::{PolicyPort, PolicyQuery};

use crate::balance::compute_balance;
use crate::error::BillingError;
use crate::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::ports::BillingPort;
use crate::reconciler::BalanceReconciler;

/// A payment submitted by a policy owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub policy_id: PolicyId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

/// An administrative status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatusUpdate {
    pub status: PaymentStatus,
    pub reference: Option<String>,
}

/// A stored payment with the balance of its policy after reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub remaining_balance: Money,
}

/// A payment annotated with its policy's current balance
///
/// The balance is `None` when the policy no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentWithBalance {
    pub payment: Payment,
    pub remaining_balance: Option<Money>,
}

/// Service for submitting, administering and listing payments
#[derive(Clone)]
pub struct PaymentService {
    billing: Arc<dyn BillingPort>,
    policies: Arc<dyn PolicyPort>,
    reconciler: BalanceReconciler,
}

impl PaymentService {
    /// Creates a new payment service
    pub fn new(billing: Arc<dyn BillingPort>, policies: Arc<dyn PolicyPort>) -> Self {
        let reconciler = BalanceReconciler::new(billing.clone());
        Self {
            billing,
            policies,
            reconciler,
        }
    }

    /// Submits a payment against one of the user's policies
    ///
    /// # Errors
    ///
    /// - `Validation` if the amount is not positive
    /// - `NotFound` if the policy does not exist or belongs to someone else
    /// - `InvalidState` if the policy is fully paid, cancelled or expired
    /// - `ExceedsBalance` if the amount is larger than the remaining balance
    /// - `Conflict` if the reference is already used
    /// - `ReconciliationFailure` if the payment was stored but the balance
    ///   could not be updated
    #[instrument(skip(self, request), fields(policy_id = %request.policy_id, amount = %request.amount))]
    pub async fn submit_payment(&self, user_id: UserId, request: PaymentRequest) -> Result<PaymentReceipt, BillingError> {
        if !request.amount.is_positive() {
            return Err(BillingError::validation("amount must be greater than 0"));
        }

        let mut tx = self.billing.begin().await?;

        let policy = tx
            .lock_policy(request.policy_id)
            .await?
            .filter(|p| p.is_owned_by(user_id))
            .ok_or_else(|| BillingError::not_found("Policy", request.policy_id))?;

        if !policy.accepts_payments() {
            return Err(BillingError::invalid_state(format!(
                "policy is {} and cannot receive payments",
                policy.status
            )));
        }

        let completed = tx.completed_amounts(policy.id).await?;
        let remaining = compute_balance(policy.premium, &completed)?;
        if !remaining.is_positive() {
            return Err(BillingError::invalid_state("policy is already fully paid"));
        }
        if request.amount > remaining {
            warn!(remaining = %remaining, "Payment exceeds remaining balance");
            return Err(BillingError::ExceedsBalance {
                requested: request.amount,
                remaining,
            });
        }

        let payment = Payment::completed(
            policy.id,
            user_id,
            request.amount,
            request.method,
            request.reference,
        )?;
        tx.insert_payment(&payment).await?;
        tx.commit().await?;

        info!(payment_id = %payment.id, method = %payment.method, "Payment recorded");

        let reconciliation = self.reconciler.reconcile(policy.id, payment.id).await?;

        Ok(PaymentReceipt {
            payment,
            remaining_balance: reconciliation.remaining_balance,
        })
    }

    /// Changes a payment's status (administrators only)
    ///
    /// Moving a payment into or out of `completed` re-runs reconciliation
    /// for its policy.
    ///
    /// The change is not checked against the remaining balance, so
    /// restoring a `failed` payment can take the total paid past the
    /// premium. The stored balance then floors at zero.
    #[instrument(skip(self, update), fields(status = %update.status))]
    pub async fn update_payment_status(
        &self,
        payment_id: PaymentId,
        update: PaymentStatusUpdate,
    ) -> Result<Payment, BillingError> {
        let mut tx = self.billing.begin().await?;

        let mut payment = tx
            .lock_payment(payment_id)
            .await?
            .ok_or_else(|| BillingError::not_found("Payment", payment_id))?;
        let change = payment.change_status(update.status, update.reference)?;
        tx.update_payment(&payment).await?;
        tx.commit().await?;

        info!(from = %change.from, to = %change.to, "Payment status updated");

        if change.crosses_completed() {
            self.reconciler.reconcile(payment.policy_id, payment.id).await?;
        }
        Ok(payment)
    }

    /// The user's payments, newest first, with their policies' current balances
    pub async fn list_payments(&self, user_id: UserId) -> Result<Vec<PaymentWithBalance>, BillingError> {
        let payments = self.billing.payments_for_user(user_id).await?;
        let balances: HashMap<PolicyId, Money> = self
            .policies
            .find_policies(PolicyQuery::for_owner(user_id))
            .await?
            .into_iter()
            .map(|p| (p.id, p.remaining_balance))
            .collect();

        Ok(payments
            .into_iter()
            .map(|payment| {
                let remaining_balance = balances.get(&payment.policy_id).copied();
                PaymentWithBalance {
                    payment,
                    remaining_balance,
                }
            })
            .collect())
    }

    /// Returns one payment
    pub async fn get_payment(&self, payment_id: PaymentId) -> Result<Payment, BillingError> {
        Ok(self.billing.get_payment(payment_id).await?)
    }
}
