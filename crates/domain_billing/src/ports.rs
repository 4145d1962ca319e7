//! Billing Domain Ports
//!
//! Payment submission and balance reconciliation each run inside a store
//! transaction that starts by locking the policy row. The port therefore
//! hands out a [`BillingTransaction`] rather than exposing single-shot
//! writes:
//!
//! ```rust,ignore
//! let mut tx = port.begin().await?;
//! let policy = tx.lock_policy(policy_id).await?;   // SELECT … FOR UPDATE
//! let amounts = tx.completed_amounts(policy_id).await?;
//! tx.insert_payment(&payment).await?;
//! tx.commit().await?;
//! ```
//!
//! Dropping a transaction without committing rolls it back.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, Money, PaymentId, PolicyId, PortError, UserId};
use domain_policy::Policy;

use crate::payment::Payment;

/// A unit of work holding an exclusive lock on the policies it touched
#[async_trait]
pub trait BillingTransaction: Send {
    /// Loads a policy and locks it until commit or rollback
    async fn lock_policy(&mut self, id: PolicyId) -> Result<Option<Policy>, PortError>;

    /// Amounts of all completed payments against the policy
    async fn completed_amounts(&mut self, policy_id: PolicyId) -> Result<Vec<Money>, PortError>;

    /// Inserts a payment; a duplicate reference is a `Conflict`
    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), PortError>;

    /// Loads a payment and locks it until commit or rollback
    async fn lock_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, PortError>;

    /// Writes a payment's status and reference
    async fn update_payment(&mut self, payment: &Payment) -> Result<(), PortError>;

    /// Writes a policy's balance and status
    async fn save_policy(&mut self, policy: &Policy) -> Result<(), PortError>;

    /// Commits the unit of work
    async fn commit(self: Box<Self>) -> Result<(), PortError>;
}

/// Storage operations for payments
#[async_trait]
pub trait BillingPort: DomainPort + HealthCheckable {
    /// Starts a transaction
    async fn begin(&self) -> Result<Box<dyn BillingTransaction>, PortError>;

    /// Retrieves a payment by ID, or `PortError::NotFound`
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError>;

    /// The user's payments, newest first
    async fn payments_for_user(&self, user_id: UserId) -> Result<Vec<Payment>, PortError>;
}

/// In-memory implementation of the billing, policy and claims ports for testing
///
/// One store backs all three ports so payments, claims and the policies they
/// reference share state, and a
/// store-wide async mutex stands in for the database row locks: a
/// transaction holds it from `begin` until commit or drop.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::HealthCheckResult;
    use domain_policy::ports::{policy_rule_violation, PolicyPort, PolicyQuery};
    use domain_claims::{Claim, ClaimsPort};
    use domain_policy::PolicyChanges;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::{Mutex, OwnedMutexGuard};

    #[derive(Debug, Default, Clone)]
    struct StoreState {
        policies: HashMap<PolicyId, Policy>,
        // insertion order
        payments: Vec<Payment>,
        claims: Vec<Claim>,
    }

    impl StoreState {
        fn reference_taken(&self, payment: &Payment) -> bool {
            match &payment.reference {
                Some(reference) => self
                    .payments
                    .iter()
                    .any(|p| p.id != payment.id && p.reference.as_ref() == Some(reference)),
                None => false,
            }
        }
    }

    /// Shared in-memory store implementing `PolicyPort`, `BillingPort` and `ClaimsPort`
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryStore {
        state: Arc<Mutex<StoreState>>,
        policy_writes: Arc<AtomicUsize>,
        fail_policy_saves: Arc<AtomicBool>,
    }

    impl InMemoryStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with policies for testing
        pub async fn with_policies(policies: Vec<Policy>) -> Self {
            let store = Self::new();
            {
                let mut state = store.state.lock().await;
                for policy in policies {
                    state.policies.insert(policy.id, policy);
                }
            }
            store
        }

        /// Number of committed policy writes made through billing transactions
        pub fn policy_writes(&self) -> usize {
            self.policy_writes.load(Ordering::SeqCst)
        }

        /// Makes every subsequent `save_policy` fail with a connection error
        pub fn fail_policy_saves(&self, fail: bool) {
            self.fail_policy_saves.store(fail, Ordering::SeqCst);
        }

        /// Number of stored payments
        pub async fn payment_count(&self) -> usize {
            self.state.lock().await.payments.len()
        }

        /// Inserts a payment directly, bypassing the submission rules
        pub async fn seed_payment(&self, payment: Payment) {
            self.state.lock().await.payments.push(payment);
        }
    }

    struct MemoryTransaction {
        guard: OwnedMutexGuard<StoreState>,
        staged: StoreState,
        staged_policy_writes: usize,
        policy_writes: Arc<AtomicUsize>,
        fail_policy_saves: bool,
    }

    #[async_trait]
    impl BillingTransaction for MemoryTransaction {
        async fn lock_policy(&mut self, id: PolicyId) -> Result<Option<Policy>, PortError> {
            Ok(self.staged.policies.get(&id).cloned())
        }

        async fn completed_amounts(&mut self, policy_id: PolicyId) -> Result<Vec<Money>, PortError> {
            Ok(self
                .staged
                .payments
                .iter()
                .filter(|p| p.policy_id == policy_id && p.status.is_completed())
                .map(|p| p.amount)
                .collect())
        }

        async fn insert_payment(&mut self, payment: &Payment) -> Result<(), PortError> {
            if !self.staged.policies.contains_key(&payment.policy_id) {
                return Err(PortError::conflict(format!(
                    "payment references missing policy {}",
                    payment.policy_id
                )));
            }
            if self.staged.reference_taken(payment) {
                return Err(PortError::conflict("payment reference already exists"));
            }
            self.staged.payments.push(payment.clone());
            Ok(())
        }

        async fn lock_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, PortError> {
            Ok(self.staged.payments.iter().find(|p| p.id == id).cloned())
        }

        async fn update_payment(&mut self, payment: &Payment) -> Result<(), PortError> {
            if self.staged.reference_taken(payment) {
                return Err(PortError::conflict("payment reference already exists"));
            }
            let stored = self
                .staged
                .payments
                .iter_mut()
                .find(|p| p.id == payment.id)
                .ok_or_else(|| PortError::not_found("Payment", payment.id))?;
            *stored = payment.clone();
            Ok(())
        }

        async fn save_policy(&mut self, policy: &Policy) -> Result<(), PortError> {
            if self.fail_policy_saves {
                return Err(PortError::connection("policy store unavailable"));
            }
            let stored = self
                .staged
                .policies
                .get_mut(&policy.id)
                .ok_or_else(|| PortError::not_found("Policy", policy.id))?;
            *stored = policy.clone();
            self.staged_policy_writes += 1;
            Ok(())
        }

        async fn commit(self: Box<Self>) -> Result<(), PortError> {
            let MemoryTransaction {
                mut guard,
                staged,
                staged_policy_writes,
                policy_writes,
                ..
            } = *self;
            *guard = staged;
            policy_writes.fetch_add(staged_policy_writes, Ordering::SeqCst);
            Ok(())
        }
    }

    impl DomainPort for InMemoryStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("in-memory-store", 0)
        }
    }

    #[async_trait]
    impl BillingPort for InMemoryStore {
        async fn begin(&self) -> Result<Box<dyn BillingTransaction>, PortError> {
            let guard = self.state.clone().lock_owned().await;
            let staged = guard.clone();
            Ok(Box::new(MemoryTransaction {
                guard,
                staged,
                staged_policy_writes: 0,
                policy_writes: self.policy_writes.clone(),
                fail_policy_saves: self.fail_policy_saves.load(Ordering::SeqCst),
            }))
        }

        async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
            self.state
                .lock()
                .await
                .payments
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Payment", id))
        }

        async fn payments_for_user(&self, user_id: UserId) -> Result<Vec<Payment>, PortError> {
            Ok(self
                .state
                .lock()
                .await
                .payments
                .iter()
                .rev()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl PolicyPort for InMemoryStore {
        async fn create_policy(&self, policy: Policy) -> Result<Policy, PortError> {
            let mut state = self.state.lock().await;
            if state.policies.contains_key(&policy.id) {
                return Err(PortError::conflict(format!("policy {} already exists", policy.id)));
            }
            state.policies.insert(policy.id, policy.clone());
            Ok(policy)
        }

        async fn get_policy(&self, id: PolicyId) -> Result<Policy, PortError> {
            self.state
                .lock()
                .await
                .policies
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Policy", id))
        }

        async fn find_policies(&self, query: PolicyQuery) -> Result<Vec<Policy>, PortError> {
            let state = self.state.lock().await;
            let mut results: Vec<Policy> = state
                .policies
                .values()
                .filter(|p| query.matches(p))
                .cloned()
                .collect();
            query.sort(&mut results);
            Ok(results)
        }

        async fn update_policy(&self, id: PolicyId, changes: PolicyChanges) -> Result<Policy, PortError> {
            let mut state = self.state.lock().await;
            let policy = state
                .policies
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Policy", id))?;

            let mut updated = policy.clone();
            updated.apply_changes(&changes).map_err(policy_rule_violation)?;
            *policy = updated.clone();
            Ok(updated)
        }

        async fn delete_policy(&self, id: PolicyId) -> Result<(), PortError> {
            let mut state = self.state.lock().await;
            if !state.policies.contains_key(&id) {
                return Err(PortError::not_found("Policy", id));
            }
            if state.payments.iter().any(|p| p.policy_id == id) {
                return Err(PortError::conflict(format!(
                    "policy {} is referenced by existing payments",
                    id
                )));
            }
            if state.claims.iter().any(|c| c.policy_id == id) {
                return Err(PortError::conflict(format!(
                    "policy {} is referenced by existing claims",
                    id
                )));
            }
            state.policies.remove(&id);
            Ok(())
        }
    }

    #[async_trait]
    impl ClaimsPort for InMemoryStore {
        async fn create_claim(&self, claim: Claim) -> Result<Claim, PortError> {
            let mut state = self.state.lock().await;
            if !state.policies.contains_key(&claim.policy_id) {
                return Err(PortError::conflict(format!(
                    "claim references missing policy {}",
                    claim.policy_id
                )));
            }
            state.claims.push(claim.clone());
            Ok(claim)
        }

        async fn claims_for_user(&self, user_id: UserId) -> Result<Vec<Claim>, PortError> {
            Ok(self
                .state
                .lock()
                .await
                .claims
                .iter()
                .rev()
                .filter(|c| c.user_id == user_id)
                .cloned()
                .collect())
        }
    }
}
