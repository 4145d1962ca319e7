//! PostgreSQL Billing Adapter
//!
//! A [`BillingTransaction`] wraps a `sqlx::Transaction`; the policy row lock
//! taken by `lock_policy` is held until commit or drop, which serializes
//! submissions and reconciliation runs for the same policy.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, Money, PaymentId, PolicyId, PortError, UserId};
use domain_billing::{BillingPort, BillingTransaction, Payment};
use domain_policy::Policy;

use crate::error::DatabaseError;
use crate::repositories::billing::{BillingRepository, PaymentRow};
use crate::repositories::policy::{PolicyRepository, PolicyRow};

/// PostgreSQL-backed implementation of `BillingPort`
#[derive(Debug, Clone)]
pub struct PostgresBillingAdapter {
    repository: BillingRepository,
    pool: PgPool,
}

impl PostgresBillingAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BillingRepository::new(pool.clone()),
            pool,
        }
    }
}

/// A billing unit of work on one PostgreSQL transaction
pub struct PgBillingTransaction {
    tx: Transaction<'static, Postgres>,
}

fn duplicate_reference(err: DatabaseError) -> PortError {
    match err {
        DatabaseError::DuplicateEntry(_) => PortError::conflict("payment reference already exists"),
        other => other.into(),
    }
}

#[async_trait]
impl BillingTransaction for PgBillingTransaction {
    async fn lock_policy(&mut self, id: PolicyId) -> Result<Option<Policy>, PortError> {
        let row = PolicyRepository::lock(&mut self.tx, id.into()).await?;
        Ok(row.map(Policy::from))
    }

    async fn completed_amounts(&mut self, policy_id: PolicyId) -> Result<Vec<Money>, PortError> {
        let amounts = BillingRepository::completed_amounts(&mut self.tx, policy_id.into()).await?;
        Ok(amounts.into_iter().map(Money::new).collect())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), PortError> {
        BillingRepository::insert(&mut self.tx, &PaymentRow::from(payment))
            .await
            .map_err(duplicate_reference)
    }

    async fn lock_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, PortError> {
        BillingRepository::lock(&mut self.tx, id.into())
            .await?
            .map(Payment::try_from)
            .transpose()
            .map_err(PortError::from)
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<(), PortError> {
        BillingRepository::update_status(&mut self.tx, &PaymentRow::from(payment))
            .await
            .map_err(duplicate_reference)
    }

    async fn save_policy(&mut self, policy: &Policy) -> Result<(), PortError> {
        PolicyRepository::update(&mut self.tx, &PolicyRow::from(policy)).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }
}

impl DomainPort for PostgresBillingAdapter {}

#[async_trait]
impl HealthCheckable for PostgresBillingAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-billing-adapter").await
    }
}

#[async_trait]
impl BillingPort for PostgresBillingAdapter {
    async fn begin(&self) -> Result<Box<dyn BillingTransaction>, PortError> {
        let tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        Ok(Box::new(PgBillingTransaction { tx }))
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        let row = self
            .repository
            .get(id.into())
            .await?
            .ok_or_else(|| PortError::not_found("Payment", id))?;
        Ok(Payment::try_from(row)?)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn payments_for_user(&self, user_id: UserId) -> Result<Vec<Payment>, PortError> {
        let rows = self.repository.find_by_user(user_id.into()).await?;
        debug!(count = rows.len(), "Payments found");
        rows.into_iter()
            .map(|row| Payment::try_from(row).map_err(PortError::from))
            .collect()
    }
}
