//! PostgreSQL Policy Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PolicyId, PortError};
use domain_policy::ports::policy_rule_violation;
use domain_policy::{Policy, PolicyChanges, PolicyPort, PolicyQuery, SortOrder};

use crate::error::DatabaseError;
use crate::repositories::policy::{PolicyFilter, PolicyRepository, PolicyRow};

/// PostgreSQL-backed implementation of `PolicyPort`
#[derive(Debug, Clone)]
pub struct PostgresPolicyAdapter {
    repository: PolicyRepository,
    pool: PgPool,
}

impl PostgresPolicyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PolicyRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresPolicyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPolicyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-policy-adapter").await
    }
}

fn to_filter(query: &PolicyQuery) -> PolicyFilter {
    PolicyFilter {
        owner_id: query.owner_id.map(Into::into),
        policy_type: query.policy_type.map(Into::into),
        status: query.status.map(Into::into),
        min_balance: query.min_balance.map(|m| m.amount()),
        sort_column: query.sort_by.column(),
        descending: query.order == SortOrder::Desc,
    }
}

#[async_trait]
impl PolicyPort for PostgresPolicyAdapter {
    #[instrument(skip(self, policy), fields(policy_id = %policy.id))]
    async fn create_policy(&self, policy: Policy) -> Result<Policy, PortError> {
        self.repository.insert(&PolicyRow::from(&policy)).await?;
        debug!("Policy inserted");
        Ok(policy)
    }

    #[instrument(skip(self), fields(policy_id = %id))]
    async fn get_policy(&self, id: PolicyId) -> Result<Policy, PortError> {
        self.repository
            .get(id.into())
            .await?
            .map(Policy::from)
            .ok_or_else(|| PortError::not_found("Policy", id))
    }

    #[instrument(skip(self))]
    async fn find_policies(&self, query: PolicyQuery) -> Result<Vec<Policy>, PortError> {
        let rows = self.repository.find(&to_filter(&query)).await?;
        debug!(count = rows.len(), "Policies found");
        Ok(rows.into_iter().map(Policy::from).collect())
    }

    #[instrument(skip(self, changes), fields(policy_id = %id))]
    async fn update_policy(&self, id: PolicyId, changes: PolicyChanges) -> Result<Policy, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let row = PolicyRepository::lock(&mut tx, id.into())
            .await?
            .ok_or_else(|| PortError::not_found("Policy", id))?;
        let mut policy = Policy::from(row);
        policy.apply_changes(&changes).map_err(policy_rule_violation)?;

        PolicyRepository::update(&mut tx, &PolicyRow::from(&policy)).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        debug!("Policy updated");
        Ok(policy)
    }

    #[instrument(skip(self), fields(policy_id = %id))]
    async fn delete_policy(&self, id: PolicyId) -> Result<(), PortError> {
        match self.repository.delete(id.into()).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(PortError::not_found("Policy", id)),
            Err(DatabaseError::ForeignKeyViolation(_)) => Err(PortError::conflict(format!(
                "policy {} is referenced by existing payments or claims",
                id
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
